//! Whole-regatta fleet rotations driven by a [`RotationConfiguration`].
//!
//! Each creator pairs a races rotator (which races share the next ordering)
//! with a sails rotator (what the next ordering is) and walks them in lockstep
//! until the races run out. Sail `i` of an ordering goes to team `i` in
//! canonical order; sails beyond the last team go to BYE and are never stored.

use std::fmt;
use tracing::{debug, info};

use sail_types::{Division, Sail};

use crate::config::{RotationConfiguration, RotationStyle};
use crate::error::{Result, RotationError};
use crate::manager::RotationManager;
use crate::races_rotator::{races_rotator, RacesRotator};
use crate::regatta::{RaceId, Regatta, Scoring, Slot, TeamId};
use crate::sails_rotator::{sails_rotator, SailsRotator};
use crate::store::RotationStore;

/// Staged `(race, slot, sail)` rows, BYE slots included.
type Rows = Vec<(RaceId, Slot, Sail)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FleetRotationCreator {
    /// Per-division race queues ordered by division order.
    Standard,
    /// All (division, team) pairs of a race number share one slot list.
    Combined,
    /// Each division starts on a different block of sails.
    Franny,
}

impl fmt::Display for FleetRotationCreator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Standard => "standard",
            Self::Combined => "combined",
            Self::Franny => "franny",
        })
    }
}

impl FleetRotationCreator {
    /// Combined when divisions score together; Franny for the franny style; else Standard.
    pub fn select(scoring: Scoring, config: &RotationConfiguration) -> Result<Self> {
        let creator = match scoring {
            Scoring::Team => {
                return Err(RotationError::Unsupported {
                    what: "scoring for fleet rotation",
                    value: scoring.to_string(),
                })
            }
            Scoring::Combined => Self::Combined,
            Scoring::Standard if config.rotation_style == RotationStyle::Franny => Self::Franny,
            Scoring::Standard => Self::Standard,
        };
        debug!("Selected {creator} creator for {scoring} scoring");
        Ok(creator)
    }

    /// Replace the regatta's whole rotation. Calling twice with the same
    /// configuration yields the same assignments. Returns rows committed.
    pub fn create_rotation<S: RotationStore>(
        &self,
        manager: &mut RotationManager<'_, S>,
        config: &RotationConfiguration,
    ) -> Result<usize> {
        let regatta = manager.regatta();
        config.validate()?;
        if config.regatta != regatta.id() {
            return Err(RotationError::InvalidArgument(format!(
                "configuration is for regatta {}, not {}",
                config.regatta,
                regatta.id()
            )));
        }
        config.validate_divisions(regatta.divisions())?;

        info!(
            "Creating {self} rotation for {}: {} / {}, {} sails, {} races per set",
            regatta.id(),
            config.rotation_type,
            config.rotation_style,
            config.sails.len(),
            config.races_per_set
        );

        let rows = match self {
            Self::Standard => standard_rows(regatta, config, config.sails.clone(), &config.division_order, config.rotation_style)?,
            Self::Combined => combined_rows(regatta, config)?,
            Self::Franny => franny_rows(regatta, config)?,
        };

        manager.init_queue();
        manager.reset(None)?;
        for (race, slot, sail) in rows {
            manager.queue(race, slot, sail);
        }
        manager.commit()
    }
}

// ─── Shared Orchestration ─────────────────────────────────────────────────────

/// Pull race batches and sail orderings in lockstep until the races run out.
fn run_sets<T>(
    races: &mut dyn RacesRotator<T>,
    sails: &mut dyn SailsRotator,
    races_per_set: usize,
    mut assign: impl FnMut(&T, &[Sail]),
) -> usize {
    let mut sets = 0;
    loop {
        let batch = races.next_races(races_per_set);
        if batch.is_empty() {
            return sets;
        }
        let ordering = sails.rotate();
        for race in &batch {
            assign(race, &ordering);
        }
        sets += 1;
    }
}

fn fleet_slot(teams: &[TeamId], i: usize) -> Slot {
    teams.get(i).copied().map(Slot::Team).unwrap_or(Slot::Bye)
}

fn require_cover(sails: usize, slots: usize) -> Result<()> {
    if sails < slots {
        return Err(RotationError::TooFewSails { sails, slots });
    }
    Ok(())
}

// ─── Standard ─────────────────────────────────────────────────────────────────

fn standard_rows(
    regatta: &Regatta,
    config: &RotationConfiguration,
    sails: Vec<Sail>,
    order: &[Division],
    style: RotationStyle,
) -> Result<Rows> {
    let teams = regatta.team_ids();
    require_cover(sails.len(), teams.len())?;

    let groups = regatta.race_groups(order).into_iter().map(|g| g.races).collect();
    let mut races = races_rotator(style, groups)?;
    let mut sails = sails_rotator(config.rotation_type, sails)?;

    let mut rows = Rows::new();
    let sets = run_sets(races.as_mut(), sails.as_mut(), config.races_per_set, |&race, ordering| {
        for (i, sail) in ordering.iter().enumerate() {
            rows.push((race, fleet_slot(&teams, i), sail.clone()));
        }
    });
    debug!("Standard rotation over {order:?}: {sets} sets");
    Ok(rows)
}

// ─── Franny ───────────────────────────────────────────────────────────────────

/// Division `k` in division order rotates the sails list left by
/// `k * floor(len / divisions)` before running the single-division rotation.
fn franny_rows(regatta: &Regatta, config: &RotationConfiguration) -> Result<Rows> {
    let order = &config.division_order;
    let block = config.sails.len() / order.len().max(1);

    let mut rows = Rows::new();
    let mut sails = config.sails.clone();
    for (k, division) in order.iter().enumerate() {
        let len = sails.len();
        if k > 0 && len > 0 {
            sails.rotate_left(block % len);
        }
        rows.extend(standard_rows(
            regatta,
            config,
            sails.clone(),
            std::slice::from_ref(division),
            RotationStyle::Similar,
        )?);
    }
    Ok(rows)
}

// ─── Combined ─────────────────────────────────────────────────────────────────

/// One slot per (division, team) pair, divisions in division order; sets are
/// blocks of race numbers rather than per-division races.
fn combined_rows(regatta: &Regatta, config: &RotationConfiguration) -> Result<Rows> {
    let slots: Vec<(Division, TeamId)> = config
        .division_order
        .iter()
        .flat_map(|&d| regatta.team_ids().into_iter().map(move |t| (d, t)))
        .collect();
    require_cover(config.sails.len(), slots.len())?;

    let mut races = races_rotator(config.rotation_style, vec![regatta.race_numbers()])?;
    let mut sails = sails_rotator(config.rotation_type, config.sails.clone())?;

    let mut rows = Rows::new();
    let sets = run_sets(races.as_mut(), sails.as_mut(), config.races_per_set, |&number, ordering| {
        for (&(division, team), sail) in slots.iter().zip(ordering) {
            if let Some(race) = regatta.find_race(division, number) {
                rows.push((race, Slot::Team(team), sail.clone()));
            }
        }
    });
    debug!("Combined rotation over {} slots: {sets} sets", slots.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RotationType;
    use crate::store::MemoryStore;

    fn regatta(scoring: Scoring, divisions: Vec<Division>, teams: usize, races: u32) -> Regatta {
        let mut r = Regatta::new("spring", scoring, divisions);
        for t in 0..teams {
            r.add_team(format!("T{t}"));
        }
        r.add_races(races).unwrap();
        r
    }

    fn config(t: RotationType, s: RotationStyle, per_set: usize, order: Vec<Division>, n: usize) -> RotationConfiguration {
        RotationConfiguration {
            regatta: "spring".into(),
            rotation_type: t,
            rotation_style: s,
            races_per_set: per_set,
            division_order: order,
            sails: (1..=n).map(|i| Sail::new(i.to_string(), "")).collect(),
        }
    }

    fn label(store: &MemoryStore, r: &Regatta, d: Division, n: u32, team: usize) -> Option<String> {
        let race = r.find_race(d, n)?;
        crate::store::RotationStore::lookup(store, "spring", race, TeamId(team)).map(|s| s.label)
    }

    #[test]
    fn selector_follows_scoring_then_style() {
        let c = config(RotationType::Standard, RotationStyle::Franny, 1, vec![Division::A], 2);
        assert_eq!(FleetRotationCreator::select(Scoring::Combined, &c).unwrap(), FleetRotationCreator::Combined);
        assert_eq!(FleetRotationCreator::select(Scoring::Standard, &c).unwrap(), FleetRotationCreator::Franny);
        let c = config(RotationType::Standard, RotationStyle::Navy, 1, vec![Division::A], 2);
        assert_eq!(FleetRotationCreator::select(Scoring::Standard, &c).unwrap(), FleetRotationCreator::Standard);
        assert!(matches!(
            FleetRotationCreator::select(Scoring::Team, &c),
            Err(RotationError::Unsupported { .. })
        ));
    }

    #[test]
    fn standard_similar_shares_sets_across_divisions() {
        let r = regatta(Scoring::Standard, vec![Division::A, Division::B], 3, 4);
        let c = config(RotationType::Standard, RotationStyle::Similar, 2, vec![Division::A, Division::B], 3);
        let mut store = MemoryStore::new();
        let rows = FleetRotationCreator::Standard
            .create_rotation(&mut RotationManager::new(&r, &mut store), &c)
            .unwrap();
        assert_eq!(rows, 3 * 8);
        // set 1: races 1-2 of A and B; set 2: races 3-4
        for d in [Division::A, Division::B] {
            assert_eq!(label(&store, &r, d, 2, 0).as_deref(), Some("1"));
            assert_eq!(label(&store, &r, d, 3, 0).as_deref(), Some("2"));
        }
    }

    #[test]
    fn navy_advances_divisions_in_turn() {
        let r = regatta(Scoring::Standard, vec![Division::A, Division::B], 2, 2);
        let c = config(RotationType::Standard, RotationStyle::Navy, 1, vec![Division::B, Division::A], 2);
        let mut store = MemoryStore::new();
        FleetRotationCreator::Standard
            .create_rotation(&mut RotationManager::new(&r, &mut store), &c)
            .unwrap();
        // sets: 1B, 1A, 2B, 2A
        assert_eq!(label(&store, &r, Division::B, 1, 0).as_deref(), Some("1"));
        assert_eq!(label(&store, &r, Division::A, 1, 0).as_deref(), Some("2"));
        assert_eq!(label(&store, &r, Division::B, 2, 0).as_deref(), Some("1"));
    }

    #[test]
    fn excess_sails_go_to_bye() {
        let r = regatta(Scoring::Standard, vec![Division::A], 3, 4);
        let c = config(RotationType::Standard, RotationStyle::Similar, 1, vec![Division::A], 4);
        let mut store = MemoryStore::new();
        let rows = FleetRotationCreator::Standard
            .create_rotation(&mut RotationManager::new(&r, &mut store), &c)
            .unwrap();
        assert_eq!(rows, 12);
        assert!(store.assignments("spring").iter().all(|a| a.team.0 < 3));
        // race 4 ordering is [4, 1, 2, 3]: team 0 sails 4
        assert_eq!(label(&store, &r, Division::A, 4, 0).as_deref(), Some("4"));
    }

    #[test]
    fn too_few_sails_is_rejected() {
        let r = regatta(Scoring::Standard, vec![Division::A], 3, 1);
        let c = config(RotationType::Standard, RotationStyle::Similar, 1, vec![Division::A], 2);
        let mut store = MemoryStore::new();
        let err = FleetRotationCreator::Standard
            .create_rotation(&mut RotationManager::new(&r, &mut store), &c)
            .unwrap_err();
        assert!(matches!(err, RotationError::TooFewSails { sails: 2, slots: 3 }));
    }

    #[test]
    fn franny_offsets_divisions_by_a_block() {
        let r = regatta(Scoring::Standard, vec![Division::A, Division::B], 4, 2);
        let c = config(RotationType::Standard, RotationStyle::Franny, 1, vec![Division::A, Division::B], 4);
        let mut store = MemoryStore::new();
        FleetRotationCreator::Franny
            .create_rotation(&mut RotationManager::new(&r, &mut store), &c)
            .unwrap();
        assert_eq!(label(&store, &r, Division::A, 1, 0).as_deref(), Some("1"));
        assert_eq!(label(&store, &r, Division::B, 1, 0).as_deref(), Some("3"));
        assert_eq!(label(&store, &r, Division::B, 2, 0).as_deref(), Some("4"));
    }

    #[test]
    fn combined_rotates_across_all_divisions() {
        let r = regatta(Scoring::Combined, vec![Division::A, Division::B], 2, 2);
        let c = config(RotationType::Standard, RotationStyle::Similar, 1, vec![Division::A, Division::B], 4);
        let mut store = MemoryStore::new();
        FleetRotationCreator::Combined
            .create_rotation(&mut RotationManager::new(&r, &mut store), &c)
            .unwrap();
        // slots: (A,T0) (A,T1) (B,T0) (B,T1)
        assert_eq!(label(&store, &r, Division::B, 1, 1).as_deref(), Some("4"));
        assert_eq!(label(&store, &r, Division::B, 2, 1).as_deref(), Some("1"));
        assert_eq!(label(&store, &r, Division::A, 2, 0).as_deref(), Some("2"));
    }

    #[test]
    fn combined_rejects_franny_style() {
        let r = regatta(Scoring::Combined, vec![Division::A], 2, 1);
        let c = config(RotationType::Standard, RotationStyle::Franny, 1, vec![Division::A], 2);
        let mut store = MemoryStore::new();
        let err = FleetRotationCreator::Combined
            .create_rotation(&mut RotationManager::new(&r, &mut store), &c)
            .unwrap_err();
        assert!(matches!(err, RotationError::Unsupported { .. }));
    }

    #[test]
    fn wrong_regatta_is_rejected() {
        let r = regatta(Scoring::Standard, vec![Division::A], 2, 1);
        let mut c = config(RotationType::None, RotationStyle::Similar, 1, vec![Division::A], 2);
        c.regatta = "fall".into();
        let mut store = MemoryStore::new();
        assert!(FleetRotationCreator::Standard
            .create_rotation(&mut RotationManager::new(&r, &mut store), &c)
            .is_err());
    }
}
