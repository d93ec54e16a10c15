//! # manager
//!
//! Direct rotation construction and editing for one regatta.
//!
//! Every mutation goes through the same path: stage `(race, team) → sail`
//! entries in an in-memory queue, reset the affected scope in the store, then
//! commit the queue as a single [`Batch`]. Validation runs before anything is
//! staged, so a failing call leaves both the queue and the store untouched.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use sail_types::{min_numeric_core, Division, Sail, SailLabel};

use crate::error::{Result, RotationError};
use crate::regatta::{RaceId, Regatta, Slot, TeamId};
use crate::store::{sort_assignments, Assignment, Batch, RotationStore};

// ─── Participants ─────────────────────────────────────────────────────────────

/// How rotation slots map onto races.
#[derive(Debug, Clone, Copy)]
pub enum Participants<'p> {
    /// Every team sails in every listed division; one slot per team (standard scoring).
    Divisions {
        teams: &'p [TeamId],
        divisions: &'p [Division],
    },
    /// One slot per (team, division) pair (combined or singlehanded scoring).
    Paired(&'p [(TeamId, Division)]),
}

impl Participants<'_> {
    pub fn len(&self) -> usize {
        match self {
            Self::Divisions { teams, .. } => teams.len(),
            Self::Paired(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn teams(&self) -> Vec<TeamId> {
        match self {
            Self::Divisions { teams, .. } => teams.to_vec(),
            Self::Paired(pairs) => pairs.iter().map(|(t, _)| *t).collect(),
        }
    }

    /// `(slot index, team, race)` for every cell of race number `number`.
    fn cells(&self, regatta: &Regatta, number: u32) -> Result<Vec<(usize, TeamId, RaceId)>> {
        let mut cells = Vec::new();
        match self {
            Self::Divisions { teams, divisions } => {
                for &division in divisions.iter() {
                    let race = regatta.require_race(division, number)?;
                    cells.extend(teams.iter().enumerate().map(|(j, &t)| (j, t, race)));
                }
            }
            Self::Paired(pairs) => {
                for (j, &(team, division)) in pairs.iter().enumerate() {
                    cells.push((j, team, regatta.require_race(division, number)?));
                }
            }
        }
        Ok(cells)
    }
}

/// `table[team][race_slot]` = index into the sails list.
///
/// Race slot `r` shifts the whole fleet by `dir * floor(r / repeats)` positions
/// (`dir` is +1 going up, -1 going down). With `swap`, odd slots shift the
/// opposite way so half the fleet moves up while the other half moves down.
pub fn rotation_table(teams: usize, races: usize, repeats: usize, up: bool, swap: bool) -> Vec<Vec<usize>> {
    let n = teams as i64;
    let dir: i64 = if up { 1 } else { -1 };
    (0..teams)
        .map(|j| {
            let sign = if swap && j % 2 == 1 { -1 } else { 1 };
            (0..races)
                .map(|r| {
                    let shift = sign * dir * (r / repeats.max(1)) as i64;
                    (j as i64 + shift).rem_euclid(n) as usize
                })
                .collect()
        })
        .collect()
}

fn check_lengths(left: &'static str, left_len: usize, right: &'static str, right_len: usize) -> Result<()> {
    if left_len != right_len {
        return Err(RotationError::LengthMismatch {
            left,
            left_len,
            right,
            right_len,
        });
    }
    Ok(())
}

// ─── Manager ──────────────────────────────────────────────────────────────────

pub struct RotationManager<'a, S: RotationStore> {
    regatta: &'a Regatta,
    store: &'a mut S,
    queue: BTreeMap<(RaceId, TeamId), Sail>,
}

impl<'a, S: RotationStore> RotationManager<'a, S> {
    pub fn new(regatta: &'a Regatta, store: &'a mut S) -> Self {
        Self {
            regatta,
            store,
            queue: BTreeMap::new(),
        }
    }

    pub fn regatta(&self) -> &'a Regatta {
        self.regatta
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    /// Whether `race` (or any race of the regatta) has assignments.
    pub fn is_assigned(&self, race: Option<RaceId>) -> bool {
        let id = self.regatta.id();
        match race {
            Some(race) => !self.store.list(id, race).is_empty(),
            None => self
                .regatta
                .divisions()
                .iter()
                .flat_map(|d| self.regatta.races_in(*d))
                .any(|race| !self.store.list(id, race).is_empty()),
        }
    }

    /// Sails used in `race`, in canonical order.
    pub fn sails(&self, race: RaceId) -> Vec<Sail> {
        self.store
            .list(self.regatta.id(), race)
            .into_iter()
            .map(|a| a.sail)
            .collect()
    }

    pub fn sail(&self, race: RaceId, team: TeamId) -> Option<Sail> {
        self.store.lookup(self.regatta.id(), race, team)
    }

    /// Sails whose label appears in every one of `races`.
    pub fn common_sails(&self, races: &[RaceId]) -> Vec<Sail> {
        let Some((first, rest)) = races.split_first() else {
            return Vec::new();
        };
        let others: Vec<BTreeSet<String>> = rest
            .iter()
            .map(|r| self.sails(*r).into_iter().map(|s| s.label).collect())
            .collect();
        self.sails(*first)
            .into_iter()
            .filter(|s| others.iter().all(|labels| labels.contains(&s.label)))
            .collect()
    }

    /// Divisions with at least one assigned race.
    pub fn assigned_divisions(&self) -> Vec<Division> {
        self.regatta
            .divisions()
            .iter()
            .copied()
            .filter(|d| {
                self.regatta
                    .races_in(*d)
                    .into_iter()
                    .any(|race| self.is_assigned(Some(race)))
            })
            .collect()
    }

    // ── Staging ──────────────────────────────────────────────────────────────

    pub fn init_queue(&mut self) {
        self.queue.clear();
    }

    /// Stage a sail. BYE slots are dropped; a later entry for the same
    /// (race, team) replaces the earlier one.
    pub fn queue(&mut self, race: RaceId, slot: Slot, sail: Sail) {
        if let Slot::Team(team) = slot {
            self.queue.insert((race, team), sail);
        }
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Flush the queue to the store as one batch. Returns the number of rows written.
    pub fn commit(&mut self) -> Result<usize> {
        let queue = std::mem::take(&mut self.queue);
        let assignments: Vec<Assignment> = queue
            .into_iter()
            .map(|((race, team), sail)| Assignment { race, team, sail })
            .collect();
        let count = assignments.len();
        self.store.commit(Batch {
            regatta: self.regatta.id().to_string(),
            assignments,
        })?;
        info!("Committed {count} sail assignments for {}", self.regatta.id());
        Ok(count)
    }

    /// Delete persisted assignments for `race`, or the whole regatta.
    pub fn reset(&mut self, race: Option<RaceId>) -> Result<()> {
        self.store.reset(self.regatta.id(), race)
    }

    // ── Table Construction ───────────────────────────────────────────────────

    /// Every race number in `races` shifts the fleet by one sail every
    /// `repeats` races, upward or downward.
    pub fn create_standard(
        &mut self,
        sails: &[String],
        colors: &[String],
        participants: Participants<'_>,
        races: &[u32],
        repeats: usize,
        up: bool,
    ) -> Result<()> {
        self.create_table(sails, colors, participants, races, repeats, up, false)
    }

    /// Like [`create_standard`](Self::create_standard), but even slots move one
    /// way and odd slots the other.
    pub fn create_swap(
        &mut self,
        sails: &[String],
        colors: &[String],
        participants: Participants<'_>,
        races: &[u32],
        repeats: usize,
        up: bool,
    ) -> Result<()> {
        if participants.len() % 2 != 0 {
            return Err(RotationError::OddSwapSize(participants.len()));
        }
        self.create_table(sails, colors, participants, races, repeats, up, true)
    }

    #[allow(clippy::too_many_arguments)]
    fn create_table(
        &mut self,
        sails: &[String],
        colors: &[String],
        participants: Participants<'_>,
        races: &[u32],
        repeats: usize,
        up: bool,
        swap: bool,
    ) -> Result<()> {
        let n = participants.len();
        check_lengths("sails", sails.len(), "teams", n)?;
        check_lengths("colors", colors.len(), "teams", n)?;
        if repeats < 1 {
            return Err(RotationError::InvalidRepeats(repeats));
        }
        if participants.is_empty() {
            return Err(RotationError::InvalidArgument("no teams to rotate".into()));
        }
        for team in participants.teams() {
            self.regatta.require_team(team)?;
        }

        let table = rotation_table(n, races.len(), repeats, up, swap);
        let mut rows = Vec::new();
        let mut touched = BTreeSet::new();
        for (r, &number) in races.iter().enumerate() {
            for (j, team, race) in participants.cells(self.regatta, number)? {
                let k = table[j][r];
                rows.push((race, team, Sail::new(sails[k].clone(), colors[k].clone())));
                touched.insert(race);
            }
        }

        debug!(
            "Built {} rotation table: {n} slots x {} races, repeats {repeats}, up {up}",
            if swap { "swap" } else { "standard" },
            races.len()
        );

        self.init_queue();
        for race in touched {
            self.reset(Some(race))?;
        }
        for (race, team, sail) in rows {
            self.queue(race, Slot::Team(team), sail);
        }
        self.commit()?;
        Ok(())
    }

    // ── Offsets ──────────────────────────────────────────────────────────────

    /// For each race number, stage into `to` the sails of `from`, each replaced
    /// by the sail `offset` positions later in the from-race's sorted order.
    pub fn queue_offset(&mut self, from: Division, to: Division, numbers: &[u32], offset: i64) -> Result<()> {
        let pairs = numbers
            .iter()
            .map(|&n| -> Result<(RaceId, RaceId)> {
                Ok((self.regatta.require_race(from, n)?, self.regatta.require_race(to, n)?))
            })
            .collect::<Result<Vec<_>>>()?;

        for (from_race, to_race) in pairs {
            let rows = self.store.list(self.regatta.id(), from_race);
            let staged = shifted(&rows, offset);
            for (row, sail) in rows.iter().zip(staged) {
                self.queue(to_race, Slot::Team(row.team), sail);
            }
        }
        Ok(())
    }

    /// Like [`queue_offset`](Self::queue_offset) over the union of sails of
    /// every division sharing a race number, written back in place.
    pub fn queue_combined_offset(&mut self, numbers: &[u32], offset: i64) -> Result<()> {
        let groups = numbers
            .iter()
            .map(|&n| {
                self.regatta
                    .divisions()
                    .iter()
                    .map(|d| self.regatta.require_race(*d, n))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        for races in groups {
            let mut rows: Vec<Assignment> = races
                .iter()
                .flat_map(|r| self.store.list(self.regatta.id(), *r))
                .collect();
            sort_assignments(&mut rows);
            let staged = shifted(&rows, offset);
            for (row, sail) in rows.iter().zip(staged) {
                self.queue(row.race, Slot::Team(row.team), sail);
            }
        }
        Ok(())
    }

    /// Replace the rotation of `to` with an offset copy of `from`.
    pub fn create_offset(&mut self, from: Division, to: Division, numbers: &[u32], offset: i64) -> Result<()> {
        self.init_queue();
        self.queue_offset(from, to, numbers, offset)?;
        for &n in numbers {
            let race = self.regatta.require_race(to, n)?;
            self.reset(Some(race))?;
        }
        self.commit()?;
        Ok(())
    }

    /// Offset every division of each race number across their combined sails.
    pub fn create_combined_offset(&mut self, numbers: &[u32], offset: i64) -> Result<()> {
        self.init_queue();
        self.queue_combined_offset(numbers, offset)?;
        for &n in numbers {
            for &d in self.regatta.divisions() {
                let race = self.regatta.require_race(d, n)?;
                self.reset(Some(race))?;
            }
        }
        self.commit()?;
        Ok(())
    }

    /// Shift the numeric core of every sail in `race` by `amount`, keeping
    /// prefixes and suffixes.
    pub fn add_amount(&mut self, race: RaceId, amount: i64) -> Result<()> {
        let rows = self.store.list(self.regatta.id(), race);
        // digit-free labels keep their name
        let numbered = rows
            .iter()
            .map(|a| a.sail.label.as_str())
            .filter(|l| SailLabel::parse(l).has_numeric());
        let Some(min) = min_numeric_core(numbered) else {
            return Ok(());
        };
        if (min as i128) + (amount as i128) < 0 {
            return Err(RotationError::InvalidArgument(format!(
                "adding {amount} would make sail number {min} negative"
            )));
        }

        let mut staged = Vec::with_capacity(rows.len());
        for row in &rows {
            let parsed = row.sail.parsed();
            if !parsed.has_numeric() {
                staged.push((row.team, row.sail.clone()));
                continue;
            }
            let value = u64::try_from(parsed.numeric() as i128 + amount as i128).map_err(|_| {
                RotationError::InvalidArgument(format!("sail {} cannot be shifted by {amount}", row.sail))
            })?;
            staged.push((row.team, Sail::new(parsed.with_numeric(value), row.sail.color.clone())));
        }

        self.init_queue();
        self.reset(Some(race))?;
        for (team, sail) in staged {
            self.queue(race, Slot::Team(team), sail);
        }
        self.commit()?;
        Ok(())
    }
}

/// For rows in sorted order, the sail `offset` positions later (circularly).
fn shifted(rows: &[Assignment], offset: i64) -> Vec<Sail> {
    let n = rows.len() as i64;
    (0..n)
        .map(|i| rows[(i + offset).rem_euclid(n) as usize].sail.clone())
        .collect()
}
