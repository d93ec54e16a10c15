use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use sail_types::Division;

use crate::error::{Result, RotationError};

// ─── Handles ──────────────────────────────────────────────────────────────────

/// Index of a team inside its [`Regatta`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub usize);

/// Index of a race inside its [`Regatta`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RaceId(pub usize);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "team#{}", self.0)
    }
}

impl fmt::Display for RaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "race#{}", self.0)
    }
}

/// A rotation slot: a real team, or the BYE placeholder that fills unused sails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Team(TeamId),
    Bye,
}

// ─── Scoring ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scoring {
    #[default]
    Standard,
    Combined,
    Team,
}

impl fmt::Display for Scoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Standard => "standard",
            Self::Combined => "combined",
            Self::Team => "team",
        })
    }
}

// ─── Entities ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Race {
    pub division: Division,
    pub number: u32,
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.number, self.division)
    }
}

/// Races of one division, ordered by race number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceGroup {
    pub division: Division,
    pub races: Vec<RaceId>,
}

// ─── Regatta Arena ────────────────────────────────────────────────────────────

/// Owns the teams and races of one regatta and hands out index handles to them.
/// Team order is insertion order and is the canonical order used by every creator.
#[derive(Debug, Clone)]
pub struct Regatta {
    id: String,
    scoring: Scoring,
    divisions: Vec<Division>,
    teams: Vec<Team>,
    races: Vec<Race>,
}

impl Regatta {
    pub fn new(id: impl Into<String>, scoring: Scoring, divisions: Vec<Division>) -> Self {
        Self {
            id: id.into(),
            scoring,
            divisions,
            teams: Vec::new(),
            races: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn scoring(&self) -> Scoring {
        self.scoring
    }

    pub fn divisions(&self) -> &[Division] {
        &self.divisions
    }

    pub fn add_team(&mut self, name: impl Into<String>) -> TeamId {
        self.teams.push(Team { name: name.into() });
        TeamId(self.teams.len() - 1)
    }

    pub fn add_race(&mut self, division: Division, number: u32) -> Result<RaceId> {
        if !self.divisions.contains(&division) {
            return Err(RotationError::InvalidArgument(format!(
                "division {division} is not part of regatta {}",
                self.id
            )));
        }
        if self.find_race(division, number).is_some() {
            return Err(RotationError::InvalidArgument(format!(
                "race {number}{division} already exists"
            )));
        }
        self.races.push(Race { division, number });
        Ok(RaceId(self.races.len() - 1))
    }

    /// Add races numbered `1..=count` in every division.
    pub fn add_races(&mut self, count: u32) -> Result<()> {
        for number in 1..=count {
            for division in self.divisions.clone() {
                self.add_race(division, number)?;
            }
        }
        Ok(())
    }

    pub fn team_ids(&self) -> Vec<TeamId> {
        (0..self.teams.len()).map(TeamId).collect()
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.get(id.0)
    }

    pub fn race(&self, id: RaceId) -> Option<&Race> {
        self.races.get(id.0)
    }

    pub fn find_race(&self, division: Division, number: u32) -> Option<RaceId> {
        self.races
            .iter()
            .position(|r| r.division == division && r.number == number)
            .map(RaceId)
    }

    pub fn require_race(&self, division: Division, number: u32) -> Result<RaceId> {
        self.find_race(division, number)
            .ok_or_else(|| RotationError::UnknownRace {
                division: division.to_string(),
                number,
            })
    }

    pub fn require_team(&self, id: TeamId) -> Result<&Team> {
        self.team(id).ok_or(RotationError::UnknownTeam(id.0))
    }

    /// All races of `division`, ordered by race number.
    pub fn races_in(&self, division: Division) -> Vec<RaceId> {
        let mut ids: Vec<RaceId> = (0..self.races.len())
            .map(RaceId)
            .filter(|id| self.races[id.0].division == division)
            .collect();
        ids.sort_by_key(|id| self.races[id.0].number);
        ids
    }

    /// Distinct race numbers across all divisions, ascending.
    pub fn race_numbers(&self) -> Vec<u32> {
        self.races
            .iter()
            .map(|r| r.number)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// One group per division, in `order`.
    pub fn race_groups(&self, order: &[Division]) -> Vec<RaceGroup> {
        order
            .iter()
            .map(|&division| RaceGroup {
                division,
                races: self.races_in(division),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regatta() -> Regatta {
        let mut r = Regatta::new("test", Scoring::Standard, vec![Division::A, Division::B]);
        r.add_team("MIT");
        r.add_team("HAR");
        r.add_races(3).unwrap();
        r
    }

    #[test]
    fn races_are_resolved_by_division_and_number() {
        let r = regatta();
        let id = r.find_race(Division::B, 2).unwrap();
        assert_eq!(r.race(id), Some(&Race { division: Division::B, number: 2 }));
        assert!(r.find_race(Division::A, 4).is_none());
        assert!(matches!(
            r.require_race(Division::A, 4),
            Err(RotationError::UnknownRace { number: 4, .. })
        ));
    }

    #[test]
    fn races_in_division_are_ordered_by_number() {
        let mut r = Regatta::new("x", Scoring::Standard, vec![Division::A]);
        r.add_race(Division::A, 3).unwrap();
        r.add_race(Division::A, 1).unwrap();
        r.add_race(Division::A, 2).unwrap();
        let numbers: Vec<u32> = r
            .races_in(Division::A)
            .iter()
            .map(|id| r.race(*id).unwrap().number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn duplicate_and_foreign_races_are_rejected() {
        let mut r = regatta();
        assert!(r.add_race(Division::A, 1).is_err());
        assert!(r.add_race(Division::C, 1).is_err());
    }

    #[test]
    fn race_groups_follow_requested_order() {
        let r = regatta();
        let groups = r.race_groups(&[Division::B, Division::A]);
        assert_eq!(groups[0].division, Division::B);
        assert_eq!(groups[0].races.len(), 3);
        assert_eq!(r.race_numbers(), vec![1, 2, 3]);
    }
}
