use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use sail_types::Sail;

use crate::error::Result;
use crate::regatta::{RaceId, TeamId};

// ─── Assignment ───────────────────────────────────────────────────────────────

/// One persisted (race, team) → sail row. Unique per (race, team).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub race: RaceId,
    pub team: TeamId,
    pub sail: Sail,
}

/// A set of assignments written together for one regatta.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub regatta: String,
    pub assignments: Vec<Assignment>,
}

/// Sort rows by sail (numeric core, then prefix), then by team handle.
pub fn sort_assignments(rows: &mut [Assignment]) {
    rows.sort_by(|a, b| a.sail.cmp(&b.sail).then_with(|| a.team.cmp(&b.team)));
}

// ─── Store Port ───────────────────────────────────────────────────────────────

/// Persistence boundary of the engine. Handles are scoped to the regatta they
/// belong to, so every call names the regatta.
pub trait RotationStore {
    /// Delete assignments for `race`, or for the whole regatta when `None`.
    fn reset(&mut self, regatta: &str, race: Option<RaceId>) -> Result<()>;

    /// Persist a batch. Last write wins on (race, team).
    fn commit(&mut self, batch: Batch) -> Result<()>;

    fn lookup(&self, regatta: &str, race: RaceId, team: TeamId) -> Option<Sail>;

    /// Assignments of `race`, ordered by sail.
    fn list(&self, regatta: &str, race: RaceId) -> Vec<Assignment>;
}

// ─── In-Memory Store ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    regattas: BTreeMap<String, BTreeMap<(RaceId, TeamId), Sail>>,
}

/// Serializable form of a [`MemoryStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub regattas: BTreeMap<String, Vec<Assignment>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every assignment of `regatta`, ordered by race then team.
    pub fn assignments(&self, regatta: &str) -> Vec<Assignment> {
        self.regattas
            .get(regatta)
            .map(|rows| {
                rows.iter()
                    .map(|(&(race, team), sail)| Assignment {
                        race,
                        team,
                        sail: sail.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            regattas: self
                .regattas
                .keys()
                .map(|id| (id.clone(), self.assignments(id)))
                .collect(),
        }
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let regattas = snapshot
            .regattas
            .into_iter()
            .map(|(id, rows)| {
                let rows = rows
                    .into_iter()
                    .map(|a| ((a.race, a.team), a.sail))
                    .collect();
                (id, rows)
            })
            .collect();
        Self { regattas }
    }
}

impl RotationStore for MemoryStore {
    fn reset(&mut self, regatta: &str, race: Option<RaceId>) -> Result<()> {
        match race {
            Some(race) => {
                if let Some(rows) = self.regattas.get_mut(regatta) {
                    rows.retain(|(r, _), _| *r != race);
                }
            }
            None => {
                self.regattas.remove(regatta);
            }
        }
        debug!("Reset assignments for {regatta} ({race:?})");
        Ok(())
    }

    fn commit(&mut self, batch: Batch) -> Result<()> {
        let rows = self.regattas.entry(batch.regatta).or_default();
        for a in batch.assignments {
            rows.insert((a.race, a.team), a.sail);
        }
        Ok(())
    }

    fn lookup(&self, regatta: &str, race: RaceId, team: TeamId) -> Option<Sail> {
        self.regattas.get(regatta)?.get(&(race, team)).cloned()
    }

    fn list(&self, regatta: &str, race: RaceId) -> Vec<Assignment> {
        let mut rows: Vec<Assignment> = match self.regattas.get(regatta) {
            Some(rows) => rows
                .range((race, TeamId(0))..=(race, TeamId(usize::MAX)))
                .map(|(&(race, team), sail)| Assignment {
                    race,
                    team,
                    sail: sail.clone(),
                })
                .collect(),
            None => Vec::new(),
        };
        sort_assignments(&mut rows);
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(race: usize, team: usize, label: &str) -> Assignment {
        Assignment {
            race: RaceId(race),
            team: TeamId(team),
            sail: Sail::new(label, ""),
        }
    }

    fn batch(rows: Vec<Assignment>) -> Batch {
        Batch {
            regatta: "r".into(),
            assignments: rows,
        }
    }

    #[test]
    fn commit_is_last_write_wins() {
        let mut store = MemoryStore::new();
        store.commit(batch(vec![row(0, 0, "1"), row(0, 0, "5")])).unwrap();
        store.commit(batch(vec![row(0, 1, "2")])).unwrap();
        assert_eq!(store.lookup("r", RaceId(0), TeamId(0)), Some(Sail::new("5", "")));
        assert_eq!(store.assignments("r").len(), 2);
    }

    #[test]
    fn list_orders_by_sail() {
        let mut store = MemoryStore::new();
        store
            .commit(batch(vec![row(1, 0, "10"), row(1, 1, "9"), row(1, 2, "A9"), row(2, 0, "1")]))
            .unwrap();
        let labels: Vec<String> = store
            .list("r", RaceId(1))
            .into_iter()
            .map(|a| a.sail.label)
            .collect();
        assert_eq!(labels, vec!["9", "A9", "10"]);
    }

    #[test]
    fn reset_race_or_regatta() {
        let mut store = MemoryStore::new();
        store.commit(batch(vec![row(0, 0, "1"), row(1, 0, "2")])).unwrap();
        store.reset("r", Some(RaceId(0))).unwrap();
        assert!(store.lookup("r", RaceId(0), TeamId(0)).is_none());
        assert!(store.lookup("r", RaceId(1), TeamId(0)).is_some());
        store.reset("r", None).unwrap();
        assert!(store.assignments("r").is_empty());
    }

    #[test]
    fn regattas_do_not_share_handles() {
        let mut store = MemoryStore::new();
        store.commit(batch(vec![row(0, 0, "1")])).unwrap();
        assert!(store.lookup("other", RaceId(0), TeamId(0)).is_none());
    }

    #[test]
    fn snapshot_restores_rows() {
        let mut store = MemoryStore::new();
        store.commit(batch(vec![row(0, 0, "1"), row(0, 1, "2")])).unwrap();
        let restored = MemoryStore::from_snapshot(store.snapshot());
        assert_eq!(restored.assignments("r"), store.assignments("r"));
    }
}
