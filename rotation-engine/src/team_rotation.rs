//! # team_rotation
//!
//! Boat assignment for team-racing rounds.
//!
//! A round carries a fixed race-order template (which two teams meet in each
//! race) and one attached rotation: a fixed-size list of sails with parallel
//! colors. Each team in a race sails one boat per division, so a race consumes
//! `2 * divisions` sails.
//!
//! ## Frequencies
//! - **frequent**: boats change every race; a cursor walks the rotation.
//! - **infrequent**: boats change once per flight. A flight is the block of
//!   races that uses every boat once; teams keep their boats across flights
//!   when they can.
//! - **none**: every team keeps one boat group for the whole round.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

use sail_types::{Division, Sail};

use crate::error::{Result, RotationError};
use crate::regatta::TeamId;

// ─── Types ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Frequent,
    Infrequent,
    None,
}

/// Ordered `(team1, team2)` pairs, 1-based indices into the round's team list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(usize, usize)>", into = "Vec<(usize, usize)>")]
pub struct RaceOrderTemplate {
    pairs: Vec<(usize, usize)>,
}

impl RaceOrderTemplate {
    pub fn new(pairs: Vec<(usize, usize)>) -> Result<Self> {
        if let Some(pos) = pairs.iter().position(|&(a, b)| a == 0 || b == 0) {
            return Err(RotationError::InvalidArgument(format!(
                "race order pair {} uses team index 0; indices are 1-based",
                pos + 1
            )));
        }
        Ok(Self { pairs })
    }

    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl TryFrom<Vec<(usize, usize)>> for RaceOrderTemplate {
    type Error = RotationError;

    fn try_from(pairs: Vec<(usize, usize)>) -> Result<Self> {
        Self::new(pairs)
    }
}

impl From<RaceOrderTemplate> for Vec<(usize, usize)> {
    fn from(t: RaceOrderTemplate) -> Self {
        t.pairs
    }
}

/// Fixed-size parallel sails and colors. The size locks on the first assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RotationBoats", into = "RotationBoats")]
pub struct TeamRotation {
    sails: Vec<String>,
    colors: Vec<String>,
    size: Option<usize>,
}

/// Serialized form of [`TeamRotation`]; loading goes through the size lock.
#[derive(Serialize, Deserialize)]
struct RotationBoats {
    #[serde(default)]
    sails: Vec<String>,
    #[serde(default)]
    colors: Vec<String>,
}

impl TryFrom<RotationBoats> for TeamRotation {
    type Error = RotationError;

    fn try_from(boats: RotationBoats) -> Result<Self> {
        if boats.sails.is_empty() && boats.colors.is_empty() {
            return Ok(Self::new());
        }
        Self::with_sails(boats.sails, boats.colors)
    }
}

impl From<TeamRotation> for RotationBoats {
    fn from(r: TeamRotation) -> Self {
        Self {
            sails: r.sails,
            colors: r.colors,
        }
    }
}

impl TeamRotation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sails(sails: Vec<String>, colors: Vec<String>) -> Result<Self> {
        let mut rotation = Self::new();
        rotation.set_sails(sails)?;
        rotation.set_colors(colors)?;
        Ok(rotation)
    }

    fn lock(&mut self, len: usize) -> Result<()> {
        match self.size {
            Some(locked) if locked != len => Err(RotationError::SizeLocked {
                locked,
                attempted: len,
            }),
            _ => {
                self.size = Some(len);
                Ok(())
            }
        }
    }

    pub fn set_sails(&mut self, sails: Vec<String>) -> Result<()> {
        self.lock(sails.len())?;
        self.sails = sails;
        Ok(())
    }

    pub fn set_colors(&mut self, colors: Vec<String>) -> Result<()> {
        self.lock(colors.len())?;
        self.colors = colors;
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.size.unwrap_or(0)
    }

    /// Sail at position `i`, wrapping around the rotation.
    pub fn sail(&self, i: usize) -> Sail {
        let i = i % self.sails.len().max(1);
        Sail::new(
            self.sails.get(i).cloned().unwrap_or_default(),
            self.colors.get(i).cloned().unwrap_or_default(),
        )
    }
}

/// A team-racing round: its schedule and the boats it uses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Round {
    pub name: String,
    #[serde(default)]
    pub race_order: Option<RaceOrderTemplate>,
    #[serde(default)]
    pub rotation: Option<TeamRotation>,
}

/// `result[race_order_index][team][division]`.
pub type RoundSails = Vec<BTreeMap<TeamId, BTreeMap<Division, Sail>>>;

/// Same shape keyed by 0-based position in the round's team list.
type IndexedSails = Vec<BTreeMap<usize, BTreeMap<Division, Sail>>>;

// ─── Assignment ───────────────────────────────────────────────────────────────

/// Assign boats to every race of `round`. Template index `i` names `teams[i - 1]`.
/// Empty when the round has no race order or no rotation yet.
pub fn assign_sails(round: &Round, teams: &[TeamId], divisions: &[Division], frequency: Frequency) -> Result<RoundSails> {
    let (Some(template), Some(rotation)) = (&round.race_order, &round.rotation) else {
        debug!("Round {} has no race order or rotation yet", round.name);
        return Ok(Vec::new());
    };
    let size = rotation.count();
    if size == 0 || template.is_empty() {
        return Ok(Vec::new());
    }
    if divisions.is_empty() {
        return Err(RotationError::InvalidArgument("no divisions to assign".into()));
    }
    let pairs = zero_based(template, teams.len())?;

    let sails = match frequency {
        Frequency::Frequent => frequent(&pairs, rotation, divisions),
        Frequency::Infrequent => infrequent(&pairs, rotation, divisions)?,
        Frequency::None => fixed(&pairs, rotation, divisions, teams.len())?,
    };
    debug!(
        "Assigned {} races of round {} ({frequency:?}, {size} boats, {} divisions)",
        sails.len(),
        round.name,
        divisions.len()
    );
    Ok(sails
        .into_iter()
        .map(|race| race.into_iter().map(|(i, boats)| (teams[i], boats)).collect())
        .collect())
}

fn zero_based(template: &RaceOrderTemplate, teams: usize) -> Result<Vec<(usize, usize)>> {
    template
        .pairs()
        .iter()
        .map(|&(a, b)| {
            if a > teams || b > teams {
                return Err(RotationError::InvalidArgument(format!(
                    "race order pair ({a}, {b}) is outside the {teams} teams of the round"
                )));
            }
            Ok((a - 1, b - 1))
        })
        .collect()
}

/// Sails `start..start + divisions.len()` (wrapping), one per division.
fn block(rotation: &TeamRotation, start: usize, divisions: &[Division]) -> BTreeMap<Division, Sail> {
    divisions
        .iter()
        .enumerate()
        .map(|(d, &division)| (division, rotation.sail(start + d)))
        .collect()
}

fn frequent(pairs: &[(usize, usize)], rotation: &TeamRotation, divisions: &[Division]) -> IndexedSails {
    let size = rotation.count();
    let width = divisions.len();
    let mut cursor = 0;
    pairs
        .iter()
        .map(|&(t1, t2)| {
            let mut race = BTreeMap::new();
            race.insert(t1, block(rotation, cursor, divisions));
            race.insert(t2, block(rotation, cursor + width, divisions));
            cursor = (cursor + 2 * width) % size;
            race
        })
        .collect()
}

fn require_groups(rotation: &TeamRotation, width: usize) -> Result<usize> {
    let size = rotation.count();
    if size % width != 0 {
        return Err(RotationError::InvalidArgument(format!(
            "rotation of {size} boats cannot be split into groups of {width}"
        )));
    }
    Ok(size / width)
}

fn infrequent(pairs: &[(usize, usize)], rotation: &TeamRotation, divisions: &[Division]) -> Result<IndexedSails> {
    let width = divisions.len();
    let groups = require_groups(rotation, width)?;
    let flight_size = rotation.count() / (2 * width);
    if flight_size == 0 {
        return Err(RotationError::InvalidArgument(format!(
            "rotation of {} boats cannot fill one race of {} boats",
            rotation.count(),
            2 * width
        )));
    }

    let mut sails = IndexedSails::with_capacity(pairs.len());
    let mut previous: HashMap<usize, usize> = HashMap::new();
    for flight in pairs.chunks(flight_size) {
        let mut current: HashMap<usize, usize> = HashMap::new();
        let mut taken = BTreeSet::new();

        // Teams from the previous flight keep their group.
        for &(t1, t2) in flight {
            for team in [t1, t2] {
                if current.contains_key(&team) {
                    continue;
                }
                if let Some(&group) = previous.get(&team) {
                    if taken.insert(group) {
                        current.insert(team, group);
                    }
                }
            }
        }

        // Everyone else takes the free groups in race order.
        let mut free = (0..groups).filter(|g| !taken.contains(g)).collect::<Vec<_>>().into_iter();
        for &(t1, t2) in flight {
            for team in [t1, t2] {
                if current.contains_key(&team) {
                    continue;
                }
                // a flight never holds more distinct teams than groups
                let Some(group) = free.next() else { continue };
                current.insert(team, group);
            }
        }

        for &(t1, t2) in flight {
            let mut race = BTreeMap::new();
            for team in [t1, t2] {
                if let Some(&group) = current.get(&team) {
                    race.insert(team, block(rotation, group * width, divisions));
                }
            }
            sails.push(race);
        }
        previous = current;
    }
    Ok(sails)
}

fn fixed(pairs: &[(usize, usize)], rotation: &TeamRotation, divisions: &[Division], teams: usize) -> Result<IndexedSails> {
    let width = divisions.len();
    let groups = require_groups(rotation, width)?;
    if groups < teams {
        return Err(RotationError::InvalidArgument(format!(
            "rotation of {} boats cannot give each of {teams} teams its own {width} boats",
            rotation.count()
        )));
    }
    Ok(pairs
        .iter()
        .map(|&(t1, t2)| {
            [t1, t2]
                .into_iter()
                .map(|team| (team, block(rotation, team * width, divisions)))
                .collect()
        })
        .collect())
}
