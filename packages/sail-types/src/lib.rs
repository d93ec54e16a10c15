//! # sail-types
//!
//! Shared sail and division types for the Regatta Suite rotation engine.
//!
//! These types are used by:
//! - `rotation-engine`: every rotator, creator and store works in terms of [`Sail`]
//! - `packages/rotation-cli`: TOML regatta files are deserialized into them
//!
//! ## Label Conventions
//!
//! A sail label mixes letters and digits ("12", "A12", "12b"). It is split into
//! `(prefix, numeric core, suffix)` around the *last* run of digits. The numeric
//! core is always compared as an integer, never as a string, so "9" sorts
//! before "10".

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── Division ──────────────────────────────────────────────────────────────────

/// A lettered sub-fleet racing in parallel with the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Division {
    A,
    B,
    C,
    D,
}

impl Division {
    pub const ALL: [Division; 4] = [Division::A, Division::B, Division::C, Division::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDivision(pub String);

impl fmt::Display for UnknownDivision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown division '{}'", self.0)
    }
}

impl std::error::Error for UnknownDivision {}

impl FromStr for Division {
    type Err = UnknownDivision;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            _ => Err(UnknownDivision(s.to_string())),
        }
    }
}

// ── Sail Label ────────────────────────────────────────────────────────────────

/// A sail label split around its last run of digits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SailLabel {
    pub prefix: String,
    /// Digits exactly as written (keeps zero padding). Empty if the label has no digits.
    pub core: String,
    pub suffix: String,
}

impl SailLabel {
    /// Scan from the end: trailing non-digits become the suffix, the digit run
    /// before them is the numeric core, everything else is the prefix.
    /// A label without digits is all prefix with a zero-valued core.
    pub fn parse(label: &str) -> Self {
        let end = match label.rfind(|c: char| c.is_ascii_digit()) {
            Some(pos) => pos + 1,
            None => {
                return Self {
                    prefix: label.to_string(),
                    core: String::new(),
                    suffix: String::new(),
                }
            }
        };
        let start = label[..end]
            .char_indices()
            .rev()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);

        Self {
            prefix: label[..start].to_string(),
            core: label[start..end].to_string(),
            suffix: label[end..].to_string(),
        }
    }

    /// Integer value of the numeric core (0 when there are no digits).
    pub fn numeric(&self) -> u64 {
        if self.core.is_empty() {
            return 0;
        }
        self.core.parse().unwrap_or(u64::MAX)
    }

    pub fn has_numeric(&self) -> bool {
        !self.core.is_empty()
    }

    /// Rebuild the label with a new numeric core, keeping prefix, suffix and
    /// the zero-padding width of the original core. Labels without digits
    /// come back unchanged.
    pub fn with_numeric(&self, value: u64) -> String {
        if !self.has_numeric() {
            return self.to_string();
        }
        let width = self.core.len();
        format!("{}{:0width$}{}", self.prefix, value, self.suffix, width = width)
    }
}

impl fmt::Display for SailLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.prefix, self.core, self.suffix)
    }
}

/// Canonical label ordering: numeric core as an integer, then prefix.
/// Suffix and the raw label only break remaining ties so the order is total.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    let (pa, pb) = (SailLabel::parse(a), SailLabel::parse(b));
    pa.numeric()
        .cmp(&pb.numeric())
        .then_with(|| pa.prefix.cmp(&pb.prefix))
        .then_with(|| pa.suffix.cmp(&pb.suffix))
        .then_with(|| a.cmp(b))
}

/// Smallest numeric core among `labels`, or `None` for an empty input.
pub fn min_numeric_core<'a, I>(labels: I) -> Option<u64>
where
    I: IntoIterator<Item = &'a str>,
{
    labels
        .into_iter()
        .map(|l| SailLabel::parse(l).numeric())
        .min()
}

// ── Sail ──────────────────────────────────────────────────────────────────────

/// Boat identifier assigned to a team for a race.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sail {
    pub label: String,
    #[serde(default)]
    pub color: String,
}

impl Sail {
    pub fn new(label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: color.into(),
        }
    }

    pub fn parsed(&self) -> SailLabel {
        SailLabel::parse(&self.label)
    }
}

impl Ord for Sail {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_labels(&self.label, &other.label).then_with(|| self.color.cmp(&other.color))
    }
}

impl PartialOrd for Sail {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Sail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}
