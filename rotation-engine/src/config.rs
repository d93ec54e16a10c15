use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use sail_types::{Division, Sail};

use crate::error::{Result, RotationError};

// ─── Rotation Policy ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RotationType {
    #[default]
    Standard,
    Swap,
    None,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RotationStyle {
    #[default]
    Similar,
    Navy,
    Franny,
}

impl fmt::Display for RotationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Standard => "standard",
            Self::Swap => "swap",
            Self::None => "none",
        })
    }
}

impl fmt::Display for RotationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Similar => "similar",
            Self::Navy => "navy",
            Self::Franny => "franny",
        })
    }
}

// ─── Rotation Configuration ───────────────────────────────────────────────────

/// Authored by regatta setup and handed to a creator for one-shot computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationConfiguration {
    pub regatta: String,
    #[serde(rename = "type", default)]
    pub rotation_type: RotationType,
    #[serde(rename = "style", default)]
    pub rotation_style: RotationStyle,
    pub races_per_set: usize,
    pub division_order: Vec<Division>,
    pub sails: Vec<Sail>,
}

impl RotationConfiguration {
    /// Checks that hold regardless of the regatta the configuration is applied to.
    pub fn validate(&self) -> Result<()> {
        if self.races_per_set == 0 {
            return Err(RotationError::InvalidArgument(
                "races per set must be a positive integer".into(),
            ));
        }
        if self.sails.is_empty() {
            return Err(RotationError::InvalidArgument("sails list is empty".into()));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.division_order.iter().find(|d| !seen.insert(**d)) {
            return Err(RotationError::InvalidArgument(format!(
                "division {dup} appears twice in division order"
            )));
        }
        Ok(())
    }

    /// Checks `division_order` names exactly the regatta's divisions.
    pub fn validate_divisions(&self, divisions: &[Division]) -> Result<()> {
        if self.division_order.len() != divisions.len() {
            return Err(RotationError::LengthMismatch {
                left: "division order",
                left_len: self.division_order.len(),
                right: "regatta divisions",
                right_len: divisions.len(),
            });
        }
        if let Some(d) = self.division_order.iter().find(|d| !divisions.contains(*d)) {
            return Err(RotationError::InvalidArgument(format!(
                "division {d} is not part of the regatta"
            )));
        }
        Ok(())
    }
}
