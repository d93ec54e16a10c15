//! file.rs: TOML regatta file
//!
//! `[regatta]` describes teams, divisions and races. `[rotation]` (fleet
//! racing) and `[round]` (team racing) are both optional.

use anyhow::{Context, Result};
use serde::Deserialize;

use rotation_engine::{
    Frequency, RaceOrderTemplate, Regatta, RotationConfiguration, RotationStyle, RotationType, Round, Scoring,
    TeamRotation,
};
use sail_types::{Division, Sail};

#[derive(Debug, Deserialize)]
pub struct RegattaFile {
    pub regatta: RegattaSection,
    pub rotation: Option<RotationSection>,
    pub round: Option<RoundSection>,
}

#[derive(Debug, Deserialize)]
pub struct RegattaSection {
    pub id: String,
    #[serde(default)]
    pub scoring: Scoring,
    pub divisions: Vec<Division>,
    pub teams: Vec<String>,
    /// Races per division, numbered from 1.
    pub races: u32,
}

#[derive(Debug, Deserialize)]
pub struct RotationSection {
    #[serde(rename = "type", default)]
    pub rotation_type: RotationType,
    #[serde(default)]
    pub style: RotationStyle,
    #[serde(default = "default_races_per_set")]
    pub races_per_set: usize,
    /// Defaults to the regatta's division list.
    pub division_order: Option<Vec<Division>>,
    pub sails: Vec<Sail>,
}

#[derive(Debug, Deserialize)]
pub struct RoundSection {
    pub name: String,
    #[serde(default)]
    pub frequency: Frequency,
    pub race_order: RaceOrderTemplate,
    pub sails: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
}

fn default_races_per_set() -> usize {
    1
}

impl RegattaFile {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid regatta file")
    }
}

impl RegattaSection {
    pub fn build(&self) -> Result<Regatta> {
        let mut regatta = Regatta::new(self.id.clone(), self.scoring, self.divisions.clone());
        for team in &self.teams {
            regatta.add_team(team.clone());
        }
        regatta
            .add_races(self.races)
            .with_context(|| format!("cannot create races for {}", self.id))?;
        Ok(regatta)
    }
}

impl RotationSection {
    pub fn configuration(&self, regatta: &Regatta) -> RotationConfiguration {
        RotationConfiguration {
            regatta: regatta.id().to_string(),
            rotation_type: self.rotation_type,
            rotation_style: self.style,
            races_per_set: self.races_per_set,
            division_order: self
                .division_order
                .clone()
                .unwrap_or_else(|| regatta.divisions().to_vec()),
            sails: self.sails.clone(),
        }
    }
}

impl RoundSection {
    pub fn round(&self) -> Result<Round> {
        let colors = if self.colors.is_empty() {
            vec![String::new(); self.sails.len()]
        } else {
            self.colors.clone()
        };
        let rotation = TeamRotation::with_sails(self.sails.clone(), colors)
            .with_context(|| format!("invalid boats for round {}", self.name))?;
        Ok(Round {
            name: self.name.clone(),
            race_order: Some(self.race_order.clone()),
            rotation: Some(rotation),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_file_parses() {
        let file = RegattaFile::parse(include_str!("../regatta.toml")).unwrap();
        let regatta = file.regatta.build().unwrap();
        assert_eq!(regatta.team_ids().len(), 4);
        assert_eq!(regatta.race_numbers(), (1..=6).collect::<Vec<_>>());

        let config = file.rotation.as_ref().unwrap().configuration(&regatta);
        assert_eq!(config.division_order, vec![Division::A, Division::B]);
        assert_eq!(config.races_per_set, 2);

        let round = file.round.as_ref().unwrap().round().unwrap();
        assert_eq!(round.rotation.unwrap().count(), 8);
        assert_eq!(file.round.unwrap().frequency, Frequency::Infrequent);
    }

    #[test]
    fn mismatched_round_colors_are_rejected() {
        let text = r#"
            [regatta]
            id = "r"
            divisions = ["A"]
            teams = ["MIT", "BC"]
            races = 1

            [round]
            name = "Final"
            race_order = [[1, 2]]
            sails = ["1", "2"]
            colors = ["red"]
        "#;
        let file = RegattaFile::parse(text).unwrap();
        assert!(file.rotation.is_none());
        assert!(file.round.unwrap().round().is_err());
    }
}
