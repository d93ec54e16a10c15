//! report.rs: JSON views of computed rotations

use serde_json::{json, Map, Value};

use rotation_engine::team_rotation::RoundSails;
use rotation_engine::{MemoryStore, Regatta, RotationStore};

/// `{ "<division>": { "<race number>": { "<team>": { "sail", "color" } } } }`
pub fn fleet_report(regatta: &Regatta, store: &MemoryStore) -> Value {
    let mut divisions = Map::new();
    for &division in regatta.divisions() {
        let mut races = Map::new();
        for race in regatta.races_in(division) {
            let Some(info) = regatta.race(race) else { continue };
            let mut teams = Map::new();
            for team in regatta.team_ids() {
                let (Some(t), Some(sail)) = (regatta.team(team), store.lookup(regatta.id(), race, team)) else {
                    continue;
                };
                teams.insert(t.name.clone(), json!({ "sail": sail.label, "color": sail.color }));
            }
            races.insert(info.number.to_string(), Value::Object(teams));
        }
        divisions.insert(division.to_string(), Value::Object(races));
    }
    Value::Object(divisions)
}

/// One entry per race of the round, teams by name.
pub fn round_report(regatta: &Regatta, sails: &RoundSails) -> Value {
    let races: Vec<Value> = sails
        .iter()
        .enumerate()
        .map(|(i, race)| {
            let mut teams = Map::new();
            for (&team, boats) in race {
                let name = regatta
                    .team(team)
                    .map(|t| t.name.clone())
                    .unwrap_or_else(|| format!("Team {}", team.0 + 1));
                let boats: Map<String, Value> = boats
                    .iter()
                    .map(|(d, s)| (d.to_string(), json!({ "sail": s.label, "color": s.color })))
                    .collect();
                teams.insert(name, Value::Object(boats));
            }
            json!({ "race": i + 1, "teams": teams })
        })
        .collect();
    Value::Array(races)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rotation_engine::{RotationManager, Scoring, Slot};
    use sail_types::{Division, Sail};
    use std::collections::BTreeMap;

    #[test]
    fn fleet_report_names_teams() {
        let mut regatta = Regatta::new("r", Scoring::Standard, vec![Division::A]);
        let mit = regatta.add_team("MIT");
        regatta.add_races(1).unwrap();
        let race = regatta.find_race(Division::A, 1).unwrap();

        let mut store = MemoryStore::new();
        let mut m = RotationManager::new(&regatta, &mut store);
        m.queue(race, Slot::Team(mit), Sail::new("7", "red"));
        m.commit().unwrap();

        let report = fleet_report(&regatta, &store);
        assert_eq!(report["A"]["1"]["MIT"]["sail"], "7");
        assert_eq!(report["A"]["1"]["MIT"]["color"], "red");
    }

    #[test]
    fn round_report_numbers_races_from_one() {
        let mut regatta = Regatta::new("r", Scoring::Standard, vec![Division::A]);
        regatta.add_team("MIT");
        let bc = regatta.add_team("BC");
        let mut race = BTreeMap::new();
        race.insert(bc, BTreeMap::from([(Division::A, Sail::new("12", "y"))]));
        let report = round_report(&regatta, &vec![race]);
        assert_eq!(report[0]["race"], 1);
        assert_eq!(report[0]["teams"]["BC"]["A"]["sail"], "12");
    }
}
