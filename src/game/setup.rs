//! Scenario loading - board, seats, starting cities and units
//!
//! A scenario is a TOML file. Building it validates every placement, grants
//! initial territory and copies the board's resource stock into the new game.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::city::territory::initial_territory;
use crate::city::City;
use crate::core::error::{GameError, LoadError};
use crate::core::types::{CityId, GameId, ParticipantId};
use crate::game::participant::{Participant, ParticipantKind};
use crate::game::rules::Ruleset;
use crate::game::state::GameState;
use crate::map::board::{Board, BoardDef};
use crate::map::hex::OffsetCoord;
use crate::map::terrain::ResourceKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantDef {
    pub id: u32,
    pub name: String,
    pub kind: ParticipantKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityDef {
    pub id: u32,
    pub name: String,
    pub owner: u32,
    pub row: i32,
    pub col: i32,
    /// Starting resources
    #[serde(default)]
    pub stockpile: Vec<StockDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockDef {
    pub kind: ResourceKind,
    pub amount: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitDef {
    pub owner: u32,
    pub unit_type: String,
    pub row: i32,
    pub col: i32,
}

/// A playable starting position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub seed: u64,
    pub board: BoardDef,
    /// Seat order is file order
    pub participants: Vec<ParticipantDef>,
    pub cities: Vec<CityDef>,
    #[serde(default)]
    pub units: Vec<UnitDef>,
}

impl Scenario {
    pub fn from_toml_str(contents: &str) -> Result<Self, LoadError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Build the board and a fresh game with a random id
    pub fn build(&self, rules: &Ruleset) -> Result<(Board, GameState), LoadError> {
        self.build_with_id(GameId::new(), rules)
    }

    pub fn build_with_id(
        &self,
        id: GameId,
        rules: &Ruleset,
    ) -> Result<(Board, GameState), LoadError> {
        let board = Board::from_def(&self.board)?;
        let participants = self.participants()?;
        let mut state = GameState::new(id, self.seed, &board, participants);

        self.place_cities(&mut state, &board, rules)?;
        self.place_units(&mut state, &board, rules)?;

        tracing::info!(
            scenario = %self.name,
            game = %state.id,
            cities = state.cities.len(),
            units = state.units.len(),
            "Scenario loaded"
        );
        Ok((board, state))
    }

    fn participants(&self) -> Result<Vec<Participant>, LoadError> {
        if self.participants.len() < 2 {
            return Err(LoadError::Invalid("a scenario needs at least two participants".into()));
        }
        let mut seen = BTreeSet::new();
        self.participants
            .iter()
            .map(|def| {
                if !seen.insert(def.id) {
                    return Err(LoadError::Invalid(format!("duplicate participant id {}", def.id)));
                }
                Ok(Participant::new(ParticipantId(def.id), def.name.clone(), def.kind))
            })
            .collect()
    }

    fn place_cities(
        &self,
        state: &mut GameState,
        board: &Board,
        rules: &Ruleset,
    ) -> Result<(), LoadError> {
        let mut defs: Vec<&CityDef> = self.cities.iter().collect();
        defs.sort_by_key(|def| def.id);

        let centres: AHashSet<OffsetCoord> = defs
            .iter()
            .map(|d| OffsetCoord::new(d.row, d.col))
            .collect();
        if centres.len() != defs.len() {
            return Err(LoadError::Invalid("two cities share a tile".into()));
        }
        let mut claimed: AHashSet<OffsetCoord> = AHashSet::new();

        for def in defs {
            let id = CityId(def.id);
            let owner = ParticipantId(def.owner);
            let coord = OffsetCoord::new(def.row, def.col);

            if state.cities.contains_key(&id) {
                return Err(LoadError::Invalid(format!("duplicate city id {}", def.id)));
            }
            state.participant(owner)?;
            check_tile(board, coord)?;

            let mut city = City::new(id, def.name.clone(), owner, coord, rules.config.city_max_hp);
            let radius = rules.config.initial_territory_radius;
            city.territory = initial_territory(coord, board, radius, |c| {
                claimed.contains(&c) || (c != coord && centres.contains(&c))
            });
            city.initial_territory = city.territory.len() as u32;
            for stock in &def.stockpile {
                city.stockpile.add(stock.kind, stock.amount);
            }

            claimed.extend(city.territory.iter().copied());
            state.cities.insert(id, city);
        }

        for participant in &state.participants {
            if state.cities_of(participant.id).is_empty() {
                return Err(LoadError::Invalid(format!(
                    "participant {} starts without a city",
                    participant.id
                )));
            }
        }
        Ok(())
    }

    fn place_units(
        &self,
        state: &mut GameState,
        board: &Board,
        rules: &Ruleset,
    ) -> Result<(), LoadError> {
        for def in &self.units {
            let owner = ParticipantId(def.owner);
            let coord = OffsetCoord::new(def.row, def.col);
            state.participant(owner)?;
            let unit_type = rules
                .unit_types
                .get(&def.unit_type)
                .ok_or_else(|| GameError::UnknownUnitType(def.unit_type.clone()))?;
            check_tile(board, coord)?;
            if state.unit_at(coord).is_some() {
                return Err(GameError::Occupied(coord).into());
            }
            if state.city_at(coord).is_some_and(|c| c.owner != owner) {
                return Err(LoadError::Invalid(format!(
                    "unit at {} starts inside an enemy city",
                    coord
                )));
            }
            state.spawn_unit(owner, unit_type, coord);
        }
        Ok(())
    }
}

fn check_tile(board: &Board, coord: OffsetCoord) -> Result<(), GameError> {
    if !board.in_bounds(coord) {
        return Err(GameError::OutOfBounds(coord));
    }
    if !board.is_passable(coord) {
        return Err(GameError::Impassable(coord));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"
name = "small"
seed = 9

[board]
width = 6
height = 4
rows = [
    ". . . . . .",
    ". ~ . . . .",
    ". . . . . .",
    ". . . . . .",
]
deposits = [{ row = 0, col = 1, kind = "iron", amount = 30 }]

[[participants]]
id = 0
name = "Human"
kind = "human"

[[participants]]
id = 1
name = "AI"
kind = "ai"

[[cities]]
id = 1
name = "Aster"
owner = 0
row = 1
col = 1

[[cities]]
id = 2
name = "Brine"
owner = 1
row = 2
col = 4
stockpile = [{ kind = "wheat", amount = 5 }]

[[units]]
owner = 0
unit_type = "warrior"
row = 0
col = 0
"#;

    #[test]
    fn test_build_small_scenario() {
        let mut scenario = Scenario::from_toml_str(SMALL).unwrap();
        // Put the first city on land
        scenario.cities[0].col = 0;
        let (board, state) = scenario.build(&Ruleset::standard()).unwrap();

        assert_eq!(board.width, 6);
        assert_eq!(state.rng_seed, 9);
        assert_eq!(state.participants.len(), 2);
        assert_eq!(state.units.len(), 1);
        assert_eq!(state.stock.remaining(OffsetCoord::new(0, 1)), 30);

        let aster = state.city(CityId(1)).unwrap();
        assert!(aster.territory.contains(&OffsetCoord::new(1, 0)));
        // Water is never granted
        assert!(!aster.territory.contains(&OffsetCoord::new(1, 1)));
        assert_eq!(aster.initial_territory as usize, aster.territory.len());

        let brine = state.city(CityId(2)).unwrap();
        assert_eq!(brine.stockpile.get(ResourceKind::Wheat), 5);
        assert!(aster.territory.is_disjoint(&brine.territory));
    }

    #[test]
    fn test_city_on_water_rejected() {
        let scenario = Scenario::from_toml_str(SMALL).unwrap();
        let err = scenario.build(&Ruleset::standard()).unwrap_err();
        assert!(matches!(err, LoadError::Scenario(GameError::Impassable(_))));
    }

    #[test]
    fn test_stacked_units_rejected() {
        let mut scenario = Scenario::from_toml_str(SMALL).unwrap();
        scenario.cities[0].col = 0;
        let extra = scenario.units[0].clone();
        scenario.units.push(extra);

        let err = scenario.build(&Ruleset::standard()).unwrap_err();
        assert!(matches!(err, LoadError::Scenario(GameError::Occupied(_))));
    }

    #[test]
    fn test_unknown_owner_rejected() {
        let mut scenario = Scenario::from_toml_str(SMALL).unwrap();
        scenario.cities[0].col = 0;
        scenario.units[0].owner = 7;

        let err = scenario.build(&Ruleset::standard()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Scenario(GameError::ParticipantNotFound(ParticipantId(7)))
        ));
    }

    #[test]
    fn test_bundled_scenario_builds() {
        let scenario =
            Scenario::from_toml_str(include_str!("../../data/scenarios/crossing.toml")).unwrap();
        let (_, state) = scenario.build(&Ruleset::standard()).unwrap();
        assert_eq!(state.active, ParticipantId(0));
        assert!(state.participants.iter().any(|p| p.is_ai()));
    }
}
