//! Complete mutable state of one game
//!
//! Entities live in id-ordered arenas so every iteration the engine does is
//! stable across runs. The board template is not part of the state; it is
//! passed alongside as read-only lookup data.

use std::collections::BTreeMap;

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::city::City;
use crate::core::error::{GameError, Result};
use crate::core::types::{CityId, GameId, ParticipantId, TurnNumber, UnitId};
use crate::game::participant::Participant;
use crate::game::summary::TurnRecord;
use crate::game::unit::{Unit, UnitType};
use crate::map::board::Board;
use crate::map::hex::OffsetCoord;

/// Game lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum GameStatus {
    Active,
    Finished { winner: Option<ParticipantId> },
}

/// Per-game copy of the board's resource stock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStock {
    width: u32,
    height: u32,
    remaining: Vec<u32>,
}

impl ResourceStock {
    /// Copy the template amounts of a board
    pub fn from_board(board: &Board) -> Self {
        Self {
            width: board.width,
            height: board.height,
            remaining: board.template_stock(),
        }
    }

    fn index_of(&self, coord: OffsetCoord) -> Option<usize> {
        if coord.row < 0
            || coord.col < 0
            || coord.row >= self.height as i32
            || coord.col >= self.width as i32
        {
            return None;
        }
        Some(coord.row as usize * self.width as usize + coord.col as usize)
    }

    pub fn remaining(&self, coord: OffsetCoord) -> u32 {
        self.index_of(coord)
            .and_then(|i| self.remaining.get(i).copied())
            .unwrap_or(0)
    }

    /// Take up to `amount` from a tile, returns amount actually taken
    pub fn take(&mut self, coord: OffsetCoord, amount: u32) -> u32 {
        let Some(slot) = self.index_of(coord).and_then(|i| self.remaining.get_mut(i)) else {
            return 0;
        };
        let taken = amount.min(*slot);
        *slot -= taken;
        taken
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub id: GameId,
    pub turn: TurnNumber,
    pub active: ParticipantId,
    pub status: GameStatus,
    /// An action or end-turn sequence is in flight
    pub busy: bool,
    pub rng_seed: u64,
    pub next_unit_id: u32,
    /// Round-robin seat order
    pub participants: Vec<Participant>,
    pub units: BTreeMap<UnitId, Unit>,
    pub cities: BTreeMap<CityId, City>,
    pub stock: ResourceStock,
    pub history: Vec<TurnRecord>,
}

impl GameState {
    /// Empty game on a board; the first participant starts
    pub fn new(id: GameId, rng_seed: u64, board: &Board, participants: Vec<Participant>) -> Self {
        let active = participants
            .first()
            .map(|p| p.id)
            .unwrap_or(ParticipantId(0));
        Self {
            id,
            turn: 1,
            active,
            status: GameStatus::Active,
            busy: false,
            rng_seed,
            next_unit_id: 1,
            participants,
            units: BTreeMap::new(),
            cities: BTreeMap::new(),
            stock: ResourceStock::from_board(board),
            history: Vec::new(),
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, GameStatus::Finished { .. })
    }

    pub fn winner(&self) -> Option<ParticipantId> {
        match self.status {
            GameStatus::Finished { winner } => winner,
            GameStatus::Active => None,
        }
    }

    // === PARTICIPANTS ===

    pub fn participant(&self, id: ParticipantId) -> Result<&Participant> {
        self.participants
            .iter()
            .find(|p| p.id == id)
            .ok_or(GameError::ParticipantNotFound(id))
    }

    pub fn participant_mut(&mut self, id: ParticipantId) -> Result<&mut Participant> {
        self.participants
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(GameError::ParticipantNotFound(id))
    }

    pub fn active_participant(&self) -> Result<&Participant> {
        self.participant(self.active)
    }

    pub fn live_participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| !p.eliminated)
    }

    // === UNITS ===

    pub fn unit(&self, id: UnitId) -> Result<&Unit> {
        self.units.get(&id).ok_or(GameError::UnitNotFound(id))
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Result<&mut Unit> {
        self.units.get_mut(&id).ok_or(GameError::UnitNotFound(id))
    }

    pub fn unit_at(&self, coord: OffsetCoord) -> Option<&Unit> {
        self.units.values().find(|u| u.coord == coord)
    }

    /// Unit ids of a participant, ascending
    pub fn units_of(&self, owner: ParticipantId) -> Vec<UnitId> {
        self.units
            .values()
            .filter(|u| u.owner == owner)
            .map(|u| u.id)
            .collect()
    }

    /// Tile -> unit index for fast occupancy checks
    pub fn occupancy(&self) -> AHashMap<OffsetCoord, UnitId> {
        self.units.values().map(|u| (u.coord, u.id)).collect()
    }

    /// Tiles holding units not owned by `owner`
    pub fn enemy_unit_tiles(&self, owner: ParticipantId) -> AHashSet<OffsetCoord> {
        self.units
            .values()
            .filter(|u| u.owner != owner)
            .map(|u| u.coord)
            .collect()
    }

    /// Place a new unit at full HP, allocating the next id
    ///
    /// The caller is responsible for checking the tile is free.
    pub fn spawn_unit(
        &mut self,
        owner: ParticipantId,
        unit_type: &UnitType,
        coord: OffsetCoord,
    ) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        self.units.insert(id, Unit::new(id, owner, unit_type, coord));
        id
    }

    // === CITIES ===

    pub fn city(&self, id: CityId) -> Result<&City> {
        self.cities.get(&id).ok_or(GameError::CityNotFound(id))
    }

    pub fn city_mut(&mut self, id: CityId) -> Result<&mut City> {
        self.cities.get_mut(&id).ok_or(GameError::CityNotFound(id))
    }

    pub fn city_at(&self, coord: OffsetCoord) -> Option<&City> {
        self.cities.values().find(|c| c.coord == coord)
    }

    /// City ids of a participant, ascending
    pub fn cities_of(&self, owner: ParticipantId) -> Vec<CityId> {
        self.cities
            .values()
            .filter(|c| c.owner == owner)
            .map(|c| c.id)
            .collect()
    }

    /// Which city's territory contains `coord`, if any
    pub fn territory_owner(&self, coord: OffsetCoord) -> Option<CityId> {
        self.cities
            .values()
            .find(|c| c.territory.contains(&coord))
            .map(|c| c.id)
    }

    /// City tiles belonging to participants other than `owner`
    pub fn foreign_city_tiles(&self, owner: ParticipantId) -> AHashSet<OffsetCoord> {
        self.cities
            .values()
            .filter(|c| c.owner != owner)
            .map(|c| c.coord)
            .collect()
    }
}
