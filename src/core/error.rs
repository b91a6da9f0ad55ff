use thiserror::Error;

use crate::core::types::{CityId, GameId, ParticipantId, UnitId};
use crate::map::hex::OffsetCoord;
use crate::map::terrain::ResourceKind;

/// Coarse classification of a failed command, for callers that map errors to
/// their own representation (status codes, UI messages).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    TurnOwnership,
    Occupancy,
    ActionBudget,
    Reachability,
    Range,
    TargetLegality,
    ResourceInsufficiency,
    Placement,
    Concurrency,
    Defect,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Game is already finished")]
    GameFinished,

    #[error("Not {0}'s turn")]
    NotYourTurn(ParticipantId),

    #[error("{actor} does not own {entity}")]
    NotOwner { actor: ParticipantId, entity: String },

    #[error("Unit not found: {0}")]
    UnitNotFound(UnitId),

    #[error("City not found: {0}")]
    CityNotFound(CityId),

    #[error("Participant not found: {0}")]
    ParticipantNotFound(ParticipantId),

    #[error("Game not found: {0}")]
    GameNotFound(GameId),

    #[error("Unknown unit type: {0}")]
    UnknownUnitType(String),

    #[error("Tile {0} is outside the map")]
    OutOfBounds(OffsetCoord),

    #[error("Tile {0} is impassable")]
    Impassable(OffsetCoord),

    #[error("Tile {0} is occupied")]
    Occupied(OffsetCoord),

    #[error("Unit {0} has already acted this turn")]
    UnitAlreadyActed(UnitId),

    #[error("City {0} has already acted this turn")]
    CityAlreadyActed(CityId),

    #[error("No path from {from} to {to} within {move_points} move points")]
    Unreachable {
        from: OffsetCoord,
        to: OffsetCoord,
        move_points: u32,
    },

    #[error("Target at distance {distance} is outside range {min}..={max}")]
    OutOfRange { distance: u32, min: u32, max: u32 },

    #[error("Cannot target own {0}")]
    FriendlyFire(String),

    #[error("City {0} cannot be entered by this unit")]
    CityDefended(CityId),

    #[error("Need {needed} {kind:?}, have {available}")]
    InsufficientResources {
        kind: ResourceKind,
        needed: u32,
        available: u32,
    },

    #[error("No free tile to place a unit around city {0}")]
    NoSpawnTile(CityId),

    #[error("Tile {0} already belongs to a city")]
    TerritoryClaimed(OffsetCoord),

    #[error("Tile {0} is not adjacent to the city's territory")]
    NotAdjacentToTerritory(OffsetCoord),

    #[error("Tile {coord} is {distance} hexes from the city centre (max {max})")]
    ExpansionTooFar {
        coord: OffsetCoord,
        distance: u32,
        max: u32,
    },

    #[error("Another action is already in progress for game {0}")]
    Busy(GameId),

    #[error("Missing unit type definition: {0}")]
    MissingUnitType(String),

    #[error("Inconsistent game state: {0}")]
    Inconsistent(String),
}

impl GameError {
    pub fn category(&self) -> ErrorCategory {
        use GameError::*;
        match self {
            GameFinished | NotYourTurn(_) | NotOwner { .. } => ErrorCategory::TurnOwnership,
            Occupied(_) => ErrorCategory::Occupancy,
            UnitAlreadyActed(_) | CityAlreadyActed(_) => ErrorCategory::ActionBudget,
            Unreachable { .. } | Impassable(_) | OutOfBounds(_) => ErrorCategory::Reachability,
            OutOfRange { .. } | ExpansionTooFar { .. } | NotAdjacentToTerritory(_) => {
                ErrorCategory::Range
            }
            FriendlyFire(_)
            | CityDefended(_)
            | UnitNotFound(_)
            | CityNotFound(_)
            | ParticipantNotFound(_)
            | GameNotFound(_)
            | UnknownUnitType(_) => ErrorCategory::TargetLegality,
            InsufficientResources { .. } => ErrorCategory::ResourceInsufficiency,
            NoSpawnTile(_) | TerritoryClaimed(_) => ErrorCategory::Placement,
            Busy(_) => ErrorCategory::Concurrency,
            MissingUnitType(_) | Inconsistent(_) => ErrorCategory::Defect,
        }
    }

    /// Defects indicate broken lookup data or state, not a bad request.
    pub fn is_defect(&self) -> bool {
        self.category() == ErrorCategory::Defect
    }
}

/// Errors raised while loading rules or scenarios
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid scenario: {0}")]
    Scenario(#[from] GameError),
}

pub type Result<T> = std::result::Result<T, GameError>;
