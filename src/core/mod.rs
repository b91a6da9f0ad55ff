pub mod config;
pub mod error;
pub mod types;

pub use config::{EngineConfig, ProductionRule};
pub use error::{ErrorCategory, GameError, LoadError, Result};
pub use types::{CityId, GameId, ParticipantId, TurnNumber, UnitId};
