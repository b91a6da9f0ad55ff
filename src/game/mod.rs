//! Game layer - state, rules, commands and the turn engine

pub mod commands;
pub mod participant;
pub mod rules;
pub mod setup;
pub mod snapshot;
pub mod state;
pub mod summary;
pub mod turn;
pub mod unit;

pub use commands::{Command, CommandKind, CommandOutcome};
pub use participant::{Participant, ParticipantKind};
pub use rules::Ruleset;
pub use setup::Scenario;
pub use snapshot::{MemorySink, NullSink, SnapshotSink};
pub use state::{GameState, GameStatus, ResourceStock};
pub use summary::{ProducedUnit, TurnRecord, TurnReport, TurnSummary};
pub use turn::{advance_turn, Engine};
pub use unit::{Unit, UnitCost, UnitType, UnitTypeRegistry};
