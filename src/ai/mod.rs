//! AI opponents
//!
//! Architecture: trait + policy
//! - `AiController` is the seam the turn engine drives
//! - `GreedyAi` is the built-in deterministic policy
//!
//! Controllers apply their decisions through the same command functions human
//! commands use, so AI actions obey the same legality rules.

pub mod greedy;

pub use greedy::GreedyAi;

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{CityId, ParticipantId, UnitId};
use crate::game::rules::Ruleset;
use crate::game::state::GameState;
use crate::game::summary::ProducedUnit;
use crate::map::board::Board;
use crate::map::hex::OffsetCoord;

/// One decision an AI carried out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AiAction {
    AttackUnit {
        unit: UnitId,
        target: UnitId,
        damage: u32,
        counter_damage: Option<u32>,
    },
    AttackCity {
        unit: UnitId,
        city: CityId,
        damage: u32,
    },
    Capture {
        unit: UnitId,
        city: CityId,
    },
    Move {
        unit: UnitId,
        from: OffsetCoord,
        to: OffsetCoord,
    },
    /// Nothing useful to do this turn
    Hold { unit: UnitId },
    Produce {
        city: CityId,
        produced: ProducedUnit,
    },
    ProductionDelayed {
        city: CityId,
        unit_type: String,
    },
}

/// Trait for AI implementations
pub trait AiController: Send + Sync {
    /// Play one full turn for `actor`, mutating `state` in place
    ///
    /// Must be deterministic in (state, board, rules).
    fn take_turn(
        &self,
        state: &mut GameState,
        board: &Board,
        rules: &Ruleset,
        actor: ParticipantId,
    ) -> Result<Vec<AiAction>>;

    fn name(&self) -> &str;
}
