//! Turn summaries and the append-only turn history

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ai::AiAction;
use crate::core::types::{ParticipantId, TurnNumber, UnitId};
use crate::game::state::GameStatus;
use crate::map::hex::OffsetCoord;
use crate::map::terrain::ResourceKind;

/// A unit produced by a city during end-of-turn processing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducedUnit {
    pub unit: UnitId,
    pub unit_type: String,
    pub coord: OffsetCoord,
}

/// What the end-of-turn systems did for one participant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSummary {
    /// Cities that regained any HP
    pub cities_regenerated: u32,
    /// Total HP restored across cities
    pub hp_regenerated: u32,
    pub harvested: BTreeMap<ResourceKind, u32>,
    pub produced: Vec<ProducedUnit>,
    /// Cities that could afford a unit but had no free tile
    pub production_delayed: u32,
    pub ai_executed: bool,
}

impl TurnSummary {
    pub fn add_harvest(&mut self, kind: ResourceKind, amount: u32) {
        if amount > 0 {
            *self.harvested.entry(kind).or_insert(0) += amount;
        }
    }

    pub fn produced_codes(&self) -> Vec<&str> {
        self.produced.iter().map(|p| p.unit_type.as_str()).collect()
    }
}

/// One entry per (turn, participant), kept for history and telemetry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub turn: TurnNumber,
    pub participant: ParticipantId,
    pub summary: TurnSummary,
    pub elapsed_ms: u64,
}

/// Everything an EndTurn call did, including any AI turns it ran
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    /// Records for every participant turn closed by this call, in order
    pub records: Vec<TurnRecord>,
    pub ai_actions: Vec<AiAction>,
    pub ai_executed: bool,
    /// An AI seat is still active because the budget ran out
    pub ai_pending: bool,
    /// A single AI turn took longer than the whole budget
    pub overran: bool,
    pub turn: TurnNumber,
    pub active: ParticipantId,
    pub status: GameStatus,
}
