//! Snapshot hook invoked before end-of-turn mutation
//!
//! Storage is the caller's business; the engine only guarantees when the hook
//! runs and what it sees.

use std::sync::{Mutex, PoisonError};

use crate::game::state::GameState;

/// Receives the game state right before end-of-turn systems run
pub trait SnapshotSink: Send + Sync {
    fn snapshot(&self, state: &GameState);
}

/// Discards snapshots
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn snapshot(&self, _state: &GameState) {}
}

/// Keeps every snapshot in memory, oldest first
#[derive(Debug, Default)]
pub struct MemorySink {
    snapshots: Mutex<Vec<GameState>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> Vec<GameState> {
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SnapshotSink for MemorySink {
    fn snapshot(&self, state: &GameState) {
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(state.clone());
    }
}
