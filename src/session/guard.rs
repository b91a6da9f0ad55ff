//! Per-game busy lease
//!
//! Acquiring a lease marks the game busy under the table lock and hands out a
//! working copy of its state. Dropping the lease clears the flag, on success,
//! on rejection and while unwinding from a panic.

use std::sync::{Mutex, MutexGuard, PoisonError};

use ahash::AHashMap;

use crate::core::error::{GameError, Result};
use crate::core::types::GameId;
use crate::game::state::GameState;

/// Stored games, keyed by id
pub type GameTable = Mutex<AHashMap<GameId, GameState>>;

/// Lock a mutex, recovering the data if a previous holder panicked
///
/// Table entries are only ever replaced whole, so a poisoned lock still guards
/// consistent data.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
pub struct BusyLease<'a> {
    table: &'a GameTable,
    game: GameId,
}

impl<'a> BusyLease<'a> {
    /// Mark `game` busy and return a working copy of its state
    pub fn acquire(table: &'a GameTable, game: GameId) -> Result<(Self, GameState)> {
        let mut games = lock(table);
        let state = games.get_mut(&game).ok_or(GameError::GameNotFound(game))?;
        if state.busy {
            return Err(GameError::Busy(game));
        }
        state.busy = true;
        let working = state.clone();
        tracing::trace!(%game, "Lease acquired");
        Ok((Self { table, game }, working))
    }

    pub fn game(&self) -> GameId {
        self.game
    }

    /// Replace the stored state; the flag stays set until the lease drops
    pub fn commit(&self, mut state: GameState) {
        state.busy = true;
        lock(self.table).insert(self.game, state);
    }
}

impl Drop for BusyLease<'_> {
    fn drop(&mut self) {
        if let Some(state) = lock(self.table).get_mut(&self.game) {
            state.busy = false;
        }
        tracing::trace!(game = %self.game, "Lease released");
    }
}
