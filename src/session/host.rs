//! In-memory session host
//!
//! Owns a table of games and plays the orchestration role around the engine:
//! load the game, take the busy lease, run the command on a working copy,
//! store the result, remember it for replays.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use ahash::AHashMap;

use crate::core::error::{GameError, LoadError, Result};
use crate::core::types::{GameId, ParticipantId};
use crate::game::commands::{Command, CommandOutcome};
use crate::game::rules::Ruleset;
use crate::game::setup::Scenario;
use crate::game::snapshot::{NullSink, SnapshotSink};
use crate::game::state::GameState;
use crate::game::summary::TurnReport;
use crate::game::turn::Engine;
use crate::map::board::Board;
use crate::session::guard::{lock, BusyLease, GameTable};
use crate::session::replay::{ReplayCache, ReplayKey};

pub struct SessionHost {
    rules: Arc<Ruleset>,
    games: GameTable,
    boards: Mutex<AHashMap<GameId, Arc<Board>>>,
    replay: Mutex<ReplayCache>,
    sink: Arc<dyn SnapshotSink>,
}

impl SessionHost {
    pub fn new(rules: Ruleset) -> Self {
        let retention = Duration::from_secs(rules.config.replay_retention_secs);
        Self {
            rules: Arc::new(rules),
            games: Mutex::new(AHashMap::new()),
            boards: Mutex::new(AHashMap::new()),
            replay: Mutex::new(ReplayCache::new(retention)),
            sink: Arc::new(NullSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn SnapshotSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn rules(&self) -> &Ruleset {
        &self.rules
    }

    /// Build a scenario and register the new game
    pub fn create_game(&self, scenario: &Scenario) -> std::result::Result<GameId, LoadError> {
        let (board, state) = scenario.build(&self.rules)?;
        Ok(self.insert_game(board, state))
    }

    /// Register an already-built game
    pub fn insert_game(&self, board: Board, state: GameState) -> GameId {
        let id = state.id;
        lock(&self.boards).insert(id, Arc::new(board));
        lock(&self.games).insert(id, state);
        tracing::info!(game = %id, "Game registered");
        id
    }

    /// Current stored state
    pub fn state(&self, game: GameId) -> Result<GameState> {
        lock(&self.games)
            .get(&game)
            .cloned()
            .ok_or(GameError::GameNotFound(game))
    }

    pub fn board(&self, game: GameId) -> Result<Arc<Board>> {
        lock(&self.boards)
            .get(&game)
            .cloned()
            .ok_or(GameError::GameNotFound(game))
    }

    /// Submit a command under an idempotency token
    ///
    /// A repeated (game, kind, token) within the retention window returns the
    /// first result without running the command again. `Busy` and
    /// `GameNotFound` are never cached.
    pub fn submit(
        &self,
        game: GameId,
        actor: ParticipantId,
        token: &str,
        command: Command,
    ) -> Result<CommandOutcome> {
        let key = ReplayKey::new(game, command.kind(), token);
        if let Some(cached) = self.cached(&key) {
            return cached;
        }
        self.execute_once(key, actor, command)
    }

    fn cached(&self, key: &ReplayKey) -> Option<Result<CommandOutcome>> {
        let cached = lock(&self.replay).get(key, Instant::now());
        if cached.is_some() {
            tracing::debug!(
                game = %key.game,
                token = %key.token,
                kind = ?key.kind,
                "Replaying cached result"
            );
        }
        cached
    }

    /// Run a command under the lease and record its result
    ///
    /// The cache is consulted again once the lease is held: a request that
    /// missed it may have been waiting on an earlier run of the same token,
    /// which has since committed and released the game.
    fn execute_once(
        &self,
        key: ReplayKey,
        actor: ParticipantId,
        command: Command,
    ) -> Result<CommandOutcome> {
        let game = key.game;
        let board = self.board(game)?;
        let (lease, mut working) = BusyLease::acquire(&self.games, game)?;
        if let Some(cached) = self.cached(&key) {
            return cached;
        }

        let engine = Engine::new(&board, &self.rules);
        let result = engine.submit(&mut working, actor, &command, self.sink.as_ref());
        match &result {
            Ok(_) => lease.commit(working),
            Err(err) if err.is_defect() => {
                tracing::error!(%game, error = %err, "Command hit a defect");
            }
            Err(err) => tracing::debug!(%game, error = %err, "Command rejected"),
        }

        lock(&self.replay).insert(key, result.clone(), Instant::now());
        drop(lease);
        result
    }

    /// Continue AI turns left pending by the time budget
    pub fn resume_ai(&self, game: GameId) -> Result<TurnReport> {
        let board = self.board(game)?;
        let (lease, mut working) = BusyLease::acquire(&self.games, game)?;

        let engine = Engine::new(&board, &self.rules);
        let report = engine.run_ai_turns(&mut working, self.sink.as_ref())?;
        lease.commit(working);
        Ok(report)
    }
}
