//! Turn engine - command dispatch, end-of-turn systems and the AI loop
//!
//! Every command runs on a working copy of the state. The caller's state is
//! replaced only when the command succeeds, so a rejection never leaves a
//! half-applied change behind.

use std::time::{Duration, Instant};

use crate::ai::{AiAction, AiController, GreedyAi};
use crate::city::economy::{harvest, is_under_siege, regenerate};
use crate::city::production::{auto_produce, ProductionResult};
use crate::core::error::{GameError, Result};
use crate::core::types::ParticipantId;
use crate::game::commands::{
    attack_city, attack_unit, ensure_turn, expand_territory, move_unit, spawn_unit, Command,
    CommandOutcome,
};
use crate::game::rules::Ruleset;
use crate::game::snapshot::SnapshotSink;
use crate::game::state::GameState;
use crate::game::summary::{TurnRecord, TurnReport, TurnSummary};
use crate::map::board::Board;

/// Applies commands to games played on one board under one ruleset
pub struct Engine<'a> {
    board: &'a Board,
    rules: &'a Ruleset,
    ai: &'a dyn AiController,
}

impl<'a> Engine<'a> {
    /// Engine driving AI seats with `GreedyAi`
    pub fn new(board: &'a Board, rules: &'a Ruleset) -> Self {
        Self {
            board,
            rules,
            ai: &GreedyAi,
        }
    }

    pub fn with_ai(mut self, ai: &'a dyn AiController) -> Self {
        self.ai = ai;
        self
    }

    pub fn board(&self) -> &Board {
        self.board
    }

    pub fn rules(&self) -> &Ruleset {
        self.rules
    }

    /// Validate and apply one command for `actor`
    pub fn submit(
        &self,
        state: &mut GameState,
        actor: ParticipantId,
        command: &Command,
        sink: &dyn SnapshotSink,
    ) -> Result<CommandOutcome> {
        let mut working = state.clone();
        let outcome = self.execute(&mut working, actor, command, sink)?;
        *state = working;
        Ok(outcome)
    }

    fn execute(
        &self,
        state: &mut GameState,
        actor: ParticipantId,
        command: &Command,
        sink: &dyn SnapshotSink,
    ) -> Result<CommandOutcome> {
        ensure_turn(state, actor)?;
        let (board, rules) = (self.board, self.rules);

        let outcome = match command {
            Command::MoveUnit { unit, to } => move_unit(state, board, rules, actor, *unit, *to)?,
            Command::Attack { attacker, target } => {
                attack_unit(state, rules, actor, *attacker, *target)?
            }
            Command::AttackCity { attacker, city } => {
                attack_city(state, rules, actor, *attacker, *city)?
            }
            Command::SpawnUnit { city, unit_type } => {
                spawn_unit(state, board, rules, actor, *city, unit_type)?
            }
            Command::ExpandTerritory { city, target } => {
                expand_territory(state, board, rules, actor, *city, *target)?
            }
            Command::EndTurn => CommandOutcome::TurnEnded(self.end_turn(state, sink)?),
        };

        tracing::debug!(
            game = %state.id,
            participant = %actor,
            kind = ?command.kind(),
            "Command applied"
        );
        Ok(outcome)
    }

    /// Close the active turn, then play AI seats until a human is up again or
    /// the AI budget runs out
    fn end_turn(&self, state: &mut GameState, sink: &dyn SnapshotSink) -> Result<TurnReport> {
        let mut report = empty_report(state);

        let record = self.close_turn(state, sink, TurnSummary::default(), Instant::now())?;
        report.records.push(record);
        advance_turn(state)?;

        self.play_ai(state, sink, &mut report)?;
        sync_report(&mut report, state);
        Ok(report)
    }

    /// Resume AI turns left pending when an earlier call ran out of budget
    pub fn run_ai_turns(
        &self,
        state: &mut GameState,
        sink: &dyn SnapshotSink,
    ) -> Result<TurnReport> {
        if state.is_finished() {
            return Err(GameError::GameFinished);
        }
        let mut working = state.clone();
        let mut report = empty_report(&working);

        self.play_ai(&mut working, sink, &mut report)?;
        sync_report(&mut report, &working);
        *state = working;
        Ok(report)
    }

    /// AI loop. The budget is only checked between whole turns, and the first
    /// turn always runs.
    fn play_ai(
        &self,
        state: &mut GameState,
        sink: &dyn SnapshotSink,
        report: &mut TurnReport,
    ) -> Result<()> {
        let budget = Duration::from_millis(self.rules.config.ai_budget_ms);
        let started = Instant::now();
        let mut turns_played = 0u32;

        while !state.is_finished() && state.active_participant()?.is_ai() {
            if turns_played > 0 && started.elapsed() >= budget {
                report.ai_pending = true;
                tracing::warn!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    turns_played,
                    "AI budget exhausted, returning control"
                );
                break;
            }
            turns_played += 1;

            let actor = state.active;
            let turn_started = Instant::now();
            let actions = self.ai.take_turn(state, self.board, self.rules, actor)?;

            let mut summary = TurnSummary {
                ai_executed: true,
                ..TurnSummary::default()
            };
            summary.produced.extend(actions.iter().filter_map(|action| match action {
                AiAction::Produce { produced, .. } => Some(produced.clone()),
                _ => None,
            }));
            tracing::debug!(
                ai = self.ai.name(),
                participant = %actor,
                actions = actions.len(),
                "AI turn played"
            );
            report.ai_actions.extend(actions);
            report.ai_executed = true;

            if state.is_finished() {
                // Game decided mid-turn; no upkeep for a finished game
                let participant = state.active;
                report.records.push(record_turn(state, participant, summary, turn_started));
                break;
            }

            let record = self.close_turn(state, sink, summary, turn_started)?;
            if turn_started.elapsed() > budget {
                report.overran = true;
                tracing::warn!(
                    participant = %actor,
                    elapsed_ms = record.elapsed_ms,
                    budget_ms = self.rules.config.ai_budget_ms,
                    "Single AI turn overran the budget"
                );
            }
            report.records.push(record);
            advance_turn(state)?;
        }
        Ok(())
    }

    /// Snapshot, then run upkeep for every city of the active participant and
    /// append the turn record
    fn close_turn(
        &self,
        state: &mut GameState,
        sink: &dyn SnapshotSink,
        mut summary: TurnSummary,
        started: Instant,
    ) -> Result<TurnRecord> {
        sink.snapshot(state);

        let participant = state.active;
        let config = &self.rules.config;
        let enemy_tiles = state.enemy_unit_tiles(participant);

        for city_id in state.cities_of(participant) {
            let besieged = is_under_siege(
                state.city(city_id)?,
                state.units.values(),
                config.siege_radius,
            );

            let GameState { cities, stock, .. } = &mut *state;
            let city = cities
                .get_mut(&city_id)
                .ok_or(GameError::CityNotFound(city_id))?;

            let restored = regenerate(city, besieged, config);
            if restored > 0 {
                summary.cities_regenerated += 1;
                summary.hp_regenerated += restored;
            }
            let gained = harvest(city, self.board, stock, &enemy_tiles, config.harvest_per_tile);
            for (kind, amount) in gained {
                summary.add_harvest(kind, amount);
            }

            match auto_produce(state, self.board, self.rules, city_id)? {
                ProductionResult::Produced(produced) => summary.produced.push(produced),
                ProductionResult::Delayed { .. } => summary.production_delayed += 1,
                ProductionResult::Idle => {}
            }
        }

        Ok(record_turn(state, participant, summary, started))
    }
}

/// Hand the turn to the next live participant in seat order
///
/// The turn number increases when play wraps past the last seat. The new
/// active participant's units and cities may act again.
pub fn advance_turn(state: &mut GameState) -> Result<()> {
    let seats = state.participants.len();
    let current = state
        .participants
        .iter()
        .position(|p| p.id == state.active)
        .ok_or_else(|| {
            GameError::Inconsistent(format!("active participant {} has no seat", state.active))
        })?;

    let (next, wrapped) = (1..=seats)
        .map(|step| ((current + step) % seats, current + step >= seats))
        .find(|(idx, _)| !state.participants[*idx].eliminated)
        .ok_or_else(|| GameError::Inconsistent("no live participants".into()))?;

    if wrapped {
        state.turn += 1;
    }
    let active = state.participants[next].id;
    state.active = active;

    for unit in state.units.values_mut().filter(|u| u.owner == active) {
        unit.has_acted = false;
    }
    for city in state.cities.values_mut().filter(|c| c.owner == active) {
        city.has_acted = false;
    }

    tracing::info!(turn = state.turn, active = %active, "Turn advanced");
    Ok(())
}

fn record_turn(
    state: &mut GameState,
    participant: ParticipantId,
    summary: TurnSummary,
    started: Instant,
) -> TurnRecord {
    let record = TurnRecord {
        turn: state.turn,
        participant,
        summary,
        elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    };
    tracing::info!(
        turn = record.turn,
        participant = %participant,
        produced = ?record.summary.produced_codes(),
        delayed = record.summary.production_delayed,
        elapsed_ms = record.elapsed_ms,
        "Turn closed"
    );
    state.history.push(record.clone());
    record
}

fn empty_report(state: &GameState) -> TurnReport {
    TurnReport {
        records: Vec::new(),
        ai_actions: Vec::new(),
        ai_executed: false,
        ai_pending: false,
        overran: false,
        turn: state.turn,
        active: state.active,
        status: state.status,
    }
}

fn sync_report(report: &mut TurnReport, state: &GameState) {
    report.turn = state.turn;
    report.active = state.active;
    report.status = state.status;
}
