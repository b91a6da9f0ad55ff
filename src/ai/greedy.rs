//! Greedy AI - attack what is in reach, otherwise march on the nearest city
//!
//! Units act in ascending id order:
//! 1. attack the nearest enemy unit in range (lowest id on ties)
//! 2. else deal with an enemy city in range: walk in if it has fallen and the
//!    unit is melee, otherwise attack it
//! 3. else step to the first neighbor (direction order) that gets closer to
//!    the nearest enemy city
//!
//! Then every owned city attempts auto-production.

use ahash::AHashSet;

use crate::ai::{AiAction, AiController};
use crate::city::production::{auto_produce, ProductionResult};
use crate::city::City;
use crate::core::error::Result;
use crate::core::types::{ParticipantId, UnitId};
use crate::game::commands::{attack_city, attack_unit, move_unit, CommandOutcome};
use crate::game::rules::Ruleset;
use crate::game::state::GameState;
use crate::game::unit::Unit;
use crate::map::board::Board;
use crate::map::hex::OffsetCoord;

#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyAi;

impl GreedyAi {
    pub fn new() -> Self {
        Self
    }

    fn act_unit(
        &self,
        state: &mut GameState,
        board: &Board,
        rules: &Ruleset,
        actor: ParticipantId,
        unit_id: UnitId,
    ) -> Result<Option<AiAction>> {
        let Some(unit) = state.units.get(&unit_id) else {
            return Ok(None);
        };
        if unit.has_acted {
            return Ok(None);
        }
        let unit_type = rules.unit_types.require(&unit.unit_type)?;
        let here = unit.coord;

        // Enemy unit in range
        let target = state
            .units
            .values()
            .filter(|u| u.owner != actor)
            .map(|u| (u.coord.distance(&here), u.id))
            .filter(|(d, _)| unit_type.in_range(*d))
            .min();
        if let Some((_, target)) = target {
            let outcome = attack_unit(state, rules, actor, unit_id, target);
            return Ok(attempt(outcome, unit_id)?.map(|outcome| match outcome {
                CommandOutcome::Attacked { result, .. } => AiAction::AttackUnit {
                    unit: unit_id,
                    target,
                    damage: result.damage,
                    counter_damage: result.counter_damage,
                },
                _ => AiAction::Hold { unit: unit_id },
            }));
        }

        // Enemy city in range
        let city = enemy_cities(state, actor)
            .map(|c| (c.coord.distance(&here), c.id, c.coord, c.has_fallen()))
            .filter(|(d, ..)| unit_type.in_range(*d))
            .min();
        if let Some((distance, city, coord, fallen)) = city {
            let walk_in = fallen
                && !unit_type.ranged
                && distance == 1
                && state.unit_at(coord).is_none();
            if walk_in {
                let outcome = move_unit(state, board, rules, actor, unit_id, coord);
                return Ok(attempt(outcome, unit_id)?.map(|_| AiAction::Capture {
                    unit: unit_id,
                    city,
                }));
            }
            let outcome = attack_city(state, rules, actor, unit_id, city);
            return Ok(attempt(outcome, unit_id)?.map(|outcome| match outcome {
                CommandOutcome::CityAttacked { result, .. } => AiAction::AttackCity {
                    unit: unit_id,
                    city,
                    damage: result.damage,
                },
                _ => AiAction::Hold { unit: unit_id },
            }));
        }

        // Advance
        let Some(step) = next_step(state, board, actor, here) else {
            return Ok(Some(AiAction::Hold { unit: unit_id }));
        };
        let outcome = move_unit(state, board, rules, actor, unit_id, step);
        Ok(Some(match attempt(outcome, unit_id)? {
            Some(_) => AiAction::Move {
                unit: unit_id,
                from: here,
                to: step,
            },
            None => AiAction::Hold { unit: unit_id },
        }))
    }
}

impl AiController for GreedyAi {
    fn take_turn(
        &self,
        state: &mut GameState,
        board: &Board,
        rules: &Ruleset,
        actor: ParticipantId,
    ) -> Result<Vec<AiAction>> {
        let mut actions = Vec::new();

        for unit_id in state.units_of(actor) {
            if state.is_finished() {
                return Ok(actions);
            }
            if let Some(action) = self.act_unit(state, board, rules, actor, unit_id)? {
                tracing::debug!(participant = %actor, ?action, "AI action");
                actions.push(action);
            }
        }
        if state.is_finished() {
            return Ok(actions);
        }

        for city_id in state.cities_of(actor) {
            match auto_produce(state, board, rules, city_id)? {
                ProductionResult::Produced(produced) => actions.push(AiAction::Produce {
                    city: city_id,
                    produced,
                }),
                ProductionResult::Delayed { unit_type } => {
                    actions.push(AiAction::ProductionDelayed {
                        city: city_id,
                        unit_type,
                    })
                }
                ProductionResult::Idle => {}
            }
        }

        Ok(actions)
    }

    fn name(&self) -> &str {
        "greedy"
    }
}

fn enemy_cities(state: &GameState, actor: ParticipantId) -> impl Iterator<Item = &City> {
    state.cities.values().filter(move |c| c.owner != actor)
}

/// Neighbor of `from` that strictly closes in on the nearest enemy city
fn next_step(
    state: &GameState,
    board: &Board,
    actor: ParticipantId,
    from: OffsetCoord,
) -> Option<OffsetCoord> {
    let (current, _, goal) = enemy_cities(state, actor)
        .map(|c| (c.coord.distance(&from), c.id, c.coord))
        .min()?;

    let occupied: AHashSet<OffsetCoord> = state.units.values().map(|u: &Unit| u.coord).collect();
    let foreign_cities = state.foreign_city_tiles(actor);

    from.neighbors().into_iter().find(|n| {
        board.is_passable(*n)
            && !occupied.contains(n)
            && !foreign_cities.contains(n)
            && n.distance(&goal) < current
    })
}

/// Keep the outcome of a legal action; a rejected one means the unit holds
fn attempt(
    outcome: Result<CommandOutcome>,
    unit: UnitId,
) -> Result<Option<CommandOutcome>> {
    match outcome {
        Ok(outcome) => Ok(Some(outcome)),
        Err(err) if err.is_defect() => Err(err),
        Err(err) => {
            tracing::warn!(unit = %unit, error = %err, "AI action rejected");
            Ok(None)
        }
    }
}
