//! Command validation and application
//!
//! Each command function validates everything before it mutates anything, so a
//! rejected command leaves the state untouched. Turn ownership is checked by
//! the engine before dispatch; the functions here check entity ownership and
//! legality, which the AI relies on as well.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::city::production::{select_spawn_tile, spawn_scan_order};
use crate::city::territory::check_expansion;
use crate::combat::{resolve_attack, resolve_city_attack, AttackOutcome, CityAttackOutcome};
use crate::core::error::{GameError, Result};
use crate::core::types::{CityId, ParticipantId, UnitId};
use crate::game::rules::Ruleset;
use crate::game::state::{GameState, GameStatus};
use crate::game::summary::TurnReport;
use crate::game::unit::Unit;
use crate::map::board::Board;
use crate::map::hex::OffsetCoord;
use crate::map::pathfinding::find_path;
use crate::map::terrain::ResourceKind;

/// Inbound command from a participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    MoveUnit { unit: UnitId, to: OffsetCoord },
    Attack { attacker: UnitId, target: UnitId },
    AttackCity { attacker: UnitId, city: CityId },
    SpawnUnit { city: CityId, unit_type: String },
    ExpandTerritory { city: CityId, target: OffsetCoord },
    EndTurn,
}

/// Command discriminant, part of the replay cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    MoveUnit,
    Attack,
    AttackCity,
    SpawnUnit,
    ExpandTerritory,
    EndTurn,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::MoveUnit { .. } => CommandKind::MoveUnit,
            Command::Attack { .. } => CommandKind::Attack,
            Command::AttackCity { .. } => CommandKind::AttackCity,
            Command::SpawnUnit { .. } => CommandKind::SpawnUnit,
            Command::ExpandTerritory { .. } => CommandKind::ExpandTerritory,
            Command::EndTurn => CommandKind::EndTurn,
        }
    }
}

/// Result of an applied command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    Moved {
        unit: UnitId,
        path: Vec<OffsetCoord>,
        /// Set when the move captured a fallen enemy city
        captured: Option<CityId>,
    },
    Attacked {
        attacker: UnitId,
        target: UnitId,
        result: AttackOutcome,
    },
    CityAttacked {
        attacker: UnitId,
        city: CityId,
        result: CityAttackOutcome,
    },
    Spawned {
        city: CityId,
        unit: UnitId,
        unit_type: String,
        coord: OffsetCoord,
    },
    Expanded {
        city: CityId,
        target: OffsetCoord,
        cost: u32,
    },
    TurnEnded(TurnReport),
}

/// Game still running and `actor` holds the turn
pub fn ensure_turn(state: &GameState, actor: ParticipantId) -> Result<()> {
    if state.is_finished() {
        return Err(GameError::GameFinished);
    }
    if state.active != actor {
        return Err(GameError::NotYourTurn(actor));
    }
    Ok(())
}

fn ready_unit(state: &GameState, actor: ParticipantId, id: UnitId) -> Result<&Unit> {
    let unit = state.unit(id)?;
    if unit.owner != actor {
        return Err(GameError::NotOwner {
            actor,
            entity: format!("unit {}", id),
        });
    }
    if unit.has_acted {
        return Err(GameError::UnitAlreadyActed(id));
    }
    Ok(unit)
}

fn check_range(distance: u32, bounds: (u32, u32), in_range: bool) -> Result<()> {
    if in_range {
        Ok(())
    } else {
        Err(GameError::OutOfRange {
            distance,
            min: bounds.0,
            max: bounds.1,
        })
    }
}

/// Tiles of cities owned by others that still have HP
fn defended_city_tiles(state: &GameState, actor: ParticipantId) -> AHashSet<OffsetCoord> {
    state
        .cities
        .values()
        .filter(|c| c.owner != actor && !c.has_fallen())
        .map(|c| c.coord)
        .collect()
}

/// Move a unit along the cheapest path, capturing a fallen enemy city if a
/// melee unit ends on it
pub fn move_unit(
    state: &mut GameState,
    board: &Board,
    rules: &Ruleset,
    actor: ParticipantId,
    unit_id: UnitId,
    to: OffsetCoord,
) -> Result<CommandOutcome> {
    let unit = ready_unit(state, actor, unit_id)?;
    let unit_type = rules.unit_types.require(&unit.unit_type)?;
    let from = unit.coord;

    if !board.in_bounds(to) {
        return Err(GameError::OutOfBounds(to));
    }
    if !board.is_passable(to) {
        return Err(GameError::Impassable(to));
    }
    if state.unit_at(to).is_some_and(|u| u.id != unit_id) {
        return Err(GameError::Occupied(to));
    }

    let mut capture = None;
    if let Some(city) = state.city_at(to).filter(|c| c.owner != actor) {
        if !city.has_fallen() || unit_type.ranged {
            return Err(GameError::CityDefended(city.id));
        }
        capture = Some(city.id);
    }

    let enemy_tiles = state.enemy_unit_tiles(actor);
    let defended = defended_city_tiles(state, actor);
    let path = find_path(
        from,
        to,
        unit_type.move_points,
        board.width,
        board.height,
        |c| !board.is_passable(c) || enemy_tiles.contains(&c) || defended.contains(&c),
    )
    .ok_or(GameError::Unreachable {
        from,
        to,
        move_points: unit_type.move_points,
    })?;

    let unit = state.unit_mut(unit_id)?;
    unit.coord = to;
    unit.has_acted = true;
    tracing::debug!(unit = %unit_id, %from, %to, steps = path.len() - 1, "Unit moved");

    if let Some(city_id) = capture {
        capture_city(state, city_id, actor)?;
    }

    Ok(CommandOutcome::Moved {
        unit: unit_id,
        path,
        captured: capture,
    })
}

/// Unit attacks a unit of another participant
pub fn attack_unit(
    state: &mut GameState,
    rules: &Ruleset,
    actor: ParticipantId,
    attacker_id: UnitId,
    target_id: UnitId,
) -> Result<CommandOutcome> {
    let attacker = ready_unit(state, actor, attacker_id)?;
    let target = state.unit(target_id)?;
    if target.owner == actor {
        return Err(GameError::FriendlyFire(format!("unit {}", target_id)));
    }

    let attacker_type = rules.unit_types.require(&attacker.unit_type)?;
    let target_type = rules.unit_types.require(&target.unit_type)?;
    let distance = attacker.coord.distance(&target.coord);
    check_range(
        distance,
        attacker_type.range_bounds(),
        attacker_type.in_range(distance),
    )?;

    let result = resolve_attack(
        &attacker.combatant(attacker_type),
        &target.combatant(target_type),
    );

    apply_hp(state, attacker_id, result.attacker_hp)?;
    apply_hp(state, target_id, result.defender_hp)?;
    if let Some(unit) = state.units.get_mut(&attacker_id) {
        unit.has_acted = true;
    }

    tracing::debug!(
        attacker = %attacker_id,
        target = %target_id,
        damage = result.damage,
        counter = ?result.counter_damage,
        "Attack resolved"
    );

    Ok(CommandOutcome::Attacked {
        attacker: attacker_id,
        target: target_id,
        result,
    })
}

/// Set a unit's HP, removing it at zero
fn apply_hp(state: &mut GameState, id: UnitId, hp: u32) -> Result<()> {
    if hp == 0 {
        state.units.remove(&id);
        tracing::debug!(unit = %id, "Unit destroyed");
    } else {
        state.unit_mut(id)?.hp = hp;
    }
    Ok(())
}

/// Unit attacks a city of another participant
pub fn attack_city(
    state: &mut GameState,
    rules: &Ruleset,
    actor: ParticipantId,
    attacker_id: UnitId,
    city_id: CityId,
) -> Result<CommandOutcome> {
    let attacker = ready_unit(state, actor, attacker_id)?;
    let city = state.city(city_id)?;
    if city.owner == actor {
        return Err(GameError::FriendlyFire(format!("city {}", city_id)));
    }

    let attacker_type = rules.unit_types.require(&attacker.unit_type)?;
    let distance = attacker.coord.distance(&city.coord);
    check_range(
        distance,
        attacker_type.range_bounds(),
        attacker_type.in_range(distance),
    )?;

    let result = resolve_city_attack(
        &attacker.combatant(attacker_type),
        city.hp,
        rules.config.city_base_defence,
    );

    state.city_mut(city_id)?.hp = result.city_hp;
    state.unit_mut(attacker_id)?.has_acted = true;

    if result.city_fell {
        tracing::info!(city = %city_id, attacker = %attacker_id, "City defences broken");
    } else {
        tracing::debug!(
            city = %city_id,
            damage = result.damage,
            hp = result.city_hp,
            "City attacked"
        );
    }

    Ok(CommandOutcome::CityAttacked {
        attacker: attacker_id,
        city: city_id,
        result,
    })
}

/// Buy a unit in a city at its listed cost
pub fn spawn_unit(
    state: &mut GameState,
    board: &Board,
    rules: &Ruleset,
    actor: ParticipantId,
    city_id: CityId,
    code: &str,
) -> Result<CommandOutcome> {
    let city = state.city(city_id)?;
    if city.owner != actor {
        return Err(GameError::NotOwner {
            actor,
            entity: format!("city {}", city_id),
        });
    }
    if city.has_acted {
        return Err(GameError::CityAlreadyActed(city_id));
    }
    let unit_type = rules
        .unit_types
        .get(code)
        .ok_or_else(|| GameError::UnknownUnitType(code.to_string()))?;

    if let Some(cost) = unit_type.cost {
        let available = city.stockpile.get(cost.resource);
        if available < cost.amount {
            return Err(GameError::InsufficientResources {
                kind: cost.resource,
                needed: cost.amount,
                available,
            });
        }
    }

    let scan = spawn_scan_order(state.rng_seed, state.turn, city_id);
    let coord = select_spawn_tile(
        city,
        board,
        &state.occupancy(),
        &state.foreign_city_tiles(actor),
        &scan,
    )
    .ok_or(GameError::NoSpawnTile(city_id))?;

    let city = state.city_mut(city_id)?;
    if let Some(cost) = unit_type.cost {
        city.stockpile.spend(cost.resource, cost.amount);
    }
    city.has_acted = true;

    let unit = state.spawn_unit(actor, unit_type, coord);
    state.unit_mut(unit)?.has_acted = true;
    tracing::debug!(city = %city_id, unit = %unit, unit_type = code, %coord, "Unit purchased");

    Ok(CommandOutcome::Spawned {
        city: city_id,
        unit,
        unit_type: unit_type.code.clone(),
        coord,
    })
}

/// Claim one more tile for a city's territory, paid in wheat
pub fn expand_territory(
    state: &mut GameState,
    board: &Board,
    rules: &Ruleset,
    actor: ParticipantId,
    city_id: CityId,
    target: OffsetCoord,
) -> Result<CommandOutcome> {
    let city = state.city(city_id)?;
    if city.owner != actor {
        return Err(GameError::NotOwner {
            actor,
            entity: format!("city {}", city_id),
        });
    }
    let cost = check_expansion(state, board, &rules.config, city_id, target)?;

    let city = state.city_mut(city_id)?;
    city.stockpile.spend(ResourceKind::Wheat, cost);
    city.territory.insert(target);
    tracing::debug!(city = %city_id, %target, cost, "Territory expanded");

    Ok(CommandOutcome::Expanded {
        city: city_id,
        target,
        cost,
    })
}

/// Hand a city to `new_owner`, then update elimination and victory
pub fn capture_city(
    state: &mut GameState,
    city_id: CityId,
    new_owner: ParticipantId,
) -> Result<()> {
    let city = state.city_mut(city_id)?;
    let previous = city.owner;
    city.owner = new_owner;
    // No production from a city on the turn it changes hands
    city.has_acted = true;
    tracing::info!(city = %city_id, from = %previous, to = %new_owner, "City captured");

    if state.cities_of(previous).is_empty() {
        let loser = state.participant_mut(previous)?;
        if !loser.eliminated {
            loser.eliminated = true;
            tracing::info!(participant = %previous, "Participant eliminated");
        }
    }

    let live: Vec<ParticipantId> = state.live_participants().map(|p| p.id).collect();
    if let [winner] = live.as_slice() {
        state.status = GameStatus::Finished {
            winner: Some(*winner),
        };
        tracing::info!(winner = %winner, turn = state.turn, "Game finished");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::City;
    use crate::core::types::GameId;
    use crate::game::participant::Participant;
    use crate::map::terrain::Terrain;

    const HUMAN: ParticipantId = ParticipantId(0);
    const AI: ParticipantId = ParticipantId(1);

    struct Fixture {
        state: GameState,
        board: Board,
        rules: Ruleset,
    }

    impl Fixture {
        fn new() -> Self {
            let board = Board::new(10, 10);
            let mut state = GameState::new(
                GameId::new(),
                5,
                &board,
                vec![Participant::human(HUMAN, "Human"), Participant::ai(AI, "AI")],
            );
            state.cities.insert(
                CityId(1),
                City::new(CityId(1), "Aster", HUMAN, OffsetCoord::new(1, 1), 100),
            );
            state.cities.insert(
                CityId(2),
                City::new(CityId(2), "Brine", AI, OffsetCoord::new(8, 8), 100),
            );
            Self {
                state,
                board,
                rules: Ruleset::standard(),
            }
        }

        fn place(&mut self, owner: ParticipantId, code: &str, row: i32, col: i32) -> UnitId {
            let unit_type = self.rules.unit_types.get(code).unwrap().clone();
            self.state.spawn_unit(owner, &unit_type, OffsetCoord::new(row, col))
        }
    }

    #[test]
    fn test_move_within_budget() {
        let mut fx = Fixture::new();
        let unit = fx.place(HUMAN, "warrior", 4, 4);

        let outcome = move_unit(
            &mut fx.state,
            &fx.board,
            &fx.rules,
            HUMAN,
            unit,
            OffsetCoord::new(4, 6),
        )
        .unwrap();

        let CommandOutcome::Moved { path, captured, .. } = outcome else {
            panic!("expected move");
        };
        assert_eq!(path.len(), 3);
        assert_eq!(captured, None);
        let moved = fx.state.unit(unit).unwrap();
        assert_eq!(moved.coord, OffsetCoord::new(4, 6));
        assert!(moved.has_acted);
    }

    #[test]
    fn test_move_onto_occupied_tile_rejected() {
        let mut fx = Fixture::new();
        let unit = fx.place(HUMAN, "warrior", 4, 4);
        fx.place(HUMAN, "archer", 4, 5);
        let before = fx.state.clone();

        let err = move_unit(
            &mut fx.state,
            &fx.board,
            &fx.rules,
            HUMAN,
            unit,
            OffsetCoord::new(4, 5),
        )
        .unwrap_err();

        assert_eq!(err, GameError::Occupied(OffsetCoord::new(4, 5)));
        assert_eq!(fx.state, before);
    }

    #[test]
    fn test_move_through_friendly_not_enemy() {
        let mut fx = Fixture::new();
        // Corridor along row 4: water above and below
        for col in 0..10 {
            fx.board.set_terrain(OffsetCoord::new(3, col), Terrain::Water);
            fx.board.set_terrain(OffsetCoord::new(5, col), Terrain::Water);
        }
        let unit = fx.place(HUMAN, "warrior", 4, 2);
        fx.place(HUMAN, "archer", 4, 3);

        let through_friend = move_unit(
            &mut fx.state,
            &fx.board,
            &fx.rules,
            HUMAN,
            unit,
            OffsetCoord::new(4, 4),
        );
        assert!(through_friend.is_ok());

        let mut fx = Fixture::new();
        for col in 0..10 {
            fx.board.set_terrain(OffsetCoord::new(3, col), Terrain::Water);
            fx.board.set_terrain(OffsetCoord::new(5, col), Terrain::Water);
        }
        let unit = fx.place(HUMAN, "warrior", 4, 2);
        fx.place(AI, "archer", 4, 3);

        let through_enemy = move_unit(
            &mut fx.state,
            &fx.board,
            &fx.rules,
            HUMAN,
            unit,
            OffsetCoord::new(4, 4),
        );
        assert!(matches!(through_enemy, Err(GameError::Unreachable { .. })));
    }

    #[test]
    fn test_move_rejections() {
        let mut fx = Fixture::new();
        fx.board.set_terrain(OffsetCoord::new(4, 5), Terrain::Mountain);
        let unit = fx.place(HUMAN, "warrior", 4, 4);
        let enemy = fx.place(AI, "warrior", 6, 6);

        let cases = [
            (unit, OffsetCoord::new(4, 5), GameError::Impassable(OffsetCoord::new(4, 5))),
            (unit, OffsetCoord::new(4, 10), GameError::OutOfBounds(OffsetCoord::new(4, 10))),
            (
                enemy,
                OffsetCoord::new(6, 5),
                GameError::NotOwner {
                    actor: HUMAN,
                    entity: "unit U2".into(),
                },
            ),
        ];
        for (id, to, expected) in cases {
            let err = move_unit(&mut fx.state, &fx.board, &fx.rules, HUMAN, id, to).unwrap_err();
            assert_eq!(err, expected);
        }

        let too_far = move_unit(
            &mut fx.state,
            &fx.board,
            &fx.rules,
            HUMAN,
            unit,
            OffsetCoord::new(4, 8),
        );
        assert!(matches!(too_far, Err(GameError::Unreachable { move_points: 2, .. })));
    }

    #[test]
    fn test_unit_acts_once() {
        let mut fx = Fixture::new();
        let unit = fx.place(HUMAN, "warrior", 4, 4);
        move_unit(
            &mut fx.state,
            &fx.board,
            &fx.rules,
            HUMAN,
            unit,
            OffsetCoord::new(4, 5),
        )
        .unwrap();

        let again = move_unit(
            &mut fx.state,
            &fx.board,
            &fx.rules,
            HUMAN,
            unit,
            OffsetCoord::new(4, 6),
        );
        assert_eq!(again, Err(GameError::UnitAlreadyActed(unit)));
    }

    #[test]
    fn test_melee_attack_with_counter() {
        let mut fx = Fixture::new();
        let attacker = fx.place(HUMAN, "warrior", 4, 4);
        let target = fx.place(AI, "warrior", 4, 5);

        let outcome = attack_unit(&mut fx.state, &fx.rules, HUMAN, attacker, target).unwrap();

        let CommandOutcome::Attacked { result, .. } = outcome else {
            panic!("expected attack");
        };
        // 20 vs 10: damage 30, defender at 70% counters
        assert_eq!(result.damage, 30);
        assert_eq!(fx.state.unit(target).unwrap().hp, 70);
        assert!(result.counter_damage.is_some());
        assert_eq!(fx.state.unit(attacker).unwrap().hp, result.attacker_hp);
        assert!(fx.state.unit(attacker).unwrap().has_acted);
    }

    #[test]
    fn test_ranged_attack_no_counter() {
        let mut fx = Fixture::new();
        let archer = fx.place(HUMAN, "archer", 4, 4);
        let target = fx.place(AI, "warrior", 4, 5);

        let outcome = attack_unit(&mut fx.state, &fx.rules, HUMAN, archer, target).unwrap();

        let CommandOutcome::Attacked { result, .. } = outcome else {
            panic!("expected attack");
        };
        assert_eq!(result.counter_damage, None);
        assert_eq!(fx.state.unit(archer).unwrap().hp, 80);
    }

    #[test]
    fn test_attack_rejections() {
        let mut fx = Fixture::new();
        let warrior = fx.place(HUMAN, "warrior", 4, 4);
        let friend = fx.place(HUMAN, "warrior", 4, 5);
        let far = fx.place(AI, "warrior", 4, 7);

        assert_eq!(
            attack_unit(&mut fx.state, &fx.rules, HUMAN, warrior, friend),
            Err(GameError::FriendlyFire("unit U2".into()))
        );
        assert_eq!(
            attack_unit(&mut fx.state, &fx.rules, HUMAN, warrior, far),
            Err(GameError::OutOfRange {
                distance: 3,
                min: 1,
                max: 1
            })
        );
        assert_eq!(
            attack_unit(&mut fx.state, &fx.rules, HUMAN, warrior, UnitId(99)),
            Err(GameError::UnitNotFound(UnitId(99)))
        );
    }

    #[test]
    fn test_lethal_attack_removes_defender() {
        let mut fx = Fixture::new();
        let attacker = fx.place(HUMAN, "warrior", 4, 4);
        let target = fx.place(AI, "archer", 4, 5);
        fx.state.unit_mut(target).unwrap().hp = 5;

        let outcome = attack_unit(&mut fx.state, &fx.rules, HUMAN, attacker, target).unwrap();

        let CommandOutcome::Attacked { result, .. } = outcome else {
            panic!("expected attack");
        };
        assert!(result.defender_died);
        assert!(!result.attacker_died);
        assert!(fx.state.unit(target).is_err());
        assert_eq!(fx.state.unit(attacker).unwrap().hp, 100);
    }

    #[test]
    fn test_city_attack_and_capture() {
        let mut fx = Fixture::new();
        let warrior = fx.place(HUMAN, "warrior", 8, 7);
        fx.state.city_mut(CityId(2)).unwrap().hp = 5;

        let outcome = attack_city(&mut fx.state, &fx.rules, HUMAN, warrior, CityId(2)).unwrap();
        let CommandOutcome::CityAttacked { result, .. } = outcome else {
            panic!("expected city attack");
        };
        assert!(result.city_fell);
        assert_eq!(fx.state.city(CityId(2)).unwrap().owner, AI);

        // Next turn the warrior walks in
        fx.state.unit_mut(warrior).unwrap().has_acted = false;
        let moved = move_unit(
            &mut fx.state,
            &fx.board,
            &fx.rules,
            HUMAN,
            warrior,
            OffsetCoord::new(8, 8),
        )
        .unwrap();

        assert!(matches!(moved, CommandOutcome::Moved { captured: Some(CityId(2)), .. }));
        assert_eq!(fx.state.city(CityId(2)).unwrap().owner, HUMAN);
        assert!(fx.state.participant(AI).unwrap().eliminated);
        assert_eq!(fx.state.status, GameStatus::Finished { winner: Some(HUMAN) });
    }

    #[test]
    fn test_city_entry_rules() {
        let mut fx = Fixture::new();
        let warrior = fx.place(HUMAN, "warrior", 8, 7);
        let archer = fx.place(HUMAN, "archer", 7, 8);

        assert_eq!(
            move_unit(&mut fx.state, &fx.board, &fx.rules, HUMAN, warrior, OffsetCoord::new(8, 8)),
            Err(GameError::CityDefended(CityId(2)))
        );

        fx.state.city_mut(CityId(2)).unwrap().hp = 0;
        assert_eq!(
            move_unit(&mut fx.state, &fx.board, &fx.rules, HUMAN, archer, OffsetCoord::new(8, 8)),
            Err(GameError::CityDefended(CityId(2)))
        );
    }

    #[test]
    fn test_spawn_unit_pays_cost() {
        let mut fx = Fixture::new();
        fx.state
            .city_mut(CityId(1))
            .unwrap()
            .stockpile
            .add(ResourceKind::Iron, 20);

        let outcome = spawn_unit(
            &mut fx.state,
            &fx.board,
            &fx.rules,
            HUMAN,
            CityId(1),
            "rider",
        )
        .unwrap();

        let CommandOutcome::Spawned { unit, coord, .. } = outcome else {
            panic!("expected spawn");
        };
        assert_eq!(coord, OffsetCoord::new(1, 1));
        assert!(fx.state.unit(unit).unwrap().has_acted);
        let city = fx.state.city(CityId(1)).unwrap();
        assert_eq!(city.stockpile.get(ResourceKind::Iron), 5);
        assert!(city.has_acted);

        assert_eq!(
            spawn_unit(&mut fx.state, &fx.board, &fx.rules, HUMAN, CityId(1), "warrior"),
            Err(GameError::CityAlreadyActed(CityId(1)))
        );
    }

    #[test]
    fn test_spawn_unit_rejections() {
        let mut fx = Fixture::new();
        assert_eq!(
            spawn_unit(&mut fx.state, &fx.board, &fx.rules, HUMAN, CityId(1), "catapult"),
            Err(GameError::UnknownUnitType("catapult".into()))
        );
        assert_eq!(
            spawn_unit(&mut fx.state, &fx.board, &fx.rules, HUMAN, CityId(1), "warrior"),
            Err(GameError::InsufficientResources {
                kind: ResourceKind::Iron,
                needed: 10,
                available: 0
            })
        );
        assert!(matches!(
            spawn_unit(&mut fx.state, &fx.board, &fx.rules, HUMAN, CityId(2), "warrior"),
            Err(GameError::NotOwner { .. })
        ));
    }

    #[test]
    fn test_expand_territory_spends_wheat() {
        let mut fx = Fixture::new();
        fx.state
            .city_mut(CityId(1))
            .unwrap()
            .stockpile
            .add(ResourceKind::Wheat, 12);

        let outcome = expand_territory(
            &mut fx.state,
            &fx.board,
            &fx.rules,
            HUMAN,
            CityId(1),
            OffsetCoord::new(1, 2),
        )
        .unwrap();

        assert_eq!(
            outcome,
            CommandOutcome::Expanded {
                city: CityId(1),
                target: OffsetCoord::new(1, 2),
                cost: 10
            }
        );
        let city = fx.state.city(CityId(1)).unwrap();
        assert!(city.territory.contains(&OffsetCoord::new(1, 2)));
        assert_eq!(city.stockpile.get(ResourceKind::Wheat), 2);
        // Expansion leaves production available
        assert!(!city.has_acted);
    }

    #[test]
    fn test_ensure_turn() {
        let mut fx = Fixture::new();
        assert!(ensure_turn(&fx.state, HUMAN).is_ok());
        assert_eq!(ensure_turn(&fx.state, AI), Err(GameError::NotYourTurn(AI)));

        fx.state.status = GameStatus::Finished { winner: None };
        assert_eq!(ensure_turn(&fx.state, HUMAN), Err(GameError::GameFinished));
    }

    #[test]
    fn test_command_json_shape() {
        let command = Command::MoveUnit {
            unit: UnitId(3),
            to: OffsetCoord::new(2, 4),
        };
        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(json["type"], "move_unit");
        assert_eq!(json["to"]["col"], 4);
        assert_eq!(command.kind(), CommandKind::MoveUnit);
    }
}
