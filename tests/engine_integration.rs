//! Integration tests for the turn engine
//!
//! These drive whole turns through `Engine`:
//! - end-turn upkeep (regen, harvest, production) and the embedded AI turn
//! - the one-unit-per-tile invariant across a long greedy game
//! - capture, elimination and the finished state
//! - bundled rules and scenario files

use std::path::Path;

use hexfront::ai::{AiController, GreedyAi};
use hexfront::city::City;
use hexfront::core::error::GameError;
use hexfront::core::types::{CityId, GameId, ParticipantId};
use hexfront::game::{
    Command, CommandOutcome, Engine, GameState, GameStatus, MemorySink, NullSink, Participant,
    Ruleset, Scenario, TurnReport,
};
use hexfront::map::{Board, OffsetCoord, ResourceKind};

const HUMAN: ParticipantId = ParticipantId(0);
const AI: ParticipantId = ParticipantId(1);

fn crossing() -> (Board, GameState, Ruleset) {
    let rules = Ruleset::standard();
    let scenario =
        Scenario::from_toml_str(include_str!("../data/scenarios/crossing.toml")).unwrap();
    let (board, state) = scenario.build(&rules).unwrap();
    (board, state, rules)
}

fn end_turn(engine: &Engine, state: &mut GameState, actor: ParticipantId) -> TurnReport {
    match engine.submit(state, actor, &Command::EndTurn, &NullSink) {
        Ok(CommandOutcome::TurnEnded(report)) => report,
        other => panic!("expected turn report, got {:?}", other),
    }
}

// ============================================================================
// End-turn pipeline
// ============================================================================

#[test]
fn test_first_round_on_crossing() {
    let (board, mut state, rules) = crossing();
    let engine = Engine::new(&board, &rules);
    let sink = MemorySink::new();

    let outcome = engine
        .submit(&mut state, HUMAN, &Command::EndTurn, &sink)
        .unwrap();
    let CommandOutcome::TurnEnded(report) = outcome else {
        panic!("expected turn report");
    };

    // Human turn then one AI turn, back to the human in round 2
    assert_eq!(report.records.len(), 2);
    assert_eq!((report.turn, report.active), (2, HUMAN));
    assert!(report.ai_executed);
    assert!(!report.ai_pending);

    let human = &report.records[0].summary;
    assert_eq!(human.produced_codes(), vec!["warrior"]);
    assert_eq!(human.harvested.get(&ResourceKind::Iron), Some(&1));
    assert_eq!(human.harvested.get(&ResourceKind::Wheat), Some(&1));
    assert_eq!(human.harvested.get(&ResourceKind::Stone), Some(&1));
    assert!(!human.ai_executed);

    let ai = &report.records[1].summary;
    assert!(ai.ai_executed);
    assert_eq!(ai.produced_codes(), vec!["warrior"]);

    // Snapshot saw the game before any upkeep
    let first = &sink.snapshots()[0];
    assert_eq!(first.units.len(), 4);
    assert_eq!(
        first.city(CityId(1)).unwrap().stockpile.get(ResourceKind::Iron),
        10
    );
    assert_eq!(sink.len(), 2);

    let westhold = state.city(CityId(1)).unwrap();
    assert_eq!(westhold.stockpile.get(ResourceKind::Iron), 1);
    assert_eq!(state.units.len(), 6);
    assert_eq!(state.history.len(), 2);
}

#[test]
fn test_expansion_spends_wheat_and_keeps_city_action() {
    let (board, mut state, rules) = crossing();
    let engine = Engine::new(&board, &rules);

    let westhold = state.city(CityId(1)).unwrap();
    let target = westhold
        .territory
        .iter()
        .flat_map(|t| t.neighbors())
        .find(|n| board.is_passable(*n) && state.territory_owner(*n).is_none())
        .unwrap();

    let outcome = engine
        .submit(
            &mut state,
            HUMAN,
            &Command::ExpandTerritory {
                city: CityId(1),
                target,
            },
            &NullSink,
        )
        .unwrap();

    assert!(matches!(outcome, CommandOutcome::Expanded { cost: 10, .. }));
    let westhold = state.city(CityId(1)).unwrap();
    assert!(westhold.territory.contains(&target));
    assert_eq!(westhold.stockpile.get(ResourceKind::Wheat), 0);
    assert_eq!(westhold.extra_tiles(), 1);
    assert!(!westhold.has_acted);

    // Next expansion costs more than the wheat left
    let next = westhold
        .territory
        .iter()
        .flat_map(|t| t.neighbors())
        .find(|n| board.is_passable(*n) && state.territory_owner(*n).is_none())
        .unwrap();
    let err = engine
        .submit(
            &mut state,
            HUMAN,
            &Command::ExpandTerritory {
                city: CityId(1),
                target: next,
            },
            &NullSink,
        )
        .unwrap_err();
    assert!(matches!(err, GameError::InsufficientResources { .. }));
}

#[test]
fn test_turn_ownership_enforced() {
    let (board, mut state, rules) = crossing();
    let engine = Engine::new(&board, &rules);
    let ai_warrior = state.units_of(AI)[0];
    let before = state.clone();

    let err = engine
        .submit(
            &mut state,
            AI,
            &Command::MoveUnit {
                unit: ai_warrior,
                to: OffsetCoord::new(6, 7),
            },
            &NullSink,
        )
        .unwrap_err();

    assert_eq!(err, GameError::NotYourTurn(AI));
    assert_eq!(state, before);
}

// ============================================================================
// Long game invariants
// ============================================================================

#[test]
fn test_one_unit_per_tile_over_long_game() {
    let (board, mut state, rules) = crossing();
    let engine = Engine::new(&board, &rules);

    for _ in 0..60 {
        if state.is_finished() {
            break;
        }
        GreedyAi
            .take_turn(&mut state, &board, &rules, HUMAN)
            .unwrap();
        if state.is_finished() {
            break;
        }
        end_turn(&engine, &mut state, HUMAN);

        assert_eq!(state.occupancy().len(), state.units.len(), "two units share a tile");
        for unit in state.units.values() {
            let max_hp = rules.unit_types.get(&unit.unit_type).unwrap().max_hp;
            assert!(unit.hp > 0 && unit.hp <= max_hp);
            assert!(board.is_passable(unit.coord));
        }
        for city in state.cities.values() {
            assert!(city.hp <= city.max_hp);
        }
    }

    // Turn records are strictly ordered per participant turn
    for pair in state.history.windows(2) {
        assert!(pair[0].turn <= pair[1].turn);
    }
}

// ============================================================================
// Capture and victory
// ============================================================================

fn duel() -> (Board, GameState, Ruleset) {
    let board = Board::new(8, 6);
    let rules = Ruleset::standard();
    let mut state = GameState::new(
        GameId::new(),
        17,
        &board,
        vec![Participant::human(HUMAN, "Human"), Participant::ai(AI, "AI")],
    );
    state.cities.insert(
        CityId(1),
        City::new(CityId(1), "Aster", HUMAN, OffsetCoord::new(0, 0), 100),
    );
    state.cities.insert(
        CityId(2),
        City::new(CityId(2), "Brine", AI, OffsetCoord::new(3, 5), 100),
    );
    (board, state, rules)
}

#[test]
fn test_capture_ends_game() {
    let (board, mut state, rules) = duel();
    let engine = Engine::new(&board, &rules);
    let warrior = rules.unit_types.get("warrior").unwrap().clone();
    let attacker = state.spawn_unit(HUMAN, &warrior, OffsetCoord::new(3, 4));
    let runner = state.spawn_unit(HUMAN, &warrior, OffsetCoord::new(2, 5));
    state.city_mut(CityId(2)).unwrap().hp = 20;

    // A defended city cannot be entered
    let err = engine
        .submit(
            &mut state,
            HUMAN,
            &Command::MoveUnit {
                unit: runner,
                to: OffsetCoord::new(3, 5),
            },
            &NullSink,
        )
        .unwrap_err();
    assert_eq!(err, GameError::CityDefended(CityId(2)));

    let outcome = engine
        .submit(
            &mut state,
            HUMAN,
            &Command::AttackCity {
                attacker,
                city: CityId(2),
            },
            &NullSink,
        )
        .unwrap();
    let CommandOutcome::CityAttacked { result, .. } = outcome else {
        panic!("expected city attack");
    };
    assert!(result.city_fell);
    assert_eq!(state.status, GameStatus::Active);

    let outcome = engine
        .submit(
            &mut state,
            HUMAN,
            &Command::MoveUnit {
                unit: runner,
                to: OffsetCoord::new(3, 5),
            },
            &NullSink,
        )
        .unwrap();

    assert!(matches!(
        outcome,
        CommandOutcome::Moved {
            captured: Some(CityId(2)),
            ..
        }
    ));
    assert_eq!(state.city(CityId(2)).unwrap().owner, HUMAN);
    assert_eq!(state.status, GameStatus::Finished { winner: Some(HUMAN) });
    assert!(state.participant(AI).unwrap().eliminated);
    assert_eq!(
        engine.submit(&mut state, HUMAN, &Command::EndTurn, &NullSink),
        Err(GameError::GameFinished)
    );
}

// ============================================================================
// Bundled data
// ============================================================================

#[test]
fn test_bundled_rules_match_builtin() {
    let loaded = Ruleset::load(Path::new("data/rules/standard.toml")).unwrap();
    assert_eq!(loaded, Ruleset::standard());
}

#[test]
fn test_bundled_scenario_loads_from_disk() {
    let scenario = Scenario::load(Path::new("data/scenarios/crossing.toml")).unwrap();
    assert_eq!(scenario.name, "crossing");
    let (board, state) = scenario.build(&Ruleset::standard()).unwrap();
    assert_eq!((board.width, board.height), (12, 9));
    assert_eq!(state.cities.len(), 2);
    assert_eq!(state.units.len(), 4);
}
