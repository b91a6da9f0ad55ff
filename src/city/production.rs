//! Unit production - automatic end-of-turn production and spawn placement
//!
//! A city produces at most one unit per turn. The first affordable rule in the
//! configured priority list wins. If no tile is free the build is delayed and
//! nothing is spent.

use ahash::{AHashMap, AHashSet};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::city::stockpile::Stockpile;
use crate::city::City;
use crate::core::config::ProductionRule;
use crate::core::error::Result;
use crate::core::types::{CityId, TurnNumber, UnitId};
use crate::game::rules::Ruleset;
use crate::game::state::GameState;
use crate::game::summary::ProducedUnit;
use crate::map::board::Board;
use crate::map::hex::{HexDirection, OffsetCoord};

/// Outcome of one production attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductionResult {
    Produced(ProducedUnit),
    /// Affordable, but no free tile around the city
    Delayed { unit_type: String },
    /// Nothing affordable, or the city already produced this turn
    Idle,
}

/// First rule the stockpile can pay for
pub fn choose_rule<'a>(
    stockpile: &Stockpile,
    rules: &'a [ProductionRule],
) -> Option<&'a ProductionRule> {
    rules.iter().find(|r| stockpile.has(r.resource, r.amount))
}

/// Deterministic seed for per-entity tie-breaks
pub fn entity_seed(game_seed: u64, turn: TurnNumber, entity: u32) -> u64 {
    game_seed
        ^ (turn as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (entity as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
}

/// Neighbor scan order for spawning: the fixed direction order, rotated by an
/// offset derived from the game seed, turn and city
pub fn spawn_scan_order(game_seed: u64, turn: TurnNumber, city: CityId) -> [HexDirection; 6] {
    let mut rng = ChaCha8Rng::seed_from_u64(entity_seed(game_seed, turn, city.0));
    HexDirection::rotated(rng.gen_range(0..6))
}

/// Pick the tile a new unit appears on
///
/// The city tile if free; otherwise the first neighbor in `scan` order that is
/// on the board, passable, unoccupied and not another participant's city.
pub fn select_spawn_tile(
    city: &City,
    board: &Board,
    occupancy: &AHashMap<OffsetCoord, UnitId>,
    foreign_city_tiles: &AHashSet<OffsetCoord>,
    scan: &[HexDirection; 6],
) -> Option<OffsetCoord> {
    let free = |coord: OffsetCoord| board.is_passable(coord) && !occupancy.contains_key(&coord);

    if free(city.coord) {
        return Some(city.coord);
    }

    scan.iter()
        .map(|dir| city.coord.neighbor(*dir))
        .find(|coord| free(*coord) && !foreign_city_tiles.contains(coord))
}

/// Run automatic production for one city
pub fn auto_produce(
    state: &mut GameState,
    board: &Board,
    rules: &Ruleset,
    city_id: CityId,
) -> Result<ProductionResult> {
    let city = state.city(city_id)?;
    if city.has_acted {
        return Ok(ProductionResult::Idle);
    }
    let Some(rule) = choose_rule(&city.stockpile, &rules.config.production_rules) else {
        return Ok(ProductionResult::Idle);
    };
    let unit_type = rules.unit_types.require(&rule.unit_type)?;

    let scan = spawn_scan_order(state.rng_seed, state.turn, city_id);
    let spawn = select_spawn_tile(
        city,
        board,
        &state.occupancy(),
        &state.foreign_city_tiles(city.owner),
        &scan,
    );

    let Some(coord) = spawn else {
        tracing::warn!(
            city = %city_id,
            unit_type = %rule.unit_type,
            "Production delayed: no free tile"
        );
        return Ok(ProductionResult::Delayed {
            unit_type: rule.unit_type.clone(),
        });
    };

    let owner = city.owner;
    let city = state.city_mut(city_id)?;
    city.stockpile.spend(rule.resource, rule.amount);
    city.has_acted = true;

    let unit = state.spawn_unit(owner, unit_type, coord);
    state.unit_mut(unit)?.has_acted = true;

    tracing::debug!(
        city = %city_id,
        unit = %unit,
        unit_type = %unit_type.code,
        %coord,
        "Produced unit"
    );

    Ok(ProductionResult::Produced(ProducedUnit {
        unit,
        unit_type: unit_type.code.clone(),
        coord,
    }))
}
