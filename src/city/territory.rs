//! City territory: initial grant and expansion rules

use std::collections::BTreeSet;

use crate::core::config::EngineConfig;
use crate::core::error::{GameError, Result};
use crate::core::types::CityId;
use crate::game::state::GameState;
use crate::map::board::Board;
use crate::map::hex::OffsetCoord;
use crate::map::terrain::ResourceKind;

/// Tiles granted to a new city: its own tile plus passable, unclaimed tiles
/// within `radius`
pub fn initial_territory(
    center: OffsetCoord,
    board: &Board,
    radius: u32,
    is_claimed: impl Fn(OffsetCoord) -> bool,
) -> BTreeSet<OffsetCoord> {
    let mut territory = BTreeSet::from([center]);
    for coord in center.within_range(radius) {
        if coord != center && board.is_passable(coord) && !is_claimed(coord) {
            territory.insert(coord);
        }
    }
    territory
}

/// Validate an expansion and return its wheat cost
///
/// Ownership and turn checks are the caller's job.
pub fn check_expansion(
    state: &GameState,
    board: &Board,
    config: &EngineConfig,
    city_id: CityId,
    target: OffsetCoord,
) -> Result<u32> {
    let city = state.city(city_id)?;

    if !board.in_bounds(target) {
        return Err(GameError::OutOfBounds(target));
    }
    if !board.is_passable(target) {
        return Err(GameError::Impassable(target));
    }
    if state.territory_owner(target).is_some() {
        return Err(GameError::TerritoryClaimed(target));
    }

    let distance = target.distance(&city.coord);
    if distance > config.max_expansion_distance {
        return Err(GameError::ExpansionTooFar {
            coord: target,
            distance,
            max: config.max_expansion_distance,
        });
    }
    if !city.borders(target) {
        return Err(GameError::NotAdjacentToTerritory(target));
    }
    if state.enemy_unit_tiles(city.owner).contains(&target) {
        return Err(GameError::Occupied(target));
    }

    let cost = config.expansion_cost(city.extra_tiles());
    let available = city.stockpile.get(ResourceKind::Wheat);
    if available < cost {
        return Err(GameError::InsufficientResources {
            kind: ResourceKind::Wheat,
            needed: cost,
            available,
        });
    }

    Ok(cost)
}
