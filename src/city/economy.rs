//! Per-turn city upkeep: siege detection, regeneration and harvesting
//!
//! Each function works on one city and returns what it did, so the turn
//! orchestrator can fold the results into a summary.

use std::collections::BTreeMap;

use ahash::AHashSet;

use crate::city::City;
use crate::core::config::EngineConfig;
use crate::game::state::ResourceStock;
use crate::game::unit::Unit;
use crate::map::board::Board;
use crate::map::hex::OffsetCoord;
use crate::map::terrain::ResourceKind;

/// A city is besieged if any unit of another participant is within `radius`
pub fn is_under_siege<'a>(
    city: &City,
    units: impl IntoIterator<Item = &'a Unit>,
    radius: u32,
) -> bool {
    units
        .into_iter()
        .any(|u| u.owner != city.owner && u.coord.distance(&city.coord) <= radius)
}

/// Restore HP, capped at max; returns HP actually restored
pub fn regenerate(city: &mut City, besieged: bool, config: &EngineConfig) -> u32 {
    let amount = if besieged {
        config.regen_siege
    } else {
        config.regen_normal
    };
    let before = city.hp;
    city.hp = (city.hp + amount).min(city.max_hp);
    city.hp - before
}

/// Harvest every territory tile that still has stock and is not held by an
/// enemy unit. Returns the amounts gained per resource kind.
pub fn harvest(
    city: &mut City,
    board: &Board,
    stock: &mut ResourceStock,
    enemy_tiles: &AHashSet<OffsetCoord>,
    per_tile: u32,
) -> BTreeMap<ResourceKind, u32> {
    let mut gained = BTreeMap::new();

    for coord in &city.territory {
        if enemy_tiles.contains(coord) {
            continue; // Occupied tile yields nothing this turn
        }
        let Some(kind) = board.tile(*coord).and_then(|t| t.resource) else {
            continue;
        };
        let taken = stock.take(*coord, per_tile);
        if taken > 0 {
            *gained.entry(kind).or_insert(0) += taken;
        }
    }

    for (kind, amount) in &gained {
        city.stockpile.add(*kind, *amount);
    }
    gained
}
