//! Engine configuration with documented constants
//!
//! All tunable numbers live here. Values are loaded from the `[engine]` table
//! of a rules file; anything omitted falls back to the defaults below.

use serde::{Deserialize, Serialize};

use crate::map::terrain::ResourceKind;

/// One entry of the auto-production priority list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionRule {
    /// Resource that pays for the unit
    pub resource: ResourceKind,
    /// Amount required and deducted
    pub amount: u32,
    /// Unit type code produced
    pub unit_type: String,
}

/// Configuration for the turn engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === CITIES ===
    /// HP restored per turn when no enemy is adjacent
    pub regen_normal: u32,

    /// HP restored per turn while besieged
    pub regen_siege: u32,

    /// Hex distance within which an enemy unit besieges a city
    pub siege_radius: u32,

    /// Maximum city HP (new cities start at full HP)
    pub city_max_hp: u32,

    /// Fixed defence used when a city is attacked
    ///
    /// Unlike units, a city's defence does not scale with its HP.
    pub city_base_defence: u32,

    // === ECONOMY ===
    /// Resource gained per harvestable tile per turn
    pub harvest_per_tile: u32,

    /// Auto-production priority, first affordable rule wins
    pub production_rules: Vec<ProductionRule>,

    // === TERRITORY ===
    /// Radius of the territory granted when a game starts
    pub initial_territory_radius: u32,

    /// Wheat cost of the first expansion
    pub expansion_base_cost: u32,

    /// Extra wheat per tile already gained beyond the initial territory
    pub expansion_tile_cost: u32,

    /// Furthest hex distance from the centre a city may claim
    pub max_expansion_distance: u32,

    // === ORCHESTRATION ===
    /// Wall-clock budget for consecutive AI turns, in milliseconds
    ///
    /// Checked only between whole AI turns; a running turn is never cut short.
    pub ai_budget_ms: u64,

    /// How long idempotency tokens are remembered, in seconds
    pub replay_retention_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            regen_normal: 4,
            regen_siege: 2,
            siege_radius: 1,
            city_max_hp: 100,
            city_base_defence: 10,

            harvest_per_tile: 1,
            production_rules: vec![
                ProductionRule {
                    resource: ResourceKind::Iron,
                    amount: 10,
                    unit_type: "warrior".into(),
                },
                ProductionRule {
                    resource: ResourceKind::Stone,
                    amount: 10,
                    unit_type: "archer".into(),
                },
            ],

            initial_territory_radius: 1,
            expansion_base_cost: 10,
            expansion_tile_cost: 5,
            max_expansion_distance: 3,

            ai_budget_ms: 500,
            replay_retention_secs: 3600,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.regen_siege > self.regen_normal {
            return Err(format!(
                "regen_siege ({}) should not exceed regen_normal ({})",
                self.regen_siege, self.regen_normal
            ));
        }

        if self.city_max_hp == 0 {
            return Err("city_max_hp must be positive".into());
        }

        if self.max_expansion_distance < self.initial_territory_radius {
            return Err(format!(
                "max_expansion_distance ({}) should be >= initial_territory_radius ({})",
                self.max_expansion_distance, self.initial_territory_radius
            ));
        }

        if let Some(rule) = self.production_rules.iter().find(|r| r.amount == 0) {
            return Err(format!("production rule for '{}' costs nothing", rule.unit_type));
        }

        Ok(())
    }

    /// Wheat needed for the next expansion given tiles gained so far
    pub fn expansion_cost(&self, extra_tiles: u32) -> u32 {
        self.expansion_base_cost + extra_tiles * self.expansion_tile_cost
    }
}
