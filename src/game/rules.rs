//! Ruleset: engine configuration plus unit type definitions
//!
//! Rules are read-only lookup data supplied with every engine call. They load
//! from TOML (`data/rules/*.toml`) or come from `Ruleset::standard()`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::config::EngineConfig;
use crate::core::error::LoadError;
use crate::game::unit::{UnitCost, UnitType, UnitTypeRegistry};
use crate::map::terrain::ResourceKind;

/// On-disk shape of a rules file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RulesFile {
    #[serde(default)]
    engine: EngineConfig,
    #[serde(default)]
    unit_types: Vec<UnitType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ruleset {
    pub config: EngineConfig,
    pub unit_types: UnitTypeRegistry,
}

impl Ruleset {
    pub fn new(config: EngineConfig, unit_types: UnitTypeRegistry) -> Result<Self, LoadError> {
        let ruleset = Self { config, unit_types };
        ruleset.validate()?;
        Ok(ruleset)
    }

    /// Built-in rules: warrior (iron), archer (stone), rider (iron)
    pub fn standard() -> Self {
        let unit_types = [
            UnitType {
                code: "warrior".into(),
                name: "Warrior".into(),
                attack: 20,
                defence: 10,
                min_range: 1,
                max_range: 1,
                move_points: 2,
                max_hp: 100,
                ranged: false,
                cost: Some(UnitCost {
                    resource: ResourceKind::Iron,
                    amount: 10,
                }),
            },
            UnitType {
                code: "archer".into(),
                name: "Archer".into(),
                attack: 15,
                defence: 6,
                min_range: 1,
                max_range: 2,
                move_points: 2,
                max_hp: 80,
                ranged: true,
                cost: Some(UnitCost {
                    resource: ResourceKind::Stone,
                    amount: 10,
                }),
            },
            UnitType {
                code: "rider".into(),
                name: "Rider".into(),
                attack: 16,
                defence: 8,
                min_range: 1,
                max_range: 1,
                move_points: 4,
                max_hp: 90,
                ranged: false,
                cost: Some(UnitCost {
                    resource: ResourceKind::Iron,
                    amount: 15,
                }),
            },
        ]
        .into_iter()
        .collect();

        Self {
            config: EngineConfig::default(),
            unit_types,
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, LoadError> {
        let file: RulesFile = toml::from_str(contents)?;
        Self::new(file.engine, file.unit_types.into_iter().collect())
    }

    /// Load rules from a TOML file
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Validate config and cross-references between config and unit types
    pub fn validate(&self) -> Result<(), LoadError> {
        self.config.validate().map_err(LoadError::Invalid)?;

        if self.unit_types.is_empty() {
            return Err(LoadError::Invalid("ruleset defines no unit types".into()));
        }
        for unit_type in self.unit_types.iter() {
            unit_type.validate().map_err(LoadError::Invalid)?;
        }
        for rule in &self.config.production_rules {
            if !self.unit_types.contains(&rule.unit_type) {
                return Err(LoadError::Invalid(format!(
                    "production rule references unknown unit type '{}'",
                    rule.unit_type
                )));
            }
        }
        Ok(())
    }
}

impl Default for Ruleset {
    fn default() -> Self {
        Self::standard()
    }
}
