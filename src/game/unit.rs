//! Unit types (static lookup data) and live units

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::combat::Combatant;
use crate::core::error::{GameError, Result};
use crate::core::types::{ParticipantId, UnitId};
use crate::map::hex::OffsetCoord;
use crate::map::terrain::ResourceKind;

/// Resource cost of producing a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitCost {
    pub resource: ResourceKind,
    pub amount: u32,
}

/// Static definition of a unit type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitType {
    pub code: String,
    pub name: String,
    pub attack: u32,
    pub defence: u32,
    pub min_range: u32,
    pub max_range: u32,
    pub move_points: u32,
    pub max_hp: u32,
    #[serde(default)]
    pub ranged: bool,
    /// Cost for explicit production; `None` means free
    #[serde(default)]
    pub cost: Option<UnitCost>,
}

impl UnitType {
    /// Is a target at `distance` inside this type's attack range?
    ///
    /// Melee units always attack at distance 1.
    pub fn in_range(&self, distance: u32) -> bool {
        if self.ranged {
            distance >= self.min_range && distance <= self.max_range
        } else {
            distance == 1
        }
    }

    /// (min, max) attack distance as enforced by `in_range`
    pub fn range_bounds(&self) -> (u32, u32) {
        if self.ranged {
            (self.min_range, self.max_range)
        } else {
            (1, 1)
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_hp == 0 {
            return Err(format!("unit type '{}' has zero max_hp", self.code));
        }
        if self.min_range > self.max_range {
            return Err(format!(
                "unit type '{}' has min_range {} > max_range {}",
                self.code, self.min_range, self.max_range
            ));
        }
        if self.ranged && self.min_range == 0 {
            return Err(format!("ranged unit type '{}' needs min_range >= 1", self.code));
        }
        Ok(())
    }
}

/// All unit types of a ruleset, keyed by code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitTypeRegistry {
    types: BTreeMap<String, UnitType>,
}

impl UnitTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, unit_type: UnitType) {
        self.types.insert(unit_type.code.clone(), unit_type);
    }

    pub fn get(&self, code: &str) -> Option<&UnitType> {
        self.types.get(code)
    }

    /// Lookup for a type a live unit already references; absence is a defect
    pub fn require(&self, code: &str) -> Result<&UnitType> {
        self.types
            .get(code)
            .ok_or_else(|| GameError::MissingUnitType(code.to_string()))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.types.contains_key(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitType> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FromIterator<UnitType> for UnitTypeRegistry {
    fn from_iter<I: IntoIterator<Item = UnitType>>(iter: I) -> Self {
        let mut registry = Self::new();
        for unit_type in iter {
            registry.insert(unit_type);
        }
        registry
    }
}

/// A unit on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub owner: ParticipantId,
    pub unit_type: String,
    pub hp: u32,
    pub coord: OffsetCoord,
    /// Set after moving or attacking; cleared when the owner's turn begins
    pub has_acted: bool,
}

impl Unit {
    /// A fresh unit at full HP
    pub fn new(id: UnitId, owner: ParticipantId, unit_type: &UnitType, coord: OffsetCoord) -> Self {
        Self {
            id,
            owner,
            unit_type: unit_type.code.clone(),
            hp: unit_type.max_hp,
            coord,
            has_acted: false,
        }
    }

    pub fn combatant(&self, unit_type: &UnitType) -> Combatant {
        Combatant {
            attack: unit_type.attack,
            defence: unit_type.defence,
            hp: self.hp,
            max_hp: unit_type.max_hp,
            ranged: unit_type.ranged,
        }
    }
}
