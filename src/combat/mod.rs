//! Combat resolution - damage and counter-damage from stats and HP ratios
//!
//! Ranged units neither deal nor receive counterattacks. Cities defend with a
//! fixed baseline and never strike back.

pub mod resolution;

pub use resolution::{
    compute_damage, hp_ratio, resolve_attack, resolve_city_attack, AttackOutcome,
    CityAttackOutcome, Combatant,
};
