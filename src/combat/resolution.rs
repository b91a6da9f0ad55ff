//! Attack resolution
//!
//! Pure functions: stats and HP in, damage and resulting HP out. Nothing here
//! touches game state.

use serde::{Deserialize, Serialize};

/// Damage multiplier applied to the attack/defence advantage term
pub const ADVANTAGE_WEIGHT: f64 = 0.5;

/// Minimum damage any attack deals
pub const MIN_DAMAGE: u32 = 1;

/// Stats of one side of an exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub attack: u32,
    pub defence: u32,
    pub hp: u32,
    pub max_hp: u32,
    pub ranged: bool,
}

/// Result of a unit attacking a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOutcome {
    pub damage: u32,
    /// `None` when no counterattack happened
    pub counter_damage: Option<u32>,
    pub attacker_hp: u32,
    pub defender_hp: u32,
    pub attacker_died: bool,
    pub defender_died: bool,
}

/// Result of a unit attacking a city
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityAttackOutcome {
    pub damage: u32,
    pub city_hp: u32,
    /// City HP reached zero; it can now be captured by melee
    pub city_fell: bool,
}

/// Current HP as a fraction of max, clamped to [0, 1]
pub fn hp_ratio(hp: u32, max_hp: u32) -> f64 {
    if max_hp == 0 {
        return 0.0;
    }
    (hp as f64 / max_hp as f64).clamp(0.0, 1.0)
}

/// Damage from effective attack vs effective defence
///
/// `raw = atk * (1 + 0.5 * (atk - def) / def)`, rounded half away from zero,
/// never below `MIN_DAMAGE`. Defence is floored at 1.
pub fn compute_damage(effective_attack: f64, effective_defence: f64) -> u32 {
    let defence = effective_defence.max(1.0);
    let advantage = (effective_attack - defence) / defence;
    let raw = effective_attack * (1.0 + ADVANTAGE_WEIGHT * advantage);
    let rounded = raw.round();
    if rounded < MIN_DAMAGE as f64 {
        MIN_DAMAGE
    } else {
        rounded as u32
    }
}

fn strike(actor: &Combatant, actor_hp: u32, receiver: &Combatant, receiver_hp: u32) -> u32 {
    let effective_attack = actor.attack as f64 * hp_ratio(actor_hp, actor.max_hp);
    let effective_defence = receiver.defence as f64 * hp_ratio(receiver_hp, receiver.max_hp);
    compute_damage(effective_attack, effective_defence)
}

/// Resolve a unit attacking another unit
///
/// The attacker strikes first. The defender strikes back only if it survived
/// and neither side is ranged, so both sides can never die in one exchange.
pub fn resolve_attack(attacker: &Combatant, defender: &Combatant) -> AttackOutcome {
    let damage = strike(attacker, attacker.hp, defender, defender.hp);
    let defender_hp = defender.hp.saturating_sub(damage);

    let counter_damage = if defender_hp > 0 && !attacker.ranged && !defender.ranged {
        Some(strike(defender, defender_hp, attacker, attacker.hp))
    } else {
        None
    };
    let attacker_hp = attacker.hp.saturating_sub(counter_damage.unwrap_or(0));

    AttackOutcome {
        damage,
        counter_damage,
        attacker_hp,
        defender_hp,
        attacker_died: attacker_hp == 0,
        defender_died: defender_hp == 0,
    }
}

/// Resolve a unit attacking a city with a fixed baseline defence
pub fn resolve_city_attack(
    attacker: &Combatant,
    city_hp: u32,
    city_defence: u32,
) -> CityAttackOutcome {
    let effective_attack = attacker.attack as f64 * hp_ratio(attacker.hp, attacker.max_hp);
    let damage = compute_damage(effective_attack, city_defence as f64);
    let city_hp = city_hp.saturating_sub(damage);

    CityAttackOutcome {
        damage,
        city_hp,
        city_fell: city_hp == 0,
    }
}
