//! Hit-roll modifiers.
//!
//! Each function is pure and returns an integer that is summed into the
//! attacker's total bonus or target number. Accuracy falls off in discrete
//! range bands, tabletop style.

use crate::character::{current_strength, Combatant};
use crate::weapons::WeaponModifiers;

/// Fixed part of every target number.
pub const BASE_HIT_CHANCE: i32 = 50;

/// Bonus gained per aim action.
pub const AIM_STEP: i32 = 10;

/// Highest aim bonus that can be accumulated.
pub const MAX_AIM_BONUS: i32 = 20;

/// Cap on the experience contribution.
pub const MAX_EXPERIENCE_BONUS: i32 = 10;

/// Message returned when aiming is already maxed out.
pub const AIM_CAPPED_MESSAGE: &str = "cannot aim any more carefully";

/// Modifier for firing at `range` yards with a weapon effective to
/// `effective_range` yards.
///
/// | share of effective range | modifier |
/// |---|---|
/// | up to 25% | +5 |
/// | up to 50% | 0 |
/// | up to 100% | -10 |
/// | up to 150% | -20 |
/// | beyond | -30 |
pub fn range_modifier(range: u32, effective_range: u32) -> i32 {
    // Compare in quarters of the effective range to stay in integers.
    let scaled = range as u64 * 4;
    let effective = effective_range as u64;
    if scaled <= effective {
        5
    } else if scaled <= effective * 2 {
        0
    } else if scaled <= effective * 4 {
        -10
    } else if scaled <= effective * 6 {
        -20
    } else {
        -30
    }
}

/// Handling modifier from a weapon's speed rating.
pub fn weapon_speed_modifier(speed: i32) -> i32 {
    speed.clamp(-2, 2) * 5
}

/// Outcome of trying to aim once more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AimStep {
    /// The bonus went up to this value.
    Improved(i32),
    /// Already at the cap; bonus unchanged.
    Capped(i32),
}

impl AimStep {
    pub fn bonus(&self) -> i32 {
        match self {
            AimStep::Improved(b) | AimStep::Capped(b) => *b,
        }
    }
}

/// Add one aim step to `current` unless that would pass the cap.
///
/// `current` is clamped into `0..=MAX_AIM_BONUS` first, since it may come
/// from a deserialized state.
pub fn aim(current: i32) -> AimStep {
    let current = current.clamp(0, MAX_AIM_BONUS);
    let next = current + AIM_STEP;
    if next > MAX_AIM_BONUS {
        AimStep::Capped(current)
    } else {
        AimStep::Improved(next)
    }
}

pub fn bravery_modifier(bravery: i32) -> i32 {
    match bravery {
        i32::MIN..=20 => -10,
        21..=40 => -5,
        41..=60 => 0,
        61..=80 => 5,
        _ => 10,
    }
}

pub fn experience_modifier(experience: i32) -> i32 {
    experience.clamp(0, MAX_EXPERIENCE_BONUS)
}

/// Strength lost to wounds, which counts against accuracy.
pub fn wound_penalty(combatant: &Combatant) -> i32 {
    (combatant.attributes.base_strength - current_strength(combatant, true)).max(0)
}

/// The target number a modified roll must not exceed to hit.
pub fn hit_chance(attacker: &Combatant) -> i32 {
    BASE_HIT_CHANCE
        + attacker.attributes.gun_accuracy
        + bravery_modifier(attacker.attributes.bravery)
        + experience_modifier(attacker.attributes.experience)
        - wound_penalty(attacker)
}

/// Everything subtracted from the raw roll before comparing to the target.
pub fn total_bonus(aim_bonus: i32, range: u32, weapon: &WeaponModifiers) -> i32 {
    aim_bonus
        + range_modifier(range, weapon.range)
        + weapon.accuracy
        + weapon_speed_modifier(weapon.speed)
}

/// Natural 1 or 2 on the percentile roll.
pub fn is_critical(roll: u32) -> bool {
    roll == 1 || roll == 2
}

/// The weapon fails to fire when the roll exceeds its reliability.
pub fn is_malfunction(roll: u32, reliability: u32) -> bool {
    roll > reliability
}
