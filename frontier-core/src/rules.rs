//! Weapon combat rules.
//!
//! Resolves a single [`WeaponCombatAction`] into a [`WeaponCombatResult`].
//! Resolution reads the combatants and returns a result describing what
//! happened; applying that result (log, range, wounds) is the caller's job,
//! so the same inputs and dice always give the same outcome.

use crate::character::{BodyLocation, Combatant, Wound};
use crate::combat::{FireResult, WeaponCombatAction, WeaponCombatResult};
use crate::dice::{parse_damage, DiceRoller};
use crate::modifiers::{
    self, hit_chance, is_critical, is_malfunction, range_modifier, total_bonus, AimStep,
};
use crate::weapons::Weapon;

/// Roll forced on the attacker's fire roll in debug mode.
pub const DEBUG_FIRE_ROLL: u32 = 1;

/// Everything an action needs to know about the moment it is taken.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub attacker: &'a Combatant,
    pub defender: &'a Combatant,
    pub weapon: Option<&'a Weapon>,
    /// Current distance in yards.
    pub range: u32,
    pub aim_bonus: i32,
    pub round: u32,
    /// Force the fire roll to [`DEBUG_FIRE_ROLL`].
    pub debug_mode: bool,
}

impl<'a> ActionContext<'a> {
    pub fn new(attacker: &'a Combatant, defender: &'a Combatant, range: u32) -> Self {
        Self {
            attacker,
            defender,
            weapon: attacker.weapon.as_ref(),
            range,
            aim_bonus: 0,
            round: 1,
            debug_mode: false,
        }
    }

    pub fn with_weapon(mut self, weapon: Option<&'a Weapon>) -> Self {
        self.weapon = weapon;
        self
    }

    pub fn with_aim_bonus(mut self, aim_bonus: i32) -> Self {
        self.aim_bonus = aim_bonus;
        self
    }

    pub fn with_round(mut self, round: u32) -> Self {
        self.round = round;
        self
    }

    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }
}

/// Resolve an action.
///
/// Returns `None` when the action cannot be taken at all (no weapon in
/// hand); the caller should treat that as a no-op and log nothing.
pub fn resolve_action<D: DiceRoller + ?Sized>(
    action: &WeaponCombatAction,
    ctx: &ActionContext<'_>,
    dice: &mut D,
) -> Option<WeaponCombatResult> {
    let result = match action {
        WeaponCombatAction::Aim => resolve_aim(ctx),
        WeaponCombatAction::Fire { modifier, damage } => {
            resolve_fire(ctx, *modifier, damage.as_deref(), dice)
        }
        WeaponCombatAction::Reload => resolve_reload(ctx),
        WeaponCombatAction::Move { target_range } => Some(resolve_move(ctx, *target_range)),
        WeaponCombatAction::Malfunction => resolve_malfunction(ctx),
    };

    match &result {
        Some(r) => tracing::debug!(
            "{} {}: {}",
            ctx.attacker.name,
            action.kind(),
            r.message()
        ),
        None => tracing::debug!(
            "{} {}: no weapon, nothing happens",
            ctx.attacker.name,
            action.kind()
        ),
    }
    result
}

fn resolve_aim(ctx: &ActionContext<'_>) -> Option<WeaponCombatResult> {
    let weapon = ctx.weapon?;
    let result = match modifiers::aim(ctx.aim_bonus) {
        AimStep::Improved(bonus) => WeaponCombatResult::Aim {
            aim_bonus: bonus,
            improved: true,
            message: format!(
                "{} takes careful aim with the {} (+{} to hit).",
                ctx.attacker.name, weapon.name, bonus
            ),
        },
        AimStep::Capped(bonus) => WeaponCombatResult::Aim {
            aim_bonus: bonus,
            improved: false,
            message: format!("{} {}.", ctx.attacker.name, modifiers::AIM_CAPPED_MESSAGE),
        },
    };
    Some(result)
}

fn resolve_fire<D: DiceRoller + ?Sized>(
    ctx: &ActionContext<'_>,
    extra_modifier: Option<i32>,
    damage_override: Option<&str>,
    dice: &mut D,
) -> Option<WeaponCombatResult> {
    let weapon = ctx.weapon?;
    let mods = &weapon.modifiers;
    let attacker = ctx.attacker;
    let defender = ctx.defender;

    let roll = if ctx.debug_mode {
        DEBUG_FIRE_ROLL
    } else {
        dice.d100()
    };

    if is_malfunction(roll, mods.reliability) {
        return Some(WeaponCombatResult::Malfunction {
            roll: Some(roll),
            message: format!(
                "{}'s {} misfires! (rolled {} against reliability {})",
                attacker.name, weapon.name, roll, mods.reliability
            ),
        });
    }

    let bonus = total_bonus(ctx.aim_bonus, ctx.range, mods) + extra_modifier.unwrap_or(0);
    let target_number = hit_chance(attacker);
    let modified_roll = roll as i32 - bonus;
    let hit = modified_roll <= target_number;
    let critical = is_critical(roll);

    if !hit {
        return Some(WeaponCombatResult::Fire(FireResult {
            hit: false,
            critical,
            roll,
            modified_roll,
            target_number,
            damage: None,
            new_strength: None,
            wound: None,
            message: format!(
                "{} fires the {} at {} and misses. (rolled {}, {} after modifiers, needed {})",
                attacker.name, weapon.name, defender.name, roll, modified_roll, target_number
            ),
        }));
    }

    let base_damage = parse_damage(damage_override.unwrap_or(&mods.damage), dice);
    let damage = shot_damage(base_damage, critical);
    let location = BodyLocation::roll(dice);
    let wound = Wound::from_damage(damage, location, ctx.round);
    // Strength as the wound model derives it after the hit, not raw damage.
    let new_strength = defender.with_wound(wound.clone()).current_strength(true);

    let opener = if critical { "A critical shot! " } else { "" };
    let message = format!(
        "{}{} fires the {} and hits {} in the {} for {} damage ({} wound).",
        opener, attacker.name, weapon.name, defender.name, location, damage, wound.severity
    );

    Some(WeaponCombatResult::Fire(FireResult {
        hit: true,
        critical,
        roll,
        modified_roll,
        target_number,
        damage: Some(damage),
        new_strength: Some(new_strength),
        wound: Some(wound),
        message,
    }))
}

/// Damage dealt by a hit; critical hits double it.
pub fn shot_damage(base_damage: i32, critical: bool) -> i32 {
    if critical {
        base_damage.saturating_mul(2)
    } else {
        base_damage
    }
}

fn resolve_reload(ctx: &ActionContext<'_>) -> Option<WeaponCombatResult> {
    let weapon = ctx.weapon?;
    // TODO: track rounds fired and refill `ammunition` up to `max_ammunition` here.
    Some(WeaponCombatResult::Reload {
        message: format!("{} reloads the {}.", ctx.attacker.name, weapon.name),
    })
}

fn resolve_move(ctx: &ActionContext<'_>, target_range: u32) -> WeaponCombatResult {
    let modifier = ctx
        .weapon
        .map(|w| range_modifier(target_range, w.modifiers.range))
        .unwrap_or(0);
    let direction = if target_range < ctx.range {
        "closes"
    } else if target_range > ctx.range {
        "backs off"
    } else {
        "holds"
    };
    WeaponCombatResult::Move {
        new_range: target_range,
        range_modifier: modifier,
        message: format!(
            "{} {} to {} yards ({:+} range modifier).",
            ctx.attacker.name, direction, target_range, modifier
        ),
    }
}

fn resolve_malfunction(ctx: &ActionContext<'_>) -> Option<WeaponCombatResult> {
    let weapon = ctx.weapon?;
    Some(WeaponCombatResult::Malfunction {
        roll: None,
        message: format!("{}'s {} is jammed.", ctx.attacker.name, weapon.name),
    })
}
