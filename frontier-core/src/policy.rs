//! Opponent decision making.
//!
//! The automated opponent picks its action through an [`OpponentPolicy`].
//! The built-in policies are simple; callers can plug in their own (for
//! example one backed by narrative suggestions) by implementing the trait.

use crate::combat::{Side, WeaponCombatAction, WeaponCombatState};
use crate::config::PolicyKind;
use crate::dice::DiceRoller;
use crate::modifiers::MAX_AIM_BONUS;
use thiserror::Error;

/// Errors a policy may report instead of an action.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Policy unavailable: {0}")]
    Unavailable(String),

    #[error("Policy chose an invalid action: {0}")]
    InvalidAction(String),
}

/// Chooses the opponent's next action.
pub trait OpponentPolicy: Send {
    fn choose_action(
        &mut self,
        state: &WeaponCombatState,
        dice: &mut dyn DiceRoller,
    ) -> Result<WeaponCombatAction, PolicyError>;
}

/// Fire some percentage of the time, otherwise aim.
///
/// Once the aim bonus is maxed out the opponent always fires.
#[derive(Debug, Clone, Copy)]
pub struct WeightedPolicy {
    pub fire_percent: u32,
}

impl WeightedPolicy {
    pub fn new(fire_percent: u32) -> Self {
        Self {
            fire_percent: fire_percent.min(100),
        }
    }
}

impl OpponentPolicy for WeightedPolicy {
    fn choose_action(
        &mut self,
        state: &WeaponCombatState,
        dice: &mut dyn DiceRoller,
    ) -> Result<WeaponCombatAction, PolicyError> {
        if state.aim_bonus(Side::Opponent) >= MAX_AIM_BONUS {
            return Ok(WeaponCombatAction::fire());
        }
        if dice.d100() <= self.fire_percent {
            Ok(WeaponCombatAction::fire())
        } else {
            Ok(WeaponCombatAction::Aim)
        }
    }
}

/// Fire every turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFire;

impl OpponentPolicy for AlwaysFire {
    fn choose_action(
        &mut self,
        _state: &WeaponCombatState,
        _dice: &mut dyn DiceRoller,
    ) -> Result<WeaponCombatAction, PolicyError> {
        Ok(WeaponCombatAction::fire())
    }
}

/// Build the policy named by a configuration.
pub fn from_kind(kind: PolicyKind) -> Box<dyn OpponentPolicy> {
    match kind {
        PolicyKind::Weighted { fire_percent } => Box::new(WeightedPolicy::new(fire_percent)),
        PolicyKind::AlwaysFire => Box::new(AlwaysFire),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_gunfighter, sample_outlaw, ScriptedDice};

    fn state() -> WeaponCombatState {
        WeaponCombatState::new(&sample_gunfighter("Wyatt"), &sample_outlaw("Ike"), 15)
    }

    #[test]
    fn test_weighted_policy() {
        let mut policy = WeightedPolicy::new(70);
        let mut dice = ScriptedDice::new([70, 71]);
        let s = state();
        assert_eq!(
            policy.choose_action(&s, &mut dice).unwrap(),
            WeaponCombatAction::fire()
        );
        assert_eq!(
            policy.choose_action(&s, &mut dice).unwrap(),
            WeaponCombatAction::Aim
        );
    }

    #[test]
    fn test_weighted_policy_fires_when_aim_maxed() {
        let mut policy = WeightedPolicy::new(0);
        let mut dice = ScriptedDice::new([100]);
        let mut s = state();
        s.opponent_aim_bonus = MAX_AIM_BONUS;
        assert_eq!(
            policy.choose_action(&s, &mut dice).unwrap(),
            WeaponCombatAction::fire()
        );
    }

    #[test]
    fn test_always_fire() {
        let mut policy = from_kind(PolicyKind::AlwaysFire);
        let mut dice = ScriptedDice::new([100]);
        assert_eq!(
            policy.choose_action(&state(), &mut dice).unwrap(),
            WeaponCombatAction::fire()
        );
    }
}
