//! Engagement - the primary public API for running a gunfight.
//!
//! An [`Engagement`] owns one fight between the player and an automated
//! opponent. Each call to [`Engagement::submit_action`] runs a full round:
//! the player's action, the opponent's reply, and the combat-end checks.
//! A round in progress rejects new submissions until it finishes.

use crate::character::Combatant;
use crate::combat::{
    LogEntry, LogKind, Side, WeaponCombatAction, WeaponCombatResult, WeaponCombatState,
};
use crate::config::EngineConfig;
use crate::dice::DiceRoller;
use crate::policy::{self, OpponentPolicy, PolicyError};
use crate::rules::{resolve_action, ActionContext};
use crate::validation::{validate_record, CombatStateRecord, CombatType, ValidationReport};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors from submitting a round.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("A round is already being resolved")]
    RoundInProgress,

    #[error("The engagement is over")]
    CombatOver,

    #[error("Opponent policy failed: {0}")]
    Policy(#[from] PolicyError),

    #[error("Invalid combat state: {0}")]
    InvalidState(ValidationReport),
}

/// Callback invoked once when the engagement ends.
pub type CompletionCallback = Box<dyn FnMut(Side, &str) + Send>;

/// How an engagement ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatEnd {
    pub winner: Side,
    pub summary: String,
}

/// Everything that happened in one submitted round.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    /// The round that was resolved.
    pub round: u32,
    /// `None` if the player's action was a no-op.
    pub player_result: Option<WeaponCombatResult>,
    /// `None` if the opponent did not act or its action was a no-op.
    pub opponent_result: Option<WeaponCombatResult>,
    pub ended: Option<CombatEnd>,
    /// State after the round.
    pub state: WeaponCombatState,
}

struct Inner {
    player: Combatant,
    opponent: Combatant,
    state: WeaponCombatState,
    dice: Box<dyn DiceRoller + Send>,
    policy: Box<dyn OpponentPolicy>,
    on_complete: Option<CompletionCallback>,
    outcome: Option<CombatEnd>,
}

/// Clears the processing flag when dropped, including on early return.
struct RoundLatch<'a>(&'a AtomicBool);

impl<'a> RoundLatch<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RoundLatch(flag))
    }
}

impl Drop for RoundLatch<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A single weapon engagement between the player and an opponent.
pub struct Engagement {
    config: EngineConfig,
    processing: AtomicBool,
    inner: Mutex<Inner>,
}

impl Engagement {
    /// Create an engagement rolling with the given dice.
    pub fn new(
        player: Combatant,
        opponent: Combatant,
        config: EngineConfig,
        dice: Box<dyn DiceRoller + Send>,
    ) -> Self {
        let state = WeaponCombatState::new(&player, &opponent, config.default_range);
        let policy = policy::from_kind(config.opponent_policy);
        Self {
            config,
            processing: AtomicBool::new(false),
            inner: Mutex::new(Inner {
                player,
                opponent,
                state,
                dice,
                policy,
                on_complete: None,
                outcome: None,
            }),
        }
    }

    /// Create an engagement with entropy-seeded dice.
    pub fn with_random_dice(player: Combatant, opponent: Combatant, config: EngineConfig) -> Self {
        Self::new(player, opponent, config, Box::new(StdRng::from_entropy()))
    }

    /// Create an engagement with reproducible dice.
    pub fn seeded(player: Combatant, opponent: Combatant, config: EngineConfig, seed: u64) -> Self {
        Self::new(player, opponent, config, Box::new(StdRng::seed_from_u64(seed)))
    }

    /// Replace the opponent policy chosen by the configuration.
    pub fn with_policy(mut self, policy: Box<dyn OpponentPolicy>) -> Self {
        self.inner.get_mut().policy = policy;
        self
    }

    /// Register a callback for when the engagement ends.
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnMut(Side, &str) + Send + 'static,
    {
        self.inner.get_mut().on_complete = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether a round is being resolved right now.
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    pub async fn state(&self) -> WeaponCombatState {
        self.inner.lock().await.state.clone()
    }

    pub async fn player(&self) -> Combatant {
        self.inner.lock().await.player.clone()
    }

    pub async fn opponent(&self) -> Combatant {
        self.inner.lock().await.opponent.clone()
    }

    pub async fn outcome(&self) -> Option<CombatEnd> {
        self.inner.lock().await.outcome.clone()
    }

    pub async fn is_over(&self) -> bool {
        self.inner.lock().await.outcome.is_some()
    }

    /// The record handed back to the surrounding application.
    pub async fn record(&self) -> CombatStateRecord {
        let inner = self.inner.lock().await;
        build_record(
            &inner.player,
            &inner.opponent,
            &inner.state,
            inner.outcome.as_ref(),
        )
    }

    /// Resolve one full round starting with the player's `action`.
    ///
    /// Nothing is committed unless the whole round succeeds.
    pub async fn submit_action(
        &self,
        action: WeaponCombatAction,
    ) -> Result<RoundOutcome, TurnError> {
        let Some(_latch) = RoundLatch::acquire(&self.processing) else {
            tracing::debug!("Ignoring {} while a round is in progress", action.kind());
            return Err(TurnError::RoundInProgress);
        };

        let mut guard = self.inner.lock().await;
        if guard.outcome.is_some() {
            return Err(TurnError::CombatOver);
        }

        let result = self.run_round(&mut guard, action).await;
        if let Err(e) = &result {
            tracing::error!("Round {} failed: {}", guard.state.round, e);
        }
        result
    }

    async fn run_round(
        &self,
        inner: &mut Inner,
        action: WeaponCombatAction,
    ) -> Result<RoundOutcome, TurnError> {
        let round = inner.state.round;
        let mut state = inner.state.clone();
        let mut player = inner.player.clone();
        let mut opponent = inner.opponent.clone();

        // A side that is already down never gets to act.
        let mut ended = check_combat_end(Side::Opponent, &player, &opponent, round);
        let mut player_result = None;
        let mut opponent_result = None;

        if ended.is_none() {
            player_result = take_turn(
                Side::Player,
                &action,
                &mut state,
                &player,
                &mut opponent,
                inner.dice.as_mut(),
                self.config.debug_mode,
            );
            ended = check_combat_end(Side::Player, &player, &opponent, round);
        }

        if ended.is_none() {
            if !self.config.opponent_delay.is_zero() {
                tokio::time::sleep(self.config.opponent_delay).await;
            }
            let reply = inner.policy.choose_action(&state, inner.dice.as_mut())?;
            opponent_result = take_turn(
                Side::Opponent,
                &reply,
                &mut state,
                &opponent,
                &mut player,
                inner.dice.as_mut(),
                false,
            );
            ended = check_combat_end(Side::Opponent, &player, &opponent, round);
        }

        match &ended {
            Some(end) => {
                state = state.with_log(LogEntry::new(end.summary.clone(), LogKind::Info));
                let record = build_record(&player, &opponent, &state, Some(end));
                let report = validate_record(&record);
                if !report.is_valid() {
                    return Err(TurnError::InvalidState(report));
                }
                tracing::info!("{}", end.summary);
            }
            None => state = state.next_round(),
        }

        inner.state = state.clone();
        inner.player = player;
        inner.opponent = opponent;

        if let Some(end) = &ended {
            inner.outcome = Some(end.clone());
            if let Some(callback) = inner.on_complete.as_mut() {
                callback(end.winner, &end.summary);
            }
        }

        Ok(RoundOutcome {
            round,
            player_result,
            opponent_result,
            ended,
            state,
        })
    }
}

/// Resolve one side's action and fold the result into `state` and the
/// defender.
fn take_turn(
    side: Side,
    action: &WeaponCombatAction,
    state: &mut WeaponCombatState,
    attacker: &Combatant,
    defender: &mut Combatant,
    dice: &mut (dyn DiceRoller + Send),
    debug_mode: bool,
) -> Option<WeaponCombatResult> {
    let ctx = ActionContext::new(attacker, defender, state.current_range)
        .with_weapon(state.weapon(side))
        .with_aim_bonus(state.aim_bonus(side))
        .with_round(state.round)
        .with_debug_mode(debug_mode);

    let result = resolve_action(action, &ctx, dice)?;

    *state = state.apply(side, &result);
    if let Some(wound) = result.wound() {
        *defender = defender.with_wound(wound.clone());
    }
    Some(result)
}

/// The engagement is over as soon as either combatant is down.
///
/// `acting` is the side whose action was just resolved; it takes the win
/// if both sides are down at once.
fn check_combat_end(
    acting: Side,
    player: &Combatant,
    opponent: &Combatant,
    round: u32,
) -> Option<CombatEnd> {
    let winner = match (player.is_defeated(), opponent.is_defeated()) {
        (false, false) => return None,
        (false, true) => Side::Player,
        (true, false) => Side::Opponent,
        (true, true) => acting,
    };
    let (victor, loser) = match winner {
        Side::Player => (player, opponent),
        Side::Opponent => (opponent, player),
    };
    let how = if loser.has_mortal_wound() {
        "mortally wounded"
    } else {
        "knocked out of the fight"
    };
    Some(CombatEnd {
        winner,
        summary: format!(
            "{} wins the gunfight in round {}: {} is {}.",
            victor.name, round, loser.name, how
        ),
    })
}

fn build_record(
    player: &Combatant,
    opponent: &Combatant,
    state: &WeaponCombatState,
    outcome: Option<&CombatEnd>,
) -> CombatStateRecord {
    CombatStateRecord {
        is_active: outcome.is_none(),
        combat_type: CombatType::Weapon,
        winner: outcome.map(|o| o.winner),
        summary: outcome.map(|o| o.summary.clone()),
        rounds: state.round,
        player_character_id: player.id,
        opponent_character_id: opponent.id,
        combat_log: state.round_log.clone(),
        weapon: Some(state.clone()),
        brawling: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{BodyLocation, Wound};
    use crate::config::PolicyKind;
    use crate::testing::scripted_engagement;

    #[test]
    fn test_latch() {
        let flag = AtomicBool::new(false);
        let first = RoundLatch::acquire(&flag);
        assert!(first.is_some());
        assert!(RoundLatch::acquire(&flag).is_none());
        drop(first);
        assert!(RoundLatch::acquire(&flag).is_some());
    }

    #[tokio::test]
    async fn test_round_advances() {
        // A 90 fires both guns but misses both ways at 15 yards.
        let config = EngineConfig::new().with_opponent_policy(PolicyKind::AlwaysFire);
        let engagement = scripted_engagement(config, [90]);

        let outcome = engagement.submit_action(WeaponCombatAction::fire()).await.unwrap();
        assert_eq!(outcome.round, 1);
        assert!(!outcome.player_result.as_ref().unwrap().hit());
        assert!(!outcome.opponent_result.as_ref().unwrap().hit());
        assert!(outcome.ended.is_none());
        assert_eq!(outcome.state.round, 2);
        assert_eq!(outcome.state.round_log.len(), 2);
        assert_eq!(engagement.state().await, outcome.state);
        assert!(!engagement.is_processing());
    }

    #[test]
    fn test_combat_end_summary() {
        let standing = crate::testing::sample_gunfighter("Wyatt");
        let down = crate::testing::sample_outlaw("Ike")
            .with_wound(Wound::from_damage(8, BodyLocation::Chest, 2));

        let end = check_combat_end(Side::Player, &standing, &down, 2).unwrap();
        assert_eq!(end.winner, Side::Player);
        assert!(end.summary.contains("Wyatt"));
        assert!(end.summary.contains("mortally wounded"));

        let standing = crate::testing::sample_outlaw("Ike");
        assert!(check_combat_end(Side::Player, &standing, &standing, 2).is_none());
    }

    #[test]
    fn test_either_side_can_be_down() {
        let mut down = crate::testing::sample_gunfighter("Wyatt");
        down.is_unconscious = true;
        let standing = crate::testing::sample_outlaw("Ike");

        // Whoever just acted, a downed player loses.
        let end = check_combat_end(Side::Player, &down, &standing, 1).unwrap();
        assert_eq!(end.winner, Side::Opponent);
        assert!(end.summary.starts_with("Ike wins"));
        assert!(end.summary.contains("knocked out of the fight"));

        let end = check_combat_end(Side::Opponent, &down, &down, 1).unwrap();
        assert_eq!(end.winner, Side::Opponent);
    }
}
