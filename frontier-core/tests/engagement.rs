//! Integration tests for running whole gunfights through `Engagement`.
//!
//! Dice are scripted so every round is deterministic.

use frontier_core::combat::{ActionKind, LogKind, Side, WeaponCombatAction, WeaponCombatResult};
use frontier_core::config::{EngineConfig, PolicyKind};
use frontier_core::engagement::TurnError;
use frontier_core::policy::{OpponentPolicy, PolicyError};
use frontier_core::testing::{sample_gunfighter, sample_outlaw, scripted_engagement, ScriptedDice};
use frontier_core::validation::{validate_combat_state, CombatType};
use frontier_core::{BodyLocation, DiceRoller, Engagement, WeaponCombatState, Wound};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn always_fire() -> EngineConfig {
    EngineConfig::new().with_opponent_policy(PolicyKind::AlwaysFire)
}

struct BrokenPolicy;

impl OpponentPolicy for BrokenPolicy {
    fn choose_action(
        &mut self,
        _state: &WeaponCombatState,
        _dice: &mut dyn DiceRoller,
    ) -> Result<WeaponCombatAction, PolicyError> {
        Err(PolicyError::Unavailable("no suggestion".to_string()))
    }
}

// =============================================================================
// Combat end
// =============================================================================

#[tokio::test]
async fn test_debug_mode_point_blank_kill() {
    let config = always_fire().with_debug_mode(true).with_default_range(5);
    // Debug mode skips the fire roll: d6 for damage, then the hit location.
    let engagement = scripted_engagement(config, [6, 20]);

    let outcome = engagement
        .submit_action(WeaponCombatAction::fire())
        .await
        .unwrap();

    let player_result = outcome.player_result.unwrap();
    assert!(player_result.hit());
    assert!(player_result.critical());
    assert_eq!(player_result.damage(), Some(14));
    assert_eq!(player_result.new_strength(), Some(0));
    assert!(outcome.opponent_result.is_none());

    let end = outcome.ended.unwrap();
    assert_eq!(end.winner, Side::Player);
    assert!(end.summary.contains("Wyatt"));

    assert!(engagement.is_over().await);
    assert!(engagement.opponent().await.has_mortal_wound());
    // The round is not advanced once the fight is over.
    assert_eq!(engagement.state().await.round, 1);
}

#[tokio::test]
async fn test_opponent_can_win() {
    // Player rolls 90 and misses; the opponent rolls a 1, then 6 and 6 on
    // 2d6, then 20 for the chest.
    let engagement = scripted_engagement(always_fire(), [90, 1, 6, 6, 20]);

    let outcome = engagement
        .submit_action(WeaponCombatAction::fire())
        .await
        .unwrap();

    assert!(!outcome.player_result.unwrap().hit());
    let reply = outcome.opponent_result.unwrap();
    assert!(reply.critical());
    assert_eq!(reply.damage(), Some(24));
    assert_eq!(outcome.ended.unwrap().winner, Side::Opponent);
    assert!(engagement.player().await.is_defeated());
}

#[tokio::test]
async fn test_completion_callback_and_record() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let config = always_fire().with_debug_mode(true);
    let engagement = scripted_engagement(config, [6, 20]).on_complete(move |winner, summary| {
        sink.lock().unwrap().push((winner, summary.to_string()));
    });

    engagement
        .submit_action(WeaponCombatAction::fire())
        .await
        .unwrap();

    let calls = seen.lock().unwrap().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, Side::Player);

    let record = engagement.record().await;
    assert!(!record.is_active);
    assert_eq!(record.combat_type, CombatType::Weapon);
    assert_eq!(record.winner, Some(Side::Player));
    assert_eq!(record.summary.as_deref(), Some(calls[0].1.as_str()));
    assert_eq!(record.combat_log.last().unwrap().kind, LogKind::Info);

    let report = validate_combat_state(&serde_json::to_value(&record).unwrap());
    assert!(report.is_valid(), "{report}");
}

#[tokio::test]
async fn test_no_rounds_after_combat_over() {
    let config = always_fire().with_debug_mode(true);
    let engagement = scripted_engagement(config, [6, 20]);

    engagement
        .submit_action(WeaponCombatAction::fire())
        .await
        .unwrap();
    let before = engagement.state().await;

    let err = engagement
        .submit_action(WeaponCombatAction::fire())
        .await
        .unwrap_err();
    assert!(matches!(err, TurnError::CombatOver));
    assert_eq!(engagement.state().await, before);
}

// =============================================================================
// Round flow
// =============================================================================

#[tokio::test]
async fn test_second_submission_rejected_while_processing() {
    let config = always_fire().with_opponent_delay(Duration::from_millis(50));
    let engagement = scripted_engagement(config, [90]);

    let (a, b) = tokio::join!(
        engagement.submit_action(WeaponCombatAction::fire()),
        engagement.submit_action(WeaponCombatAction::fire()),
    );

    let rejected = [&a, &b]
        .iter()
        .filter(|r| matches!(r, Err(TurnError::RoundInProgress)))
        .count();
    assert_eq!(rejected, 1);
    assert!(a.is_ok() || b.is_ok());

    assert!(!engagement.is_processing());
    assert_eq!(engagement.state().await.round, 2);
}

#[tokio::test]
async fn test_policy_failure_commits_nothing() {
    let engagement = scripted_engagement(always_fire(), [90]).with_policy(Box::new(BrokenPolicy));
    let before = engagement.state().await;

    let err = engagement
        .submit_action(WeaponCombatAction::Aim)
        .await
        .unwrap_err();
    assert!(matches!(err, TurnError::Policy(PolicyError::Unavailable(_))));

    assert_eq!(engagement.state().await, before);
    assert_eq!(engagement.state().await.player_aim_bonus, 0);
    assert!(!engagement.is_processing());
    assert!(!engagement.is_over().await);
}

#[tokio::test]
async fn test_move_changes_only_range() {
    let engagement = scripted_engagement(always_fire(), [90]);

    let outcome = engagement
        .submit_action(WeaponCombatAction::move_to(30))
        .await
        .unwrap();

    match outcome.player_result.unwrap() {
        WeaponCombatResult::Move {
            new_range,
            range_modifier,
            ..
        } => {
            assert_eq!(new_range, 30);
            assert_eq!(range_modifier, -20);
        }
        other => panic!("expected a move, got {other:?}"),
    }

    let state = engagement.state().await;
    assert_eq!(state.current_range, 30);
    assert_eq!(state.player_aim_bonus, 0);
    assert_eq!(state.last_action, Some(ActionKind::Fire));
    assert_eq!(state.round_log.len(), 2);
    assert_eq!(state.round_log[0].side, Some(Side::Player));
    assert_eq!(state.round_log[1].side, Some(Side::Opponent));
}

#[tokio::test]
async fn test_reload_keeps_weapon() {
    let engagement = scripted_engagement(always_fire(), [90]);
    let weapon = engagement.state().await.player_weapon;

    let outcome = engagement
        .submit_action(WeaponCombatAction::Reload)
        .await
        .unwrap();

    assert_eq!(outcome.player_result.unwrap().kind(), ActionKind::Reload);
    assert_eq!(engagement.state().await.player_weapon, weapon);
}

#[tokio::test]
async fn test_aim_then_fire_spends_aim() {
    let engagement = scripted_engagement(always_fire(), [90]);

    engagement
        .submit_action(WeaponCombatAction::Aim)
        .await
        .unwrap();
    assert_eq!(engagement.state().await.player_aim_bonus, 10);

    // 90 - 10 aim = 80, still above the gunfighter's 75.
    let outcome = engagement
        .submit_action(WeaponCombatAction::fire())
        .await
        .unwrap();
    assert!(!outcome.player_result.unwrap().hit());

    let state = engagement.state().await;
    assert_eq!(state.player_aim_bonus, 0);
    assert_eq!(state.round, 3);
}

#[tokio::test]
async fn test_weighted_opponent_aims() {
    // 90 misses for the player, then 90 > 70 so the opponent aims.
    let config =
        EngineConfig::new().with_opponent_policy(PolicyKind::Weighted { fire_percent: 70 });
    let engagement = scripted_engagement(config, [90]);

    let outcome = engagement
        .submit_action(WeaponCombatAction::fire())
        .await
        .unwrap();
    assert_eq!(outcome.opponent_result.unwrap().kind(), ActionKind::Aim);
    assert_eq!(engagement.state().await.opponent_aim_bonus, 10);
}

#[tokio::test]
async fn test_unarmed_player_action_is_not_logged() {
    let mut player = sample_gunfighter("Wyatt");
    player.weapon = None;
    let engagement = Engagement::new(
        player,
        sample_outlaw("Ike"),
        always_fire(),
        Box::new(ScriptedDice::new([90])),
    );

    let outcome = engagement
        .submit_action(WeaponCombatAction::fire())
        .await
        .unwrap();

    assert!(outcome.player_result.is_none());
    assert_eq!(outcome.opponent_result.unwrap().kind(), ActionKind::Fire);
    assert!(outcome.ended.is_none());

    let state = engagement.state().await;
    assert_eq!(state.round_log.len(), 1);
    assert_eq!(state.round_log[0].side, Some(Side::Opponent));
    assert_eq!(state.round, 2);
}

// =============================================================================
// Combatants who start the round already down
// =============================================================================

#[tokio::test]
async fn test_downed_player_cannot_act() {
    let player =
        sample_gunfighter("Wyatt").with_wound(Wound::from_damage(8, BodyLocation::Chest, 0));
    assert!(player.is_defeated());

    // Debug mode would otherwise guarantee a hit at point blank.
    let config = always_fire().with_debug_mode(true).with_default_range(5);
    let engagement = Engagement::new(
        player,
        sample_outlaw("Ike"),
        config,
        Box::new(ScriptedDice::new([6, 20])),
    );

    let outcome = engagement
        .submit_action(WeaponCombatAction::fire())
        .await
        .unwrap();

    assert!(outcome.player_result.is_none());
    assert!(outcome.opponent_result.is_none());
    let end = outcome.ended.unwrap();
    assert_eq!(end.winner, Side::Opponent);
    assert!(end.summary.starts_with("Ike wins"));

    assert!(engagement.opponent().await.wounds.is_empty());
    let state = engagement.state().await;
    assert_eq!(state.round_log.len(), 1);
    assert_eq!(state.round_log[0].kind, LogKind::Info);
}

#[tokio::test]
async fn test_downed_opponent_loses_without_a_shot() {
    let mut opponent = sample_outlaw("Ike");
    opponent.is_unconscious = true;
    let dice = ScriptedDice::new([90]);
    let engagement = Engagement::new(
        sample_gunfighter("Wyatt"),
        opponent,
        always_fire(),
        Box::new(dice),
    );

    let outcome = engagement
        .submit_action(WeaponCombatAction::fire())
        .await
        .unwrap();

    assert!(outcome.player_result.is_none());
    assert_eq!(outcome.ended.unwrap().winner, Side::Player);
    assert!(engagement.player().await.wounds.is_empty());
}
