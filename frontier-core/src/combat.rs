//! Weapon combat state, actions and results.
//!
//! `WeaponCombatState` is a plain value: every transition returns a new
//! state instead of editing the old one.

use crate::character::{Combatant, Wound};
use crate::weapons::Weapon;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the engagement acted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn other(&self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Side::Player => "player",
            Side::Opponent => "opponent",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Tag for an action or result kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Aim,
    Fire,
    Reload,
    Move,
    Malfunction,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Aim => "aim",
            ActionKind::Fire => "fire",
            ActionKind::Reload => "reload",
            ActionKind::Move => "move",
            ActionKind::Malfunction => "malfunction",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An action submitted for one combatant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WeaponCombatAction {
    Aim,
    Fire {
        /// Extra bonus computed by the caller, added to the total bonus.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        modifier: Option<i32>,
        /// Damage expression overriding the weapon's own.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        damage: Option<String>,
    },
    Reload,
    Move {
        #[serde(rename = "targetRange")]
        target_range: u32,
    },
    Malfunction,
}

impl WeaponCombatAction {
    /// A plain fire action with nothing precomputed.
    pub fn fire() -> Self {
        WeaponCombatAction::Fire {
            modifier: None,
            damage: None,
        }
    }

    pub fn move_to(target_range: u32) -> Self {
        WeaponCombatAction::Move { target_range }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            WeaponCombatAction::Aim => ActionKind::Aim,
            WeaponCombatAction::Fire { .. } => ActionKind::Fire,
            WeaponCombatAction::Reload => ActionKind::Reload,
            WeaponCombatAction::Move { .. } => ActionKind::Move,
            WeaponCombatAction::Malfunction => ActionKind::Malfunction,
        }
    }
}

// ============================================================================
// Results
// ============================================================================

/// The rolls and outcome of a shot that went off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireResult {
    pub hit: bool,
    pub critical: bool,
    pub roll: u32,
    /// Roll minus the total bonus.
    pub modified_roll: i32,
    pub target_number: i32,
    pub damage: Option<i32>,
    /// Defender's strength after the hit, never negative.
    pub new_strength: Option<i32>,
    pub wound: Option<Wound>,
    pub message: String,
}

/// Outcome of resolving one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WeaponCombatResult {
    Aim {
        aim_bonus: i32,
        improved: bool,
        message: String,
    },
    Fire(FireResult),
    Malfunction {
        /// The roll that jammed the weapon; absent for a declared jam.
        roll: Option<u32>,
        message: String,
    },
    Reload {
        message: String,
    },
    Move {
        new_range: u32,
        range_modifier: i32,
        message: String,
    },
}

impl WeaponCombatResult {
    pub fn kind(&self) -> ActionKind {
        match self {
            WeaponCombatResult::Aim { .. } => ActionKind::Aim,
            WeaponCombatResult::Fire(_) => ActionKind::Fire,
            WeaponCombatResult::Malfunction { .. } => ActionKind::Malfunction,
            WeaponCombatResult::Reload { .. } => ActionKind::Reload,
            WeaponCombatResult::Move { .. } => ActionKind::Move,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            WeaponCombatResult::Aim { message, .. }
            | WeaponCombatResult::Malfunction { message, .. }
            | WeaponCombatResult::Reload { message }
            | WeaponCombatResult::Move { message, .. } => message,
            WeaponCombatResult::Fire(fire) => &fire.message,
        }
    }

    pub fn hit(&self) -> bool {
        matches!(self, WeaponCombatResult::Fire(fire) if fire.hit)
    }

    pub fn critical(&self) -> bool {
        matches!(self, WeaponCombatResult::Fire(fire) if fire.critical)
    }

    pub fn damage(&self) -> Option<i32> {
        match self {
            WeaponCombatResult::Fire(fire) => fire.damage,
            _ => None,
        }
    }

    pub fn new_strength(&self) -> Option<i32> {
        match self {
            WeaponCombatResult::Fire(fire) => fire.new_strength,
            _ => None,
        }
    }

    pub fn wound(&self) -> Option<&Wound> {
        match self {
            WeaponCombatResult::Fire(fire) => fire.wound.as_ref(),
            _ => None,
        }
    }

    pub fn weapon_malfunction(&self) -> bool {
        matches!(self, WeaponCombatResult::Malfunction { .. })
    }

    /// Log classification for this result.
    pub fn log_kind(&self) -> LogKind {
        match self {
            WeaponCombatResult::Fire(fire) if fire.hit && fire.critical => LogKind::Critical,
            WeaponCombatResult::Fire(fire) if fire.hit => LogKind::Hit,
            WeaponCombatResult::Fire(_) | WeaponCombatResult::Malfunction { .. } => LogKind::Miss,
            _ => LogKind::Info,
        }
    }
}

// ============================================================================
// Log
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Hit,
    Miss,
    Critical,
    Info,
}

/// One line of the round log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: LogKind,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
}

impl LogEntry {
    pub fn new(text: impl Into<String>, kind: LogKind) -> Self {
        Self {
            text: text.into(),
            kind,
            timestamp: Utc::now(),
            side: None,
        }
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }
}

// ============================================================================
// State
// ============================================================================

/// State of one weapon engagement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponCombatState {
    pub round: u32,
    pub player_weapon: Option<Weapon>,
    pub opponent_weapon: Option<Weapon>,
    /// Distance between the combatants in yards.
    pub current_range: u32,
    pub round_log: Vec<LogEntry>,
    pub last_action: Option<ActionKind>,
    pub player_aim_bonus: i32,
    pub opponent_aim_bonus: i32,
}

impl WeaponCombatState {
    /// Start an engagement from the combatants' equipped weapons.
    pub fn new(player: &Combatant, opponent: &Combatant, range: u32) -> Self {
        Self {
            round: 1,
            player_weapon: player.weapon.clone(),
            opponent_weapon: opponent.weapon.clone(),
            current_range: range,
            round_log: Vec::new(),
            last_action: None,
            player_aim_bonus: 0,
            opponent_aim_bonus: 0,
        }
    }

    pub fn weapon(&self, side: Side) -> Option<&Weapon> {
        match side {
            Side::Player => self.player_weapon.as_ref(),
            Side::Opponent => self.opponent_weapon.as_ref(),
        }
    }

    pub fn aim_bonus(&self, side: Side) -> i32 {
        match side {
            Side::Player => self.player_aim_bonus,
            Side::Opponent => self.opponent_aim_bonus,
        }
    }

    fn set_aim_bonus(&mut self, side: Side, bonus: i32) {
        match side {
            Side::Player => self.player_aim_bonus = bonus,
            Side::Opponent => self.opponent_aim_bonus = bonus,
        }
    }

    /// The state after `side`'s action produced `result`.
    ///
    /// Appends a log entry, records the action, moves the range on a move,
    /// and raises or clears the acting side's aim bonus. Any shot attempt,
    /// including a jam, spends that side's aim.
    pub fn apply(&self, side: Side, result: &WeaponCombatResult) -> Self {
        let mut next = self.clone();
        match result {
            WeaponCombatResult::Aim { aim_bonus, .. } => next.set_aim_bonus(side, *aim_bonus),
            WeaponCombatResult::Fire(_) | WeaponCombatResult::Malfunction { .. } => {
                next.set_aim_bonus(side, 0)
            }
            WeaponCombatResult::Move { new_range, .. } => next.current_range = *new_range,
            WeaponCombatResult::Reload { .. } => {}
        }
        next.last_action = Some(result.kind());
        next.round_log
            .push(LogEntry::new(result.message(), result.log_kind()).with_side(side));
        next
    }

    /// Append an informational line.
    pub fn with_log(&self, entry: LogEntry) -> Self {
        let mut next = self.clone();
        next.round_log.push(entry);
        next
    }

    /// The state at the start of the following round.
    pub fn next_round(&self) -> Self {
        let mut next = self.clone();
        next.round += 1;
        next
    }
}
