//! Weapon combat engine for a Western role-playing game.
//!
//! This crate provides:
//! - A weapon catalog with fuzzy name matching
//! - Dice notation parsing behind an injectable roller
//! - Deterministic resolution of aim, fire, reload, move and malfunction
//! - Wounds, hit locations and strength loss
//! - A turn orchestrator that runs the player and an automated opponent
//! - Validation of the combat state record handed back to the application
//!
//! # Quick Start
//!
//! ```ignore
//! use frontier_core::{
//!     weapons, Attributes, Combatant, Engagement, EngineConfig, WeaponCombatAction,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let player = Combatant::new("Wyatt", Attributes::new(20))
//!         .with_weapon(weapons::closest("peacemaker"));
//!     let opponent = Combatant::new("Ike", Attributes::new(16))
//!         .with_weapon(weapons::closest("winchester"));
//!
//!     let engagement = Engagement::with_random_dice(player, opponent, EngineConfig::from_env()?);
//!     let outcome = engagement.submit_action(WeaponCombatAction::fire()).await?;
//!     for entry in &outcome.state.round_log {
//!         println!("{}", entry.text);
//!     }
//!     Ok(())
//! }
//! ```

pub mod character;
pub mod combat;
pub mod config;
pub mod dice;
pub mod engagement;
pub mod modifiers;
pub mod policy;
pub mod rules;
pub mod testing;
pub mod validation;
pub mod weapons;

// Primary public API
pub use character::{Attributes, BodyLocation, CharacterId, Combatant, Wound, WoundSeverity};
pub use combat::{
    LogEntry, LogKind, Side, WeaponCombatAction, WeaponCombatResult, WeaponCombatState,
};
pub use config::{EngineConfig, PolicyKind};
pub use dice::{DamageExpression, DiceRoller};
pub use engagement::{CombatEnd, Engagement, RoundOutcome, TurnError};
pub use policy::OpponentPolicy;
pub use rules::{resolve_action, ActionContext};
pub use testing::ScriptedDice;
pub use validation::{validate_combat_state, CombatStateRecord, ValidationReport};
pub use weapons::{Weapon, WeaponModifiers};
