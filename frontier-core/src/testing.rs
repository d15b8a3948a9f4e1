//! Testing utilities for the combat engine.
//!
//! This module provides tools for deterministic tests:
//! - `ScriptedDice` for replaying exact die results
//! - Sample combatants with catalog weapons
//! - `scripted_engagement` for running whole gunfights without randomness

use crate::character::{Attributes, Combatant};
use crate::config::EngineConfig;
use crate::dice::DiceRoller;
use crate::engagement::Engagement;
use crate::weapons;
use std::collections::VecDeque;

/// A die roller that returns scripted results in order.
///
/// Once the script runs out it starts over from the beginning. Each value
/// is clamped into `1..=sides` for the die being rolled.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    /// Scripted results, in the order they will be returned.
    script: Vec<u32>,
    /// Results not yet returned in the current pass.
    pending: VecDeque<u32>,
    /// Every die size requested so far.
    requested: Vec<u32>,
}

impl ScriptedDice {
    /// Create a roller with scripted results.
    pub fn new(results: impl IntoIterator<Item = u32>) -> Self {
        let script: Vec<u32> = results.into_iter().collect();
        Self {
            pending: script.iter().copied().collect(),
            script,
            requested: Vec::new(),
        }
    }

    /// Queue more results after the current ones.
    pub fn push(&mut self, result: u32) {
        self.script.push(result);
        self.pending.push_back(result);
    }

    /// Die sizes requested so far, in order.
    pub fn requested(&self) -> &[u32] {
        &self.requested
    }
}

impl DiceRoller for ScriptedDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.requested.push(sides);
        if sides == 0 {
            return 0;
        }
        if self.pending.is_empty() {
            self.pending = self.script.iter().copied().collect();
        }
        self.pending.pop_front().unwrap_or(1).clamp(1, sides)
    }
}

/// A seasoned gunfighter carrying a Colt Peacemaker.
pub fn sample_gunfighter(name: &str) -> Combatant {
    let mut attributes = Attributes::new(20);
    attributes.speed = 12;
    attributes.gun_accuracy = 15;
    attributes.throwing_accuracy = 8;
    attributes.bravery = 65;
    attributes.experience = 5;
    Combatant::new(name, attributes).with_weapon(weapons::weapon(weapons::DEFAULT_WEAPON))
}

/// A green outlaw with a Winchester.
pub fn sample_outlaw(name: &str) -> Combatant {
    let mut attributes = Attributes::new(16);
    attributes.speed = 9;
    attributes.gun_accuracy = 5;
    attributes.bravery = 40;
    Combatant::new(name, attributes).with_weapon(weapons::weapon("Winchester Rifle"))
}

/// An engagement between the two sample combatants driven by scripted dice.
pub fn scripted_engagement(
    config: EngineConfig,
    results: impl IntoIterator<Item = u32>,
) -> Engagement {
    Engagement::new(
        sample_gunfighter("Wyatt"),
        sample_outlaw("Ike"),
        config,
        Box::new(ScriptedDice::new(results)),
    )
}
