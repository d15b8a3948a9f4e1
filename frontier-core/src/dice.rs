//! Dice rolling for weapon damage and percentile checks.
//!
//! Supports the damage notation used by the weapon catalog: `XdY+Z`
//! (and `XdY-Z`). All randomness flows through the [`DiceRoller`] seam so
//! callers can inject seeded or scripted rolls.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Most dice a single expression may roll.
pub const MAX_DICE: u32 = 100;

/// Largest die a single expression may roll.
pub const MAX_SIDES: u32 = 1000;

/// Error type for damage expression parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiceError {
    #[error("Invalid dice notation: {0}")]
    InvalidNotation(String),
    #[error("Invalid die size: {0}")]
    InvalidDieSize(u32),
    #[error("No dice specified")]
    NoDice,
}

/// Source of die rolls.
///
/// Every [`rand::Rng`] is a roller. Tests use
/// [`ScriptedDice`](crate::testing::ScriptedDice) to pin exact results.
pub trait DiceRoller {
    /// Roll a single die, returning a value in `1..=sides`.
    fn roll_die(&mut self, sides: u32) -> u32;

    /// Roll a percentile die (`1..=100`).
    fn d100(&mut self) -> u32 {
        self.roll_die(100)
    }
}

impl<R: Rng> DiceRoller for R {
    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        self.gen_range(1..=sides)
    }
}

/// A parsed damage expression (e.g. `2d6+1`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageExpression {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
    pub original: String,
}

impl DamageExpression {
    /// Parse a damage notation string.
    ///
    /// The modifier is lenient: a non-numeric modifier counts as 0, matching
    /// how hand-entered weapon tables tend to be written.
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        let notation: String = notation
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if notation.is_empty() {
            return Err(DiceError::NoDice);
        }

        let d_pos = notation
            .find('d')
            .ok_or_else(|| DiceError::InvalidNotation(notation.clone()))?;
        let count_str = &notation[..d_pos];
        let rest = &notation[d_pos + 1..];

        let (sides_str, modifier) = match rest.find(['+', '-']) {
            Some(sign_pos) => {
                let sign = if rest[sign_pos..].starts_with('-') { -1 } else { 1 };
                let value: i32 = rest[sign_pos + 1..].parse().unwrap_or(0);
                (&rest[..sign_pos], sign * value)
            }
            None => (rest, 0),
        };

        let count: u32 = count_str
            .parse()
            .map_err(|_| DiceError::InvalidNotation(notation.clone()))?;
        if count == 0 {
            return Err(DiceError::NoDice);
        }
        if count > MAX_DICE {
            return Err(DiceError::InvalidNotation(notation));
        }

        let sides: u32 = sides_str
            .parse()
            .map_err(|_| DiceError::InvalidNotation(notation.clone()))?;
        if sides == 0 || sides > MAX_SIDES {
            return Err(DiceError::InvalidDieSize(sides));
        }

        Ok(DamageExpression {
            count,
            sides,
            modifier,
            original: notation,
        })
    }

    /// Roll the expression. The total never drops below zero.
    pub fn roll_with<D: DiceRoller + ?Sized>(&self, dice: &mut D) -> i32 {
        let dice_total: i64 = (0..self.count)
            .map(|_| dice.roll_die(self.sides) as i64)
            .sum();
        let total = dice_total + self.modifier as i64;
        total.clamp(0, i32::MAX as i64) as i32
    }

    /// Smallest possible result.
    pub fn min(&self) -> i32 {
        (self.count as i32 + self.modifier).max(0)
    }

    /// Largest possible result.
    pub fn max(&self) -> i32 {
        (self.count.saturating_mul(self.sides) as i32)
            .saturating_add(self.modifier)
            .max(0)
    }
}

impl FromStr for DamageExpression {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DamageExpression::parse(s)
    }
}

impl fmt::Display for DamageExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

/// Roll a damage expression, treating anything unparseable as zero damage.
///
/// Combat must never stop on a bad weapon table entry, so this never fails.
pub fn parse_damage<D: DiceRoller + ?Sized>(notation: &str, dice: &mut D) -> i32 {
    match DamageExpression::parse(notation) {
        Ok(expr) => expr.roll_with(dice),
        Err(e) => {
            tracing::debug!("Treating damage expression {:?} as 0: {}", notation, e);
            0
        }
    }
}
