//! Combatants, wounds and the strength model.
//!
//! A combatant's current strength is always derived from its base strength
//! and its wound list; wounds are only ever appended.

use crate::dice::DiceRoller;
use crate::weapons::Weapon;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Wounds
// ============================================================================

/// Strength reduction recorded for a light wound.
pub const LIGHT_WOUND_REDUCTION: i32 = 3;

/// Strength reduction recorded for a serious wound.
pub const SERIOUS_WOUND_REDUCTION: i32 = 7;

/// Damage at or above which a wound is serious.
pub const SERIOUS_DAMAGE_THRESHOLD: i32 = 3;

/// Damage at or above which a wound is mortal.
pub const MORTAL_DAMAGE_THRESHOLD: i32 = 7;

/// Body region struck by a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyLocation {
    Head,
    Chest,
    Abdomen,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

impl BodyLocation {
    pub fn name(&self) -> &'static str {
        match self {
            BodyLocation::Head => "head",
            BodyLocation::Chest => "chest",
            BodyLocation::Abdomen => "abdomen",
            BodyLocation::LeftArm => "left arm",
            BodyLocation::RightArm => "right arm",
            BodyLocation::LeftLeg => "left leg",
            BodyLocation::RightLeg => "right leg",
        }
    }

    /// Percentage applied to a wound's strength reduction at this location.
    pub fn reduction_percent(&self) -> i32 {
        match self {
            BodyLocation::Head => 150,
            BodyLocation::Chest | BodyLocation::Abdomen => 100,
            BodyLocation::LeftArm
            | BodyLocation::RightArm
            | BodyLocation::LeftLeg
            | BodyLocation::RightLeg => 75,
        }
    }

    /// Map a percentile roll to a hit location.
    pub fn from_roll(roll: u32) -> Self {
        match roll {
            0..=10 => BodyLocation::Head,
            11..=35 => BodyLocation::Chest,
            36..=50 => BodyLocation::Abdomen,
            51..=62 => BodyLocation::LeftArm,
            63..=75 => BodyLocation::RightArm,
            76..=88 => BodyLocation::LeftLeg,
            _ => BodyLocation::RightLeg,
        }
    }

    /// Roll a random hit location.
    pub fn roll<D: DiceRoller + ?Sized>(dice: &mut D) -> Self {
        Self::from_roll(dice.d100())
    }
}

impl fmt::Display for BodyLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How bad a wound is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WoundSeverity {
    Light,
    Serious,
    Mortal,
}

impl WoundSeverity {
    /// Severity for a given amount of raw damage.
    pub fn from_damage(damage: i32) -> Self {
        if damage >= MORTAL_DAMAGE_THRESHOLD {
            WoundSeverity::Mortal
        } else if damage >= SERIOUS_DAMAGE_THRESHOLD {
            WoundSeverity::Serious
        } else {
            WoundSeverity::Light
        }
    }

    /// Recorded strength reduction. A mortal wound has no finite reduction.
    pub fn strength_reduction(&self) -> Option<i32> {
        match self {
            WoundSeverity::Light => Some(LIGHT_WOUND_REDUCTION),
            WoundSeverity::Serious => Some(SERIOUS_WOUND_REDUCTION),
            WoundSeverity::Mortal => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WoundSeverity::Light => "light",
            WoundSeverity::Serious => "serious",
            WoundSeverity::Mortal => "mortal",
        }
    }
}

impl fmt::Display for WoundSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A wound received in combat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wound {
    pub location: BodyLocation,
    pub severity: WoundSeverity,
    /// Strength lost before the location adjustment. Mortal wounds store
    /// `i32::MAX`.
    pub strength_reduction: i32,
    pub turn_received: u32,
    pub damage: i32,
}

impl Wound {
    /// Build a wound from raw damage at a location.
    pub fn from_damage(damage: i32, location: BodyLocation, turn_received: u32) -> Self {
        let severity = WoundSeverity::from_damage(damage);
        Self {
            location,
            severity,
            strength_reduction: severity.strength_reduction().unwrap_or(i32::MAX),
            turn_received,
            damage,
        }
    }

    pub fn is_mortal(&self) -> bool {
        self.severity == WoundSeverity::Mortal
    }

    /// Strength actually lost once the location is taken into account.
    pub fn effective_reduction(&self) -> i32 {
        if self.is_mortal() {
            return i32::MAX;
        }
        let adjusted =
            self.strength_reduction as i64 * self.location.reduction_percent() as i64 / 100;
        adjusted.clamp(0, i32::MAX as i64) as i32
    }
}

// ============================================================================
// Combatants
// ============================================================================

/// Combat-relevant attributes, mostly on a 1-100 scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    /// Current strength; kept equal to [`current_strength`] with zero allowed.
    pub strength: i32,
    pub base_strength: i32,
    pub speed: i32,
    pub gun_accuracy: i32,
    pub throwing_accuracy: i32,
    pub bravery: i32,
    pub experience: i32,
}

impl Attributes {
    /// Attributes for an unwounded character.
    pub fn new(strength: i32) -> Self {
        Self {
            strength,
            base_strength: strength,
            speed: 10,
            gun_accuracy: 10,
            throwing_accuracy: 10,
            bravery: 50,
            experience: 0,
        }
    }
}

/// A participant in a gunfight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CharacterId,
    pub name: String,
    pub attributes: Attributes,
    pub wounds: Vec<Wound>,
    pub weapon: Option<Weapon>,
    pub is_unconscious: bool,
}

impl Combatant {
    pub fn new(name: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            attributes,
            wounds: Vec::new(),
            weapon: None,
            is_unconscious: false,
        }
    }

    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapon = Some(weapon);
        self
    }

    /// Return a copy of this combatant with `wound` appended.
    ///
    /// The stored strength is re-derived, and a combatant whose strength
    /// reaches zero is knocked unconscious.
    pub fn with_wound(&self, wound: Wound) -> Self {
        let mut next = self.clone();
        next.wounds.push(wound);
        next.attributes.strength = current_strength(&next, true);
        if next.attributes.strength <= 0 {
            next.is_unconscious = true;
        }
        next
    }

    pub fn has_mortal_wound(&self) -> bool {
        self.wounds.iter().any(Wound::is_mortal)
    }

    pub fn current_strength(&self, allow_zero: bool) -> i32 {
        current_strength(self, allow_zero)
    }

    pub fn is_defeated(&self) -> bool {
        is_defeated(self)
    }
}

/// Base strength minus all location-adjusted wound reductions.
///
/// Clamped to 1, or to 0 when `allow_zero` is set (for knockout checks).
pub fn current_strength(combatant: &Combatant, allow_zero: bool) -> i32 {
    let floor = if allow_zero { 0 } else { 1 };
    if combatant.has_mortal_wound() {
        return floor;
    }
    let total_reduction: i64 = combatant
        .wounds
        .iter()
        .map(|w| w.effective_reduction() as i64)
        .sum();
    let strength = combatant.attributes.base_strength as i64 - total_reduction;
    strength.max(floor as i64) as i32
}

/// Unconscious, mortally wounded, or out of strength.
pub fn is_defeated(combatant: &Combatant) -> bool {
    combatant.is_unconscious
        || combatant.has_mortal_wound()
        || current_strength(combatant, true) <= 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gunfighter(strength: i32) -> Combatant {
        Combatant::new("Test", Attributes::new(strength))
    }

    #[test]
    fn test_severity_thresholds() {
        assert_eq!(WoundSeverity::from_damage(0), WoundSeverity::Light);
        assert_eq!(WoundSeverity::from_damage(2), WoundSeverity::Light);
        assert_eq!(WoundSeverity::from_damage(3), WoundSeverity::Serious);
        assert_eq!(WoundSeverity::from_damage(6), WoundSeverity::Serious);
        assert_eq!(WoundSeverity::from_damage(7), WoundSeverity::Mortal);
    }

    #[test]
    fn test_location_table() {
        assert_eq!(BodyLocation::from_roll(1), BodyLocation::Head);
        assert_eq!(BodyLocation::from_roll(10), BodyLocation::Head);
        assert_eq!(BodyLocation::from_roll(11), BodyLocation::Chest);
        assert_eq!(BodyLocation::from_roll(50), BodyLocation::Abdomen);
        assert_eq!(BodyLocation::from_roll(62), BodyLocation::LeftArm);
        assert_eq!(BodyLocation::from_roll(75), BodyLocation::RightArm);
        assert_eq!(BodyLocation::from_roll(88), BodyLocation::LeftLeg);
        assert_eq!(BodyLocation::from_roll(100), BodyLocation::RightLeg);
    }

    #[test]
    fn test_location_adjusts_reduction() {
        let chest = Wound::from_damage(4, BodyLocation::Chest, 1);
        let head = Wound::from_damage(4, BodyLocation::Head, 1);
        let arm = Wound::from_damage(4, BodyLocation::LeftArm, 1);
        assert_eq!(chest.effective_reduction(), 7);
        assert_eq!(head.effective_reduction(), 10);
        assert_eq!(arm.effective_reduction(), 5);
    }

    #[test]
    fn test_current_strength() {
        let c = gunfighter(20)
            .with_wound(Wound::from_damage(1, BodyLocation::Chest, 1))
            .with_wound(Wound::from_damage(4, BodyLocation::Chest, 2));
        assert_eq!(current_strength(&c, false), 20 - 3 - 7);
        assert_eq!(c.attributes.strength, 10);
        assert!(!is_defeated(&c));
    }

    #[test]
    fn test_strength_floor() {
        let c = gunfighter(5).with_wound(Wound::from_damage(5, BodyLocation::Chest, 1));
        assert_eq!(current_strength(&c, false), 1);
        assert_eq!(current_strength(&c, true), 0);
        assert_eq!(c.attributes.strength, 0);
        assert!(c.is_unconscious);
        assert!(is_defeated(&c));
    }

    #[test]
    fn test_mortal_wound_defeats() {
        let c = gunfighter(100).with_wound(Wound::from_damage(9, BodyLocation::LeftLeg, 1));
        assert!(c.has_mortal_wound());
        assert!(is_defeated(&c));
        assert_eq!(current_strength(&c, true), 0);
    }

    #[test]
    fn test_one_strength_not_defeated() {
        let mut c = gunfighter(4);
        c = c.with_wound(Wound::from_damage(1, BodyLocation::Chest, 1));
        assert_eq!(current_strength(&c, false), 1);
        assert_eq!(current_strength(&c, true), 1);
        assert!(!is_defeated(&c));
    }

    #[test]
    fn test_unconscious_flag_defeats() {
        let mut c = gunfighter(20);
        c.is_unconscious = true;
        assert!(is_defeated(&c));
    }

    #[test]
    fn test_with_wound_does_not_mutate_original() {
        let original = gunfighter(20);
        let wounded = original.with_wound(Wound::from_damage(2, BodyLocation::Head, 1));
        assert!(original.wounds.is_empty());
        assert_eq!(original.attributes.strength, 20);
        assert_eq!(wounded.wounds.len(), 1);
    }
}
