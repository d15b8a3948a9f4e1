//! Standard frontier weapon catalog.
//!
//! A static table of period firearms and blades with their combat
//! modifiers, plus a fuzzy matcher for weapon names that arrive as free
//! text (narration, imported characters) rather than catalog names.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Name of the sidearm used when a weapon name is not in the catalog.
pub const DEFAULT_WEAPON: &str = "Colt Peacemaker";

/// Combat modifiers for a weapon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponModifiers {
    /// Flat bonus added to the hit roll budget.
    pub accuracy: i32,
    /// Effective range in yards.
    pub range: u32,
    /// Percent chance (1-100) that the weapon does NOT malfunction.
    pub reliability: u32,
    /// Damage dice expression, e.g. `1d6+1`.
    pub damage: String,
    /// Handling rating; positive is quicker.
    pub speed: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ammunition: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ammunition: Option<u32>,
}

impl WeaponModifiers {
    pub fn new(accuracy: i32, range: u32, reliability: u32, damage: impl Into<String>) -> Self {
        Self {
            accuracy,
            range,
            reliability: reliability.clamp(1, 100),
            damage: damage.into(),
            speed: 0,
            ammunition: None,
            max_ammunition: None,
        }
    }

    pub fn with_speed(mut self, speed: i32) -> Self {
        self.speed = speed;
        self
    }

    /// Set a full magazine of `capacity` rounds.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.ammunition = Some(capacity);
        self.max_ammunition = Some(capacity);
        self
    }
}

/// Coarse weapon family, used to narrow fuzzy name matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponCategory {
    Shotgun,
    Melee,
    Other,
}

impl WeaponCategory {
    /// Infer the category from keywords in a free-text weapon name.
    pub fn infer(name: &str) -> Self {
        const SHOTGUN_WORDS: &[&str] = &[
            "shotgun",
            "scattergun",
            "coach gun",
            "sawed-off",
            "sawed off",
            "double-barrel",
            "double barrel",
            "12 gauge",
            "12-gauge",
        ];
        const MELEE_WORDS: &[&str] = &[
            "knife", "bowie", "tomahawk", "hatchet", "axe", "club", "saber", "sabre", "machete",
            "dagger",
        ];

        let lower = name.to_lowercase();
        if SHOTGUN_WORDS.iter().any(|w| lower.contains(w)) {
            WeaponCategory::Shotgun
        } else if MELEE_WORDS.iter().any(|w| lower.contains(w)) {
            WeaponCategory::Melee
        } else {
            WeaponCategory::Other
        }
    }
}

/// A catalog entry.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub category: WeaponCategory,
    pub modifiers: WeaponModifiers,
}

impl CatalogEntry {
    fn new(name: &'static str, category: WeaponCategory, modifiers: WeaponModifiers) -> Self {
        Self {
            name,
            category,
            modifiers,
        }
    }
}

/// A live weapon carried by a combatant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub id: String,
    pub name: String,
    pub modifiers: WeaponModifiers,
}

impl Weapon {
    pub fn new(name: impl Into<String>, modifiers: WeaponModifiers) -> Self {
        let name = name.into();
        Self {
            id: weapon_id(&name),
            name,
            modifiers,
        }
    }
}

impl fmt::Display for Weapon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

fn weapon_id(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Look up a catalog entry by exact (case-insensitive) name.
pub fn get_entry(name: &str) -> Option<&'static CatalogEntry> {
    let name_lower = name.trim().to_lowercase();
    WEAPONS
        .iter()
        .find(|w| w.name.to_lowercase() == name_lower)
}

/// Get the modifiers for a weapon, falling back to the default sidearm.
pub fn lookup(name: &str) -> WeaponModifiers {
    match get_entry(name) {
        Some(entry) => entry.modifiers.clone(),
        None => {
            tracing::debug!("Unknown weapon {:?}, using {}", name, DEFAULT_WEAPON);
            default_entry().modifiers.clone()
        }
    }
}

/// Build a live weapon from the catalog. Unknown names keep their name but
/// carry the default sidearm's modifiers.
pub fn weapon(name: &str) -> Weapon {
    match get_entry(name) {
        Some(entry) => Weapon::new(entry.name, entry.modifiers.clone()),
        None => Weapon::new(name.trim(), lookup(name)),
    }
}

fn default_entry() -> &'static CatalogEntry {
    // The default sidearm is always the first catalog entry.
    &WEAPONS[0]
}

fn tokens(s: &str) -> HashSet<String> {
    s.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Token-overlap similarity (Jaccard index) between two names.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = tokens(a);
    let b = tokens(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(&b).count();
    let union = a.union(&b).count();
    shared as f64 / union as f64
}

/// Resolve a free-text weapon name to the closest catalog entry name.
///
/// Exact matches win. Otherwise candidates are narrowed to the inferred
/// category and ranked by [`similarity`]; ties go to catalog order.
pub fn closest_weapon(name: &str) -> &'static str {
    if let Some(entry) = get_entry(name) {
        return entry.name;
    }

    let category = WeaponCategory::infer(name);
    let in_category: Vec<&CatalogEntry> =
        WEAPONS.iter().filter(|w| w.category == category).collect();
    let candidates: Vec<&CatalogEntry> = if in_category.is_empty() {
        WEAPONS.iter().collect()
    } else {
        in_category
    };

    let mut best: Option<(&CatalogEntry, f64)> = None;
    for candidate in candidates {
        let score = similarity(name, candidate.name);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }

    let resolved = best.map(|(entry, _)| entry.name).unwrap_or(DEFAULT_WEAPON);
    tracing::debug!("Matched weapon {:?} to {} ({:?})", name, resolved, category);
    resolved
}

/// Build a live weapon from a free-text name via [`closest_weapon`].
pub fn closest(name: &str) -> Weapon {
    weapon(closest_weapon(name))
}

// ============================================================================
// Catalog
// ============================================================================

lazy_static::lazy_static! {
    /// Standard frontier weapons. The default sidearm must stay first.
    pub static ref WEAPONS: Vec<CatalogEntry> = {
        use WeaponCategory::*;
        vec![
            // Revolvers
            CatalogEntry::new(DEFAULT_WEAPON, Other,
                WeaponModifiers::new(5, 20, 95, "1d6+1").with_speed(1).with_capacity(6)),
            CatalogEntry::new("Colt Navy Revolver", Other,
                WeaponModifiers::new(5, 18, 90, "1d6").with_speed(1).with_capacity(6)),
            CatalogEntry::new("Smith & Wesson Schofield", Other,
                WeaponModifiers::new(5, 20, 93, "1d6+1").with_speed(2).with_capacity(6)),
            CatalogEntry::new("Remington Army Revolver", Other,
                WeaponModifiers::new(4, 20, 92, "1d6+1").with_speed(1).with_capacity(6)),
            CatalogEntry::new("Derringer", Other,
                WeaponModifiers::new(0, 5, 85, "1d4").with_speed(2).with_capacity(2)),

            // Long guns
            CatalogEntry::new("Winchester Rifle", Other,
                WeaponModifiers::new(10, 100, 92, "2d6").with_speed(-1).with_capacity(15)),
            CatalogEntry::new("Henry Rifle", Other,
                WeaponModifiers::new(8, 90, 88, "2d6").with_speed(-1).with_capacity(16)),
            CatalogEntry::new("Spencer Carbine", Other,
                WeaponModifiers::new(8, 80, 90, "2d6").with_speed(0).with_capacity(7)),
            CatalogEntry::new("Sharps Rifle", Other,
                WeaponModifiers::new(15, 200, 95, "2d8").with_speed(-2).with_capacity(1)),
            CatalogEntry::new("Bow and Arrow", Other,
                WeaponModifiers::new(0, 40, 99, "1d6").with_speed(0)),

            // Shotguns
            CatalogEntry::new("Double-Barrel Shotgun", Shotgun,
                WeaponModifiers::new(10, 15, 95, "3d6").with_speed(-1).with_capacity(2)),
            CatalogEntry::new("Sawed-Off Shotgun", Shotgun,
                WeaponModifiers::new(12, 8, 93, "3d6").with_speed(0).with_capacity(2)),
            CatalogEntry::new("Coach Gun", Shotgun,
                WeaponModifiers::new(10, 12, 95, "3d6").with_speed(-1).with_capacity(2)),
            CatalogEntry::new("Pump-Action Shotgun", Shotgun,
                WeaponModifiers::new(8, 18, 90, "2d6+2").with_speed(-1).with_capacity(5)),

            // Melee
            CatalogEntry::new("Bowie Knife", Melee,
                WeaponModifiers::new(0, 1, 100, "1d4+1").with_speed(2)),
            CatalogEntry::new("Tomahawk", Melee,
                WeaponModifiers::new(0, 10, 100, "1d6").with_speed(1)),
            CatalogEntry::new("Cavalry Saber", Melee,
                WeaponModifiers::new(2, 1, 100, "1d8").with_speed(0)),
            CatalogEntry::new("Club", Melee,
                WeaponModifiers::new(0, 1, 100, "1d4").with_speed(0)),
        ]
    };
}
