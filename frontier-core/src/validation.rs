//! Structural checks on combat state records.
//!
//! Combat state may come back from outside the engine (a UI store, an old
//! save) in a partially broken shape. Before an engagement is torn down the
//! record is checked here and every problem is reported with a code and the
//! offending field path, instead of failing on the first one.

use crate::character::CharacterId;
use crate::combat::{LogEntry, Side, WeaponCombatState};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Top-level fields kept in the cleaned projection.
const ALLOWED_FIELDS: &[&str] = &[
    "isActive",
    "combatType",
    "winner",
    "summary",
    "rounds",
    "playerCharacterId",
    "opponentCharacterId",
    "combatLog",
];

/// Combat modes a record can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombatType {
    Weapon,
    Brawling,
}

impl CombatType {
    pub const ALL: [CombatType; 2] = [CombatType::Weapon, CombatType::Brawling];

    /// Name used both as the `combatType` value and the sub-state key.
    pub fn name(&self) -> &'static str {
        match self {
            CombatType::Weapon => "weapon",
            CombatType::Brawling => "brawling",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

/// Brawling sub-state, as recorded by the brawling side of the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrawlingState {
    pub round: u32,
    pub player_modifier: i32,
    pub opponent_modifier: i32,
    pub round_log: Vec<LogEntry>,
}

/// The combat state record handed back to the surrounding application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatStateRecord {
    pub is_active: bool,
    pub combat_type: CombatType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub rounds: u32,
    pub player_character_id: CharacterId,
    pub opponent_character_id: CharacterId,
    pub combat_log: Vec<LogEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapon: Option<WeaponCombatState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brawling: Option<BrawlingState>,
}

/// Machine-readable violation codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationCode {
    NotAnObject,
    MissingField,
    InvalidType,
    InvalidCombatType,
    MissingModeState,
    NegativeValue,
}

impl fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ViolationCode::NotAnObject => "NOT_AN_OBJECT",
            ViolationCode::MissingField => "MISSING_FIELD",
            ViolationCode::InvalidType => "INVALID_TYPE",
            ViolationCode::InvalidCombatType => "INVALID_COMBAT_TYPE",
            ViolationCode::MissingModeState => "MISSING_MODE_STATE",
            ViolationCode::NegativeValue => "NEGATIVE_VALUE",
        };
        write!(f, "{s}")
    }
}

/// One problem found in a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub code: ViolationCode,
    pub message: String,
    /// Dotted path to the offending field (`$` for the record itself).
    pub path: String,
}

impl Violation {
    fn new(code: ViolationCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.path, self.message)
    }
}

/// Result of validating a record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
    /// Allow-listed projection of the record, present only when valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleaned: Option<Value>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn has_code(&self, code: ViolationCode) -> bool {
        self.violations.iter().any(|v| v.code == code)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return write!(f, "valid");
        }
        let lines: Vec<String> = self.violations.iter().map(|v| v.to_string()).collect();
        write!(f, "{}", lines.join("; "))
    }
}

/// Validate a combat state record given as JSON.
pub fn validate_combat_state(record: &Value) -> ValidationReport {
    let Some(obj) = record.as_object() else {
        return ValidationReport {
            violations: vec![Violation::new(
                ViolationCode::NotAnObject,
                "$",
                "combat state must be an object",
            )],
            cleaned: None,
        };
    };

    let mut violations = Vec::new();

    let combat_type = match obj.get("combatType") {
        None | Some(Value::Null) => {
            violations.push(Violation::new(
                ViolationCode::MissingField,
                "combatType",
                "combatType is required",
            ));
            None
        }
        Some(Value::String(name)) => match CombatType::from_name(name) {
            Some(t) => Some(t),
            None => {
                violations.push(Violation::new(
                    ViolationCode::InvalidCombatType,
                    "combatType",
                    format!("unknown combat type {name:?}"),
                ));
                None
            }
        },
        Some(other) => {
            violations.push(Violation::new(
                ViolationCode::InvalidType,
                "combatType",
                format!("expected a string, found {}", type_name(other)),
            ));
            None
        }
    };

    check_bool(obj, "isActive", "isActive", &mut violations);
    check_count(obj, "rounds", "rounds", &mut violations);
    check_array(obj, "combatLog", "combatLog", &mut violations);

    if let Some(mode) = combat_type {
        let key = mode.name();
        match obj.get(key) {
            None | Some(Value::Null) => violations.push(Violation::new(
                ViolationCode::MissingModeState,
                key,
                format!("{key} state is required when combatType is {key}"),
            )),
            Some(Value::Object(sub)) => {
                check_count(sub, "round", &format!("{key}.round"), &mut violations);
                check_array(sub, "roundLog", &format!("{key}.roundLog"), &mut violations);
                if mode == CombatType::Weapon {
                    check_count(
                        sub,
                        "currentRange",
                        &format!("{key}.currentRange"),
                        &mut violations,
                    );
                }
            }
            Some(other) => violations.push(Violation::new(
                ViolationCode::InvalidType,
                key,
                format!("expected an object, found {}", type_name(other)),
            )),
        }
    }

    if !violations.is_empty() {
        for v in &violations {
            tracing::warn!("Combat state violation {}", v);
        }
        return ValidationReport {
            violations,
            cleaned: None,
        };
    }

    ValidationReport {
        violations,
        cleaned: Some(clean(obj, combat_type)),
    }
}

/// Validate a typed record.
pub fn validate_record(record: &CombatStateRecord) -> ValidationReport {
    match serde_json::to_value(record) {
        Ok(value) => validate_combat_state(&value),
        Err(e) => ValidationReport {
            violations: vec![Violation::new(
                ViolationCode::InvalidType,
                "$",
                format!("record could not be serialized: {e}"),
            )],
            cleaned: None,
        },
    }
}

fn clean(obj: &Map<String, Value>, combat_type: Option<CombatType>) -> Value {
    let mut cleaned = Map::new();
    for key in ALLOWED_FIELDS {
        if let Some(value) = obj.get(*key) {
            cleaned.insert((*key).to_string(), value.clone());
        }
    }
    if let Some(mode) = combat_type {
        if let Some(sub) = obj.get(mode.name()) {
            cleaned.insert(mode.name().to_string(), sub.clone());
        }
    }
    Value::Object(cleaned)
}

fn check_bool(obj: &Map<String, Value>, key: &str, path: &str, out: &mut Vec<Violation>) {
    match obj.get(key) {
        None | Some(Value::Bool(_)) => {}
        Some(other) => out.push(Violation::new(
            ViolationCode::InvalidType,
            path,
            format!("expected a boolean, found {}", type_name(other)),
        )),
    }
}

fn check_count(obj: &Map<String, Value>, key: &str, path: &str, out: &mut Vec<Violation>) {
    match obj.get(key) {
        None => {}
        Some(Value::Number(n)) => {
            if n.as_f64().is_some_and(|v| v < 0.0) {
                out.push(Violation::new(
                    ViolationCode::NegativeValue,
                    path,
                    format!("{key} must not be negative, found {n}"),
                ));
            }
        }
        Some(other) => out.push(Violation::new(
            ViolationCode::InvalidType,
            path,
            format!("expected a number, found {}", type_name(other)),
        )),
    }
}

fn check_array(obj: &Map<String, Value>, key: &str, path: &str, out: &mut Vec<Violation>) {
    match obj.get(key) {
        None | Some(Value::Array(_)) => {}
        Some(other) => out.push(Violation::new(
            ViolationCode::InvalidType,
            path,
            format!("expected an ordered list, found {}", type_name(other)),
        )),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
