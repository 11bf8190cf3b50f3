use serde::{Deserialize, Serialize};

use super::role::Role;

/// How a lore entry decides whether to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationMode {
    /// Fires unconditionally.
    Always,
    /// Fires when the context text contains one of the entry's keywords.
    Keyword,
    /// Fires when the vector-search callback returns the entry's index.
    Vector,
}

/// Secondary-keyword gate applied when the primary `key` list matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectiveLogic {
    /// Any secondary keyword present.
    AndAny,
    /// All secondary keywords present (vacuously true for an empty list).
    AndAll,
    /// No secondary keyword present.
    NotAny,
    /// Not all secondary keywords present.
    NotAll,
}

/// Which pool an entry came from. Used only as an ordering tie-break:
/// global entries sort ahead of character entries at equal `order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoreSource {
    Global,
    Character,
}

/// A conditionally injected block of background text (a world-book entry).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoreEntry {
    /// Unique within one activation run. Resolution and vector hits key on it.
    pub index: i64,
    pub name: String,
    pub content: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub activation_mode: ActivationMode,
    /// Primary keywords. Empty means `secondary_key` doubles as primary.
    #[serde(default)]
    pub key: Vec<String>,
    #[serde(default)]
    pub secondary_key: Vec<String>,
    #[serde(default = "default_selective_logic")]
    pub selective_logic: SelectiveLogic,
    /// Ascending sort key for the final activation order and for slot
    /// placement inside the assembled skeleton.
    pub order: f64,
    /// Injection depth. Meaningful only for `position == "fixed"`.
    #[serde(default)]
    pub depth: f64,
    /// Raw position string. `"fixed"` injects into the history; anything
    /// else slot-matches a preset block identifier (after mapping).
    pub position: String,
    /// Role of the injected item; `None` defaults to system.
    #[serde(default)]
    pub role: Option<Role>,
    /// `None` uses the engine-wide default case sensitivity.
    #[serde(default)]
    pub case_sensitive: Option<bool>,
    /// When set, later passes still evaluate this entry against the base
    /// context only, never the recursion context.
    #[serde(default)]
    pub exclude_recursion: bool,
    /// When set, the entry's content never feeds the recursion context.
    #[serde(default)]
    pub prevent_recursion: bool,
    /// 0–100. Out-of-range values clamp; non-finite values mean 100.
    #[serde(default = "default_probability")]
    pub probability: f64,
    /// Opaque passthrough fields.
    #[serde(default, rename = "other")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl LoreEntry {
    /// Whether this entry injects at a fixed depth rather than a slot.
    pub fn is_fixed(&self) -> bool {
        self.position == "fixed"
    }

    /// Probability normalized to [0, 100]; non-finite defaults to 100.
    pub fn normalized_probability(&self) -> f64 {
        if !self.probability.is_finite() {
            return 100.0;
        }
        self.probability.clamp(0.0, 100.0)
    }
}

/// A single lore file: a named collection of entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoreBook {
    #[serde(default)]
    pub name: String,
    pub entries: Vec<LoreEntry>,
}

fn default_true() -> bool {
    true
}

fn default_probability() -> f64 {
    100.0
}

fn default_selective_logic() -> SelectiveLogic {
    SelectiveLogic::AndAny
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(probability: f64) -> LoreEntry {
        LoreEntry {
            index: 0,
            name: String::new(),
            content: String::new(),
            enabled: true,
            activation_mode: ActivationMode::Always,
            key: Vec::new(),
            secondary_key: Vec::new(),
            selective_logic: SelectiveLogic::AndAny,
            order: 0.0,
            depth: 0.0,
            position: "afterChar".to_string(),
            role: None,
            case_sensitive: None,
            exclude_recursion: false,
            prevent_recursion: false,
            probability,
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn probability_clamps_and_defaults() {
        assert_eq!(entry(150.0).normalized_probability(), 100.0);
        assert_eq!(entry(-3.0).normalized_probability(), 0.0);
        assert_eq!(entry(f64::NAN).normalized_probability(), 100.0);
        assert_eq!(entry(42.0).normalized_probability(), 42.0);
    }
}
