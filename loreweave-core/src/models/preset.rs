use serde::{Deserialize, Serialize};

use super::lore::LoreBook;
use super::rule::RegexRule;

/// Where a preset block lands in the assembled prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockPosition {
    /// Emitted in declaration order as part of the prompt skeleton.
    Relative,
    /// Injected into the chat history at `depth`, never emitted as a slot.
    Fixed,
}

/// One reusable prompt block inside a preset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetBlock {
    pub identifier: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Raw role string; normalized at assembly time (system fallback).
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
    /// Injection depth. A fixed block missing it never injects.
    #[serde(default)]
    pub depth: Option<f64>,
    /// Injection order. A fixed block missing it never injects.
    #[serde(default)]
    pub order: Option<f64>,
    pub position: BlockPosition,
    /// Opaque passthrough fields.
    #[serde(default, rename = "other")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A preset: ordered prompt blocks plus the rules it ships with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub blocks: Vec<PresetBlock>,
    #[serde(default)]
    pub rules: Vec<RegexRule>,
    /// Opaque settings blob; the engine never interprets it.
    #[serde(default)]
    pub settings: serde_json::Value,
}

/// A character card: the lore pool and rules bound to one character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub lore_book: Option<LoreBook>,
    #[serde(default)]
    pub rules: Vec<RegexRule>,
    /// Canned opening messages; carried for callers, unused by the engine.
    #[serde(default)]
    pub first_messages: Vec<String>,
    /// Opaque passthrough fields.
    #[serde(default, rename = "other")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_true() -> bool {
    true
}
