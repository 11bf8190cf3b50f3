//! Data model for the prompt engine.

pub mod content;
pub mod lore;
pub mod message;
pub mod preset;
pub mod role;
pub mod rule;
pub mod stages;

pub use content::{ContentItem, ItemStages};
pub use lore::{ActivationMode, LoreBook, LoreEntry, LoreSource, SelectiveLogic};
pub use message::{ChatMessage, FileData, InlineData, MessageBody, Segment};
pub use preset::{BlockPosition, Character, Preset, PresetBlock};
pub use role::Role;
pub use rule::{MacroMode, RegexRule, RuleTarget, RuleView};
pub use stages::Stages;
