//! # loreweave-core
//!
//! Foundation crate for the loreweave prompt engine.
//! Defines all types, errors, constants, and the variable store.
//! Every other crate in the workspace depends on this.

pub mod constants;
pub mod errors;
pub mod models;
pub mod variables;

// Re-export the most commonly used types at the crate root.
pub use errors::{BuildError, ConvertError, VectorSearchError};
pub use models::{
    ActivationMode, BlockPosition, ChatMessage, Character, ContentItem, ItemStages, LoreBook,
    LoreEntry, LoreSource, MacroMode, MessageBody, Preset, PresetBlock, RegexRule, Role,
    RuleTarget, RuleView, Segment, SelectiveLogic, Stages,
};
pub use variables::{VariableContext, VariableScope};
