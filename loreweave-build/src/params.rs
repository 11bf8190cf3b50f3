//! Build inputs and outputs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use loreweave_activation::VectorSearch;
use loreweave_convert::{StageOutput, WireFormat};
use loreweave_core::constants::{DEFAULT_RECENT_HISTORY_WINDOW, DEFAULT_RECURSION_LIMIT};
use loreweave_core::models::{
    ChatMessage, Character, ContentItem, ItemStages, LoreEntry, Preset, RegexRule, RuleView,
    Stages,
};
use loreweave_core::variables::VariableContext;

/// What happens to system-role messages at the output boundary.
///
/// Applied to a copy during output conversion only; the internal stages
/// always keep their roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemRolePolicy {
    Keep,
    ToUser,
}

/// Caller-wide inputs that are not bound to a preset or character: raw
/// lore JSON and raw rule JSON, in any shape the normalizers accept.
#[derive(Debug, Clone, Default)]
pub struct GlobalInputs {
    pub lore: Option<Value>,
    pub rules: Option<Value>,
}

/// Tuning knobs for one build.
pub struct BuildOptions<'a> {
    /// How many of the most recent history items feed the lore-matching
    /// context text.
    pub recent_history_window: usize,
    /// Raw lore position string → preset block identifier.
    pub position_map: Option<HashMap<String, String>>,
    pub vector_search: Option<&'a dyn VectorSearch>,
    pub recursion_limit: usize,
    /// Probability-roll source; `None` uses the thread RNG.
    pub rng: Option<Box<dyn FnMut() -> f64 + Send + 'a>>,
    pub default_case_sensitive: bool,
}

impl Default for BuildOptions<'_> {
    fn default() -> Self {
        Self {
            recent_history_window: DEFAULT_RECENT_HISTORY_WINDOW,
            position_map: None,
            vector_search: None,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            rng: None,
            default_case_sensitive: false,
        }
    }
}

/// Everything one build needs.
pub struct BuildParams<'a> {
    pub preset: &'a Preset,
    pub character: Option<&'a Character>,
    pub globals: GlobalInputs,
    pub history: &'a [ChatMessage],
    /// The audience this build renders for.
    pub view: RuleView,
    pub output_format: WireFormat,
    pub system_role_policy: SystemRolePolicy,
    /// Plain key macros. The caller's map wins over derived entries.
    pub macros: HashMap<String, String>,
    /// Seed for the local variable scope.
    pub variables: HashMap<String, Value>,
    /// Seed for the global variable scope.
    pub global_variables: HashMap<String, Value>,
    pub options: BuildOptions<'a>,
}

impl<'a> BuildParams<'a> {
    pub fn new(preset: &'a Preset, history: &'a [ChatMessage], view: RuleView) -> Self {
        Self {
            preset,
            character: None,
            globals: GlobalInputs::default(),
            history,
            view,
            output_format: WireFormat::Segments,
            system_role_policy: SystemRolePolicy::Keep,
            macros: HashMap::new(),
            variables: HashMap::new(),
            global_variables: HashMap::new(),
            options: BuildOptions::default(),
        }
    }
}

/// Every retained stage sequence of one build.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStages {
    /// Provenance-tagged items, the richest view.
    pub tagged: Stages<Vec<ContentItem>>,
    /// Segment-shaped messages, before any system-role policy.
    pub internal: Stages<Vec<ChatMessage>>,
    /// The requested wire shape, policy applied.
    pub output: Stages<StageOutput>,
    pub per_item: Vec<ItemStages>,
}

/// The outcome of one build.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildResult {
    pub output_format: WireFormat,
    pub system_role_policy: SystemRolePolicy,
    /// Activated lore in final order.
    pub active_lore: Vec<LoreEntry>,
    /// The merged rule list the pipeline ran with.
    pub merged_rules: Vec<RegexRule>,
    /// Final variable maps, for caller-managed persistence.
    pub variables: VariableContext,
    pub stages: BuildStages,
}
