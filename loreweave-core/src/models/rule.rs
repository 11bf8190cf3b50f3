use serde::{Deserialize, Serialize};

/// What kind of assembled item a rule may rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleTarget {
    /// A user history item.
    UserInput,
    /// A model history item.
    AiOutput,
    /// A preset block or non-user/model history item.
    SlashCommands,
    /// An activated lore entry.
    WorldBook,
    /// Reasoning content.
    Reasoning,
}

/// The audience a rewrite applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleView {
    /// Display-bound text.
    User,
    /// Model-bound text.
    Model,
}

/// How macro tokens inside the find pattern are substituted before the
/// pattern compiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacroMode {
    /// Tokens are left untouched.
    None,
    /// Tokens become the literal macro value.
    Raw,
    /// Tokens become the macro value with regex metacharacters escaped.
    Escaped,
}

/// An ordered, filtered text-rewrite rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegexRule {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Bare pattern source, or a `/source/flags` literal.
    #[serde(rename = "findRegex")]
    pub find_pattern: String,
    #[serde(default, rename = "replaceRegex")]
    pub replace_template: String,
    /// Literal substrings removed from each match before substitution.
    #[serde(default, rename = "trimRegex")]
    pub trim: Vec<String>,
    /// Empty list disables the rule.
    #[serde(default)]
    pub targets: Vec<RuleTarget>,
    /// Empty list disables the rule.
    #[serde(default, rename = "view")]
    pub views: Vec<RuleView>,
    /// Editor-side flag; carried but never read by the engine.
    #[serde(default, rename = "runOnEdit")]
    pub run_on_edit: bool,
    #[serde(default = "default_macro_mode", rename = "macroMode")]
    pub macro_mode: MacroMode,
    /// History-depth lower bound; `None` or −1 means unbounded.
    #[serde(default, rename = "minDepth")]
    pub min_depth: Option<i64>,
    /// History-depth upper bound; `None` or −1 means unbounded.
    #[serde(default, rename = "maxDepth")]
    pub max_depth: Option<i64>,
}

fn default_true() -> bool {
    true
}

fn default_macro_mode() -> MacroMode {
    MacroMode::None
}
