use serde::{Deserialize, Serialize};

use super::role::Role;
use super::rule::RuleTarget;

/// One assembled prompt item, tagged with its provenance.
///
/// Pipeline stages produce fresh copies; earlier-stage items are retained,
/// never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    /// Human-readable provenance, e.g. `Lore: ruins` or `History: user`.
    pub tag: String,
    pub role: Role,
    pub text: String,
    pub target: RuleTarget,
    /// Distance from the end of the real history (0 = most recent).
    /// Present only on true history items; injected items never carry it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_depth: Option<usize>,
}

/// The four retained text snapshots of a single item, with its identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStages {
    pub tag: String,
    pub role: Role,
    pub target: RuleTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_depth: Option<usize>,

    pub raw: String,
    pub after_pre_regex: String,
    pub after_macro: String,
    pub after_post_regex: String,
}
