//! The staged per-item pipeline and its whole-sequence driver.

use std::collections::HashMap;

use loreweave_core::models::{ContentItem, ItemStages, RegexRule, RuleView, Stages};
use loreweave_core::variables::VariableContext;

use crate::apply::apply_rules;
use crate::macros::expand_macros;

/// Shared inputs for one pipeline run.
pub struct PipelineParams<'a> {
    /// The audience this build renders for.
    pub view: RuleView,
    /// Caller-merged rule list, applied in the given order.
    pub rules: &'a [RegexRule],
    pub macros: &'a HashMap<String, String>,
}

/// All four stage sequences plus the per-item breakdown.
pub struct PipelineOutput {
    pub stages: Stages<Vec<ContentItem>>,
    pub per_item: Vec<ItemStages>,
}

/// Run one item through raw → macro → regex, retaining every snapshot.
///
/// `after_pre_regex` equals `raw`; the stage is kept so callers can
/// address the four stages uniformly.
pub fn process_item(
    item: &ContentItem,
    params: &PipelineParams<'_>,
    variables: Option<&mut VariableContext>,
) -> ItemStages {
    let raw = item.text.clone();
    let after_pre_regex = raw.clone();

    let after_macro = expand_macros(&after_pre_regex, params.macros, variables);

    let after_post_regex = apply_rules(
        &after_macro,
        params.rules,
        item.target,
        params.view,
        params.macros,
        item.history_depth,
    );

    ItemStages {
        tag: item.tag.clone(),
        role: item.role,
        target: item.target,
        history_depth: item.history_depth,
        raw,
        after_pre_regex,
        after_macro,
        after_post_regex,
    }
}

/// Process a whole assembled sequence in order, threading one variable
/// context through every item so a write during item N is visible to
/// item N+1.
pub fn run_pipeline(
    items: &[ContentItem],
    params: &PipelineParams<'_>,
    variables: &mut VariableContext,
) -> PipelineOutput {
    let mut per_item: Vec<ItemStages> = Vec::with_capacity(items.len());

    let raw: Vec<ContentItem> = items.to_vec();
    let mut after_pre_regex: Vec<ContentItem> = Vec::with_capacity(items.len());
    let mut after_macro: Vec<ContentItem> = Vec::with_capacity(items.len());
    let mut after_post_regex: Vec<ContentItem> = Vec::with_capacity(items.len());

    for item in items {
        let s = process_item(item, params, Some(&mut *variables));

        after_pre_regex.push(ContentItem {
            text: s.after_pre_regex.clone(),
            ..item.clone()
        });
        after_macro.push(ContentItem {
            text: s.after_macro.clone(),
            ..item.clone()
        });
        after_post_regex.push(ContentItem {
            text: s.after_post_regex.clone(),
            ..item.clone()
        });
        per_item.push(s);
    }

    PipelineOutput {
        stages: Stages {
            raw,
            after_pre_regex,
            after_macro,
            after_post_regex,
        },
        per_item,
    }
}
