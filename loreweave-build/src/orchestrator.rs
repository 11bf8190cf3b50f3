//! The whole-prompt build sequence.

use std::collections::HashMap;

use tracing::{debug, info};

use loreweave_activation::ActivationEngine;
use loreweave_assemble::{assemble, AssembleParams, HistoryNode};
use loreweave_convert::{merge_rules, messages_out, normalize_lore, normalize_rules, StageOutput, WireFormat};
use loreweave_core::errors::BuildError;
use loreweave_core::models::{ChatMessage, ContentItem, MessageBody, Role, Stages};
use loreweave_core::variables::VariableContext;
use loreweave_pipeline::{run_pipeline, PipelineParams};

use crate::params::{BuildParams, BuildResult, BuildStages, SystemRolePolicy};

/// Lift every history message into the segment shape, keeping roles and
/// names.
fn to_internal_history(history: &[ChatMessage]) -> Vec<ChatMessage> {
    history
        .iter()
        .map(|m| match &m.body {
            MessageBody::Segments { .. } => m.clone(),
            MessageBody::Flat { content } => {
                let mut msg = ChatMessage::from_text(m.role, content.clone());
                msg.name = m.name.clone();
                msg
            }
        })
        .collect()
}

/// Reduce internal messages to linear chat nodes. Depth counts from the
/// end: the most recent message has depth 0.
fn to_chat_nodes(internal: &[ChatMessage]) -> Vec<HistoryNode> {
    let n = internal.len();
    internal
        .iter()
        .enumerate()
        .map(|(idx, m)| HistoryNode {
            role: m.role,
            text: m.text(),
            history_depth: Some(n - 1 - idx),
        })
        .collect()
}

/// `char` comes from the character card; the caller's explicit map always
/// wins on collision.
fn build_macros(
    user_macros: HashMap<String, String>,
    character: Option<&loreweave_core::models::Character>,
) -> HashMap<String, String> {
    let mut out = HashMap::new();
    if let Some(c) = character {
        if !c.name.is_empty() {
            out.insert("char".to_string(), c.name.clone());
        }
    }
    out.extend(user_macros);
    out
}

fn item_to_message(item: &ContentItem) -> ChatMessage {
    ChatMessage::from_text(item.role, item.text.clone())
}

fn apply_system_role_policy(
    messages: &[ChatMessage],
    policy: SystemRolePolicy,
) -> Vec<ChatMessage> {
    match policy {
        SystemRolePolicy::Keep => messages.to_vec(),
        SystemRolePolicy::ToUser => messages
            .iter()
            .map(|m| {
                let mut m = m.clone();
                if m.role == Role::System {
                    m.role = Role::User;
                }
                m
            })
            .collect(),
    }
}

/// Run one complete build: activate lore, assemble the tagged sequence,
/// run the per-item pipeline, and convert to the requested wire shape.
///
/// The only await point is the vector-search callback; a callback failure
/// aborts the whole build.
pub async fn build_prompt(mut params: BuildParams<'_>) -> Result<BuildResult, BuildError> {
    let output_format = match params.output_format {
        WireFormat::Auto => WireFormat::Segments,
        other => other,
    };
    let policy = params.system_role_policy;

    let macros = build_macros(std::mem::take(&mut params.macros), params.character);
    let mut variables = VariableContext::seeded(
        std::mem::take(&mut params.variables),
        std::mem::take(&mut params.global_variables),
    );

    let internal_history = to_internal_history(params.history);
    let chat_nodes = to_chat_nodes(&internal_history);

    let window = params.options.recent_history_window;
    let context_text = chat_nodes[chat_nodes.len().saturating_sub(window)..]
        .iter()
        .map(|n| n.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let global_lore = params
        .globals
        .lore
        .as_ref()
        .map(normalize_lore)
        .unwrap_or_default();
    let character_lore: Vec<_> = params
        .character
        .and_then(|c| c.lore_book.as_ref())
        .map(|book| book.entries.clone())
        .unwrap_or_default();

    let mut engine = ActivationEngine::new()
        .with_recursion_limit(params.options.recursion_limit)
        .with_default_case_sensitive(params.options.default_case_sensitive);
    if let Some(vs) = params.options.vector_search {
        engine = engine.with_vector_search(vs);
    }
    if let Some(rng) = params.options.rng.take() {
        engine = engine.with_rng(rng);
    }
    let active_lore = engine
        .activate(&context_text, &global_lore, &character_lore)
        .await?;
    debug!(active = active_lore.len(), "lore activation complete");

    let items = assemble(&AssembleParams {
        preset_blocks: &params.preset.blocks,
        active_entries: &active_lore,
        chat_history: &chat_nodes,
        position_map: params.options.position_map.as_ref(),
        chat_history_identifier: None,
    });

    let global_rules = params
        .globals
        .rules
        .as_ref()
        .map(normalize_rules)
        .unwrap_or_default();
    let character_rules = params.character.map(|c| c.rules.as_slice()).unwrap_or(&[]);
    let merged_rules = merge_rules(&global_rules, &params.preset.rules, character_rules);

    let pipeline = run_pipeline(
        &items,
        &PipelineParams {
            view: params.view,
            rules: &merged_rules,
            macros: &macros,
        },
        &mut variables,
    );

    let internal: Stages<Vec<ChatMessage>> = pipeline
        .stages
        .map_ref(|items| items.iter().map(item_to_message).collect());

    // Tagged output keeps the assembly-stage items: provenance cannot be
    // reconstructed once items become plain messages.
    let output: Stages<StageOutput> = match output_format {
        WireFormat::Tagged => pipeline
            .stages
            .map_ref(|items| StageOutput::Tagged(items.clone())),
        format => {
            let policied = internal.map_ref(|msgs| apply_system_role_policy(msgs, policy));
            Stages {
                raw: messages_out(&policied.raw, format)?,
                after_pre_regex: messages_out(&policied.after_pre_regex, format)?,
                after_macro: messages_out(&policied.after_macro, format)?,
                after_post_regex: messages_out(&policied.after_post_regex, format)?,
            }
        }
    };

    info!(
        items = pipeline.per_item.len(),
        lore = active_lore.len(),
        rules = merged_rules.len(),
        "prompt build complete"
    );

    Ok(BuildResult {
        output_format,
        system_role_policy: policy,
        active_lore,
        merged_rules,
        variables,
        stages: BuildStages {
            tagged: pipeline.stages,
            internal,
            output,
            per_item: pipeline.per_item,
        },
    })
}
