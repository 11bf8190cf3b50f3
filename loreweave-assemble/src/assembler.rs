use std::collections::HashMap;

use tracing::debug;

use loreweave_core::constants::{
    CHAT_HISTORY_IDENTIFIER, DEFAULT_POSITION_MAP, LORE_INJECTION_SEQ_BASE,
};
use loreweave_core::models::{
    BlockPosition, ContentItem, LoreEntry, PresetBlock, Role, RuleTarget,
};

/// One linear chat history node, already reduced to role + text.
#[derive(Debug, Clone)]
pub struct HistoryNode {
    pub role: Role,
    pub text: String,
    /// Distance from the end of the history (0 = most recent).
    pub history_depth: Option<usize>,
}

/// Inputs for one assembly run.
pub struct AssembleParams<'a> {
    pub preset_blocks: &'a [PresetBlock],
    /// Activation result, already in final order.
    pub active_entries: &'a [LoreEntry],
    pub chat_history: &'a [HistoryNode],
    /// Raw lore position string → preset block identifier. `None` uses the
    /// default map; unmapped strings must equal the identifier verbatim.
    pub position_map: Option<&'a HashMap<String, String>>,
    /// Identifier of the chat-history placeholder block.
    pub chat_history_identifier: Option<&'a str>,
}

struct Injection {
    item: ContentItem,
    depth: f64,
    order: f64,
    seq: usize,
}

fn lore_item(entry: &LoreEntry) -> ContentItem {
    ContentItem {
        tag: format!("Lore: {}", entry.name),
        role: entry.role.unwrap_or(Role::System),
        text: entry.content.clone(),
        target: RuleTarget::WorldBook,
        history_depth: None,
    }
}

fn history_target(role: Role) -> RuleTarget {
    match role {
        Role::User => RuleTarget::UserInput,
        Role::Model => RuleTarget::AiOutput,
        Role::System => RuleTarget::SlashCommands,
    }
}

/// Merge preset blocks, activated lore, and chat history into one ordered
/// item sequence.
///
/// True history items keep their relative order; injections only ever
/// insert between them. Each injection lands at
/// `max(0, current_len - depth)` where `current_len` is the dialogue
/// length at the moment of that insertion.
pub fn assemble(params: &AssembleParams<'_>) -> Vec<ContentItem> {
    let default_map: HashMap<String, String> = DEFAULT_POSITION_MAP
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let position_map = params.position_map.unwrap_or(&default_map);
    let chat_history_identifier = params
        .chat_history_identifier
        .unwrap_or(CHAT_HISTORY_IDENTIFIER);

    let enabled: Vec<&PresetBlock> = params.preset_blocks.iter().filter(|b| b.enabled).collect();

    let mut result: Vec<ContentItem> = Vec::new();

    for block in enabled.iter().filter(|b| b.position == BlockPosition::Relative) {
        // Slot lore entries mapped onto this block. Fixed entries never
        // slot-match; they go through the injection path below.
        let mut slot_entries: Vec<&LoreEntry> = params
            .active_entries
            .iter()
            .filter(|e| {
                if e.is_fixed() {
                    return false;
                }
                let mapped = position_map
                    .get(&e.position)
                    .map(String::as_str)
                    .unwrap_or(e.position.as_str());
                mapped == block.identifier
            })
            .collect();
        slot_entries.sort_by(|a, b| a.order.total_cmp(&b.order));

        for entry in &slot_entries {
            result.push(lore_item(entry));
        }

        if block.identifier == chat_history_identifier {
            let mut dialogue: Vec<ContentItem> = params
                .chat_history
                .iter()
                .map(|node| ContentItem {
                    tag: format!("History: {}", node.role),
                    role: node.role,
                    text: node.text.clone(),
                    target: history_target(node.role),
                    history_depth: node.history_depth,
                })
                .collect();

            for injection in gather_injections(&enabled, params.active_entries) {
                let len = dialogue.len();
                let at = ((len as f64) - injection.depth).max(0.0) as usize;
                dialogue.insert(at.min(len), injection.item);
            }

            debug!(items = dialogue.len(), "chat history block assembled");
            result.append(&mut dialogue);
            continue;
        }

        if !block.content.is_empty() {
            result.push(ContentItem {
                tag: format!("Preset: {}", block.name),
                role: Role::normalize(&block.role, Role::System),
                text: block.content.clone(),
                target: RuleTarget::SlashCommands,
                history_depth: None,
            });
        }
    }

    debug!(items = result.len(), "assembly complete");
    result
}

/// Fixed-position candidates in splice order: (depth asc, order asc, then
/// a synthetic sequence keeping presets before lore at equal depth/order).
/// Candidates missing a finite depth or order are dropped.
fn gather_injections(
    enabled_blocks: &[&PresetBlock],
    active_entries: &[LoreEntry],
) -> Vec<Injection> {
    let mut injections: Vec<Injection> = Vec::new();

    for (seq, block) in enabled_blocks
        .iter()
        .filter(|b| b.position == BlockPosition::Fixed)
        .enumerate()
    {
        let (Some(depth), Some(order)) = (block.depth, block.order) else {
            continue;
        };
        if !depth.is_finite() || !order.is_finite() {
            continue;
        }
        injections.push(Injection {
            item: ContentItem {
                tag: format!("Preset: {}", block.name),
                role: Role::normalize(&block.role, Role::System),
                text: block.content.clone(),
                target: RuleTarget::SlashCommands,
                history_depth: None,
            },
            depth,
            order,
            seq,
        });
    }

    for (seq, entry) in active_entries.iter().filter(|e| e.is_fixed()).enumerate() {
        if !entry.depth.is_finite() || !entry.order.is_finite() {
            continue;
        }
        injections.push(Injection {
            item: lore_item(entry),
            depth: entry.depth,
            order: entry.order,
            seq: LORE_INJECTION_SEQ_BASE + seq,
        });
    }

    injections.sort_by(|a, b| {
        a.depth
            .total_cmp(&b.depth)
            .then(a.order.total_cmp(&b.order))
            .then(a.seq.cmp(&b.seq))
    });
    injections
}
