use loreweave_assemble::{assemble, AssembleParams, HistoryNode};
use loreweave_core::models::{
    ActivationMode, BlockPosition, LoreEntry, PresetBlock, Role, RuleTarget, SelectiveLogic,
};

fn block(identifier: &str, position: BlockPosition) -> PresetBlock {
    PresetBlock {
        identifier: identifier.to_string(),
        name: identifier.to_string(),
        enabled: true,
        role: "system".to_string(),
        content: format!("[{identifier}]"),
        depth: None,
        order: None,
        position,
        extra: serde_json::Map::new(),
    }
}

fn lore(index: i64, position: &str, order: f64) -> LoreEntry {
    LoreEntry {
        index,
        name: format!("lore-{index}"),
        content: format!("lore text {index}"),
        enabled: true,
        activation_mode: ActivationMode::Always,
        key: Vec::new(),
        secondary_key: Vec::new(),
        selective_logic: SelectiveLogic::AndAny,
        order,
        depth: 0.0,
        position: position.to_string(),
        role: None,
        case_sensitive: None,
        exclude_recursion: false,
        prevent_recursion: false,
        probability: 100.0,
        extra: serde_json::Map::new(),
    }
}

fn history(roles: &[Role]) -> Vec<HistoryNode> {
    let n = roles.len();
    roles
        .iter()
        .enumerate()
        .map(|(i, role)| HistoryNode {
            role: *role,
            text: format!("msg {i}"),
            history_depth: Some(n - 1 - i),
        })
        .collect()
}

fn params<'a>(
    blocks: &'a [PresetBlock],
    entries: &'a [LoreEntry],
    chat: &'a [HistoryNode],
) -> AssembleParams<'a> {
    AssembleParams {
        preset_blocks: blocks,
        active_entries: entries,
        chat_history: chat,
        position_map: None,
        chat_history_identifier: None,
    }
}

// ── skeleton ──────────────────────────────────────────────────────────────

#[test]
fn relative_blocks_emit_in_declaration_order() {
    let blocks = vec![block("intro", BlockPosition::Relative), block("outro", BlockPosition::Relative)];
    let items = assemble(&params(&blocks, &[], &[]));
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].text, "[intro]");
    assert_eq!(items[1].text, "[outro]");
    assert!(items.iter().all(|i| i.target == RuleTarget::SlashCommands));
}

#[test]
fn disabled_and_empty_blocks_emit_nothing() {
    let mut disabled = block("a", BlockPosition::Relative);
    disabled.enabled = false;
    let mut empty = block("b", BlockPosition::Relative);
    empty.content = String::new();

    let items = assemble(&params(&[disabled, empty], &[], &[]));
    assert!(items.is_empty());
}

#[test]
fn fixed_blocks_never_join_the_skeleton() {
    let blocks = vec![block("pinned", BlockPosition::Fixed)];
    let items = assemble(&params(&blocks, &[], &[]));
    // No chat-history placeholder, so a fixed block has nowhere to go.
    assert!(items.is_empty());
}

// ── lore slotting ─────────────────────────────────────────────────────────

#[test]
fn slot_entries_match_through_the_position_map() {
    let blocks = vec![block("charBefore", BlockPosition::Relative)];
    // "beforeChar" maps to "charBefore" through the default map.
    let entries = vec![lore(1, "beforeChar", 0.0)];

    let items = assemble(&params(&blocks, &entries, &[]));
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].tag, "Lore: lore-1");
    assert_eq!(items[0].target, RuleTarget::WorldBook);
    assert_eq!(items[0].role, Role::System);
    assert_eq!(items[1].text, "[charBefore]");
}

#[test]
fn unmapped_positions_must_match_the_identifier_verbatim() {
    let blocks = vec![block("sidebar", BlockPosition::Relative)];
    let entries = vec![lore(1, "sidebar", 0.0), lore(2, "elsewhere", 0.0)];

    let items = assemble(&params(&blocks, &entries, &[]));
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].tag, "Lore: lore-1");
}

#[test]
fn slot_entries_sort_by_order() {
    let blocks = vec![block("sidebar", BlockPosition::Relative)];
    let entries = vec![lore(1, "sidebar", 7.0), lore(2, "sidebar", 3.0)];

    let items = assemble(&params(&blocks, &entries, &[]));
    assert_eq!(items[0].tag, "Lore: lore-2");
    assert_eq!(items[1].tag, "Lore: lore-1");
}

#[test]
fn fixed_lore_never_slot_matches() {
    let blocks = vec![block("fixed", BlockPosition::Relative)];
    let entries = vec![lore(1, "fixed", 0.0)];

    let items = assemble(&params(&blocks, &entries, &[]));
    // Only the block's own content; the entry waits for injection.
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].text, "[fixed]");
}

// ── chat history ──────────────────────────────────────────────────────────

#[test]
fn history_nodes_map_roles_to_targets_and_keep_order() {
    let blocks = vec![block("chatHistory", BlockPosition::Relative)];
    let chat = history(&[Role::User, Role::Model, Role::System, Role::User]);

    let items = assemble(&params(&blocks, &[], &chat));
    assert_eq!(items.len(), 4);
    assert_eq!(items[0].target, RuleTarget::UserInput);
    assert_eq!(items[1].target, RuleTarget::AiOutput);
    assert_eq!(items[2].target, RuleTarget::SlashCommands);
    assert_eq!(items[0].history_depth, Some(3));
    assert_eq!(items[3].history_depth, Some(0));
    assert_eq!(items[0].tag, "History: user");
}

// ── fixed injection ───────────────────────────────────────────────────────

fn fixed_block(name: &str, depth: f64, order: f64) -> PresetBlock {
    let mut b = block(name, BlockPosition::Fixed);
    b.name = name.to_string();
    b.depth = Some(depth);
    b.order = Some(order);
    b
}

fn fixed_lore(index: i64, depth: f64, order: f64) -> LoreEntry {
    let mut e = lore(index, "fixed", order);
    e.depth = depth;
    e
}

#[test]
fn injection_lands_at_len_minus_depth() {
    let blocks = vec![block("chatHistory", BlockPosition::Relative), fixed_block("inj", 2.0, 0.0)];
    let chat = history(&[Role::User, Role::Model, Role::User, Role::Model]);

    let items = assemble(&params(&blocks, &[], &chat));
    let tags: Vec<&str> = items.iter().map(|i| i.tag.as_str()).collect();
    assert_eq!(
        tags,
        vec![
            "History: user",
            "History: model",
            "Preset: inj",
            "History: user",
            "History: model"
        ]
    );
    assert_eq!(items[2].history_depth, None, "injections carry no history depth");
}

#[test]
fn depth_zero_appends_and_oversized_depth_prepends() {
    let blocks = vec![
        block("chatHistory", BlockPosition::Relative),
        fixed_block("tail", 0.0, 0.0),
        fixed_block("head", 99.0, 0.0),
    ];
    let chat = history(&[Role::User, Role::Model]);

    let items = assemble(&params(&blocks, &[], &chat));
    let tags: Vec<&str> = items.iter().map(|i| i.tag.as_str()).collect();
    // Sorted by depth ascending: "tail" (0) splices first at the end, then
    // "head" (99) clamps to index 0.
    assert_eq!(
        tags,
        vec!["Preset: head", "History: user", "History: model", "Preset: tail"]
    );
}

#[test]
fn equal_depth_injections_place_in_ascending_order() {
    let blocks = vec![
        block("chatHistory", BlockPosition::Relative),
        fixed_block("second", 2.0, 2.0),
        fixed_block("first", 2.0, 1.0),
    ];
    let chat = history(&[Role::User, Role::Model, Role::User, Role::Model]);

    let items = assemble(&params(&blocks, &[], &chat));
    let tags: Vec<&str> = items.iter().map(|i| i.tag.as_str()).collect();
    // "first" splices at 4-2=2; list grows to 5; "second" at 5-2=3, so
    // they stay adjacent in ascending order.
    assert_eq!(
        tags,
        vec![
            "History: user",
            "History: model",
            "Preset: first",
            "Preset: second",
            "History: user",
            "History: model"
        ]
    );
}

#[test]
fn equal_depth_and_order_places_preset_before_lore() {
    let blocks = vec![block("chatHistory", BlockPosition::Relative), fixed_block("p", 1.0, 5.0)];
    let entries = vec![fixed_lore(9, 1.0, 5.0)];
    let chat = history(&[Role::User, Role::Model]);

    let items = assemble(&params(&blocks, &entries, &chat));
    let tags: Vec<&str> = items.iter().map(|i| i.tag.as_str()).collect();
    assert_eq!(
        tags,
        vec!["History: user", "Preset: p", "Lore: lore-9", "History: model"]
    );
}

#[test]
fn mixed_depth_injections_use_the_length_at_each_moment() {
    let blocks = vec![
        block("chatHistory", BlockPosition::Relative),
        fixed_block("deep", 2.0, 0.0),
        fixed_block("end", 0.0, 0.0),
    ];
    let chat = history(&[Role::User, Role::Model, Role::User, Role::Model]);

    let items = assemble(&params(&blocks, &[], &chat));
    let tags: Vec<&str> = items.iter().map(|i| i.tag.as_str()).collect();
    // "end" (depth 0) splices first at index 4; the list is then 5 long,
    // so "deep" (depth 2) lands at 5-2=3, between the third history item
    // and the fourth.
    assert_eq!(
        tags,
        vec![
            "History: user",
            "History: model",
            "History: user",
            "Preset: deep",
            "History: model",
            "Preset: end"
        ]
    );
}

#[test]
fn candidates_missing_depth_or_order_are_dropped() {
    let mut no_depth = fixed_block("noDepth", 1.0, 1.0);
    no_depth.depth = None;
    let mut no_order = fixed_block("noOrder", 1.0, 1.0);
    no_order.order = None;
    let mut nan_lore = fixed_lore(3, f64::NAN, 0.0);
    nan_lore.depth = f64::NAN;

    let blocks = vec![block("chatHistory", BlockPosition::Relative), no_depth, no_order];
    let chat = history(&[Role::User]);

    let items = assemble(&params(&blocks, &[nan_lore], &chat));
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].tag, "History: user");
}
