//! Input normalizers: heterogeneous caller JSON → validated core types.
//!
//! Both normalizers are total: malformed items are dropped, never
//! surfaced as errors. A dropped entry is always preferable to one that
//! silently injects at depth 0 because a field failed to parse.

use serde_json::Value;
use tracing::debug;

use loreweave_core::models::{
    ActivationMode, LoreEntry, MacroMode, RegexRule, Role, RuleTarget, RuleView, SelectiveLogic,
};

// ── shared coercions ──────────────────────────────────────────────────────

/// Loose numeric coercion: numbers pass through, numeric strings parse,
/// everything else (and every non-finite result) is the fallback.
fn coerce_number(v: Option<&Value>, fallback: f64) -> f64 {
    let n = match v {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    };
    if n.is_finite() {
        n
    } else {
        fallback
    }
}

fn coerce_bool(v: Option<&Value>, fallback: bool) -> bool {
    match v {
        Some(Value::Bool(b)) => *b,
        _ => fallback,
    }
}

/// Loose string coercion: strings pass through, scalars render, anything
/// structured is empty.
fn coerce_string(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn string_list(v: Option<&Value>) -> Vec<String> {
    match v {
        Some(Value::Array(items)) => items.iter().map(|x| coerce_string(Some(x))).collect(),
        _ => Vec::new(),
    }
}

// ── lore ──────────────────────────────────────────────────────────────────

fn parse_role(v: Option<&Value>) -> Option<Role> {
    let s = v?.as_str()?.trim();
    match s.to_ascii_lowercase().as_str() {
        "system" => Some(Role::System),
        "user" => Some(Role::User),
        "model" | "assistant" => Some(Role::Model),
        _ => None,
    }
}

fn parse_activation_mode(v: Option<&Value>) -> ActivationMode {
    match v.and_then(Value::as_str) {
        Some("always") => ActivationMode::Always,
        Some("vector") => ActivationMode::Vector,
        _ => ActivationMode::Keyword,
    }
}

fn parse_selective_logic(v: Option<&Value>) -> SelectiveLogic {
    match v.and_then(Value::as_str) {
        Some("andAll") => SelectiveLogic::AndAll,
        Some("notAny") => SelectiveLogic::NotAny,
        Some("notAll") => SelectiveLogic::NotAll,
        _ => SelectiveLogic::AndAny,
    }
}

/// Validate one raw lore entry. `None` drops it: no position, non-finite
/// index or order, or a fixed entry without a finite depth.
fn normalize_lore_entry(v: &Value) -> Option<LoreEntry> {
    let obj = v.as_object()?;

    let position = coerce_string(obj.get("position"));
    if position.is_empty() {
        return None;
    }

    let index = coerce_number(obj.get("index"), f64::NAN);
    if !index.is_finite() {
        return None;
    }

    let order = coerce_number(obj.get("order"), f64::NAN);
    if !order.is_finite() {
        return None;
    }

    let is_fixed = position == "fixed";
    let depth = coerce_number(obj.get("depth"), if is_fixed { f64::NAN } else { 0.0 });
    if is_fixed && !depth.is_finite() {
        return None;
    }

    let case_sensitive = match obj.get("caseSensitive") {
        Some(Value::Bool(b)) => Some(*b),
        _ => None,
    };

    let extra = match obj.get("other") {
        Some(Value::Object(m)) => m.clone(),
        _ => serde_json::Map::new(),
    };

    Some(LoreEntry {
        index: index as i64,
        name: coerce_string(obj.get("name")),
        content: coerce_string(obj.get("content")),
        enabled: coerce_bool(obj.get("enabled"), true),
        activation_mode: parse_activation_mode(obj.get("activationMode")),
        key: string_list(obj.get("key")),
        secondary_key: string_list(obj.get("secondaryKey")),
        selective_logic: parse_selective_logic(obj.get("selectiveLogic")),
        order,
        depth,
        position,
        role: parse_role(obj.get("role")),
        case_sensitive,
        exclude_recursion: coerce_bool(obj.get("excludeRecursion"), false),
        prevent_recursion: coerce_bool(obj.get("preventRecursion"), false),
        probability: coerce_number(obj.get("probability"), 100.0),
        extra,
    })
}

/// An array where every element is an object with a `content` field reads
/// as a bare entry array rather than an array of files.
fn is_lore_entry_array(v: &Value) -> bool {
    match v {
        Value::Array(items) => items
            .iter()
            .all(|x| x.as_object().is_some_and(|o| o.contains_key("content"))),
        _ => false,
    }
}

fn normalize_lore_file(v: &Value, out: &mut Vec<LoreEntry>) {
    if is_lore_entry_array(v) {
        if let Value::Array(items) = v {
            out.extend(items.iter().filter_map(normalize_lore_entry));
        }
        return;
    }

    // A `{ name?, enabled?, entries: [...] }` file. `enabled: false` turns
    // the whole file off.
    if let Some(obj) = v.as_object() {
        if let Some(Value::Array(entries)) = obj.get("entries") {
            if obj.get("enabled") == Some(&Value::Bool(false)) {
                debug!(name = %coerce_string(obj.get("name")), "skipping disabled lore file");
                return;
            }
            out.extend(entries.iter().filter_map(normalize_lore_entry));
        }
    }
}

/// Flatten any accepted lore input shape into validated entries.
///
/// Accepts a bare entry array, a `{name?, enabled?, entries}` file, or an
/// array mixing either form (multiple files at once).
pub fn normalize_lore(input: &Value) -> Vec<LoreEntry> {
    let mut out = Vec::new();

    match input {
        Value::Array(_) if is_lore_entry_array(input) => normalize_lore_file(input, &mut out),
        Value::Array(files) => {
            for file in files {
                normalize_lore_file(file, &mut out);
            }
        }
        Value::Object(_) => normalize_lore_file(input, &mut out),
        _ => {}
    }

    debug!(entries = out.len(), "normalized lore input");
    out
}

// ── rules ─────────────────────────────────────────────────────────────────

fn parse_target(v: &Value) -> Option<RuleTarget> {
    match v.as_str()? {
        "userInput" | "user" => Some(RuleTarget::UserInput),
        "aiOutput" | "model" | "assistant_response" => Some(RuleTarget::AiOutput),
        "slashCommands" | "preset" => Some(RuleTarget::SlashCommands),
        "worldBook" | "world_book" => Some(RuleTarget::WorldBook),
        "reasoning" => Some(RuleTarget::Reasoning),
        _ => None,
    }
}

fn parse_view(v: &Value) -> Option<RuleView> {
    match v.as_str()? {
        "user" | "user_view" => Some(RuleView::User),
        "model" | "model_view" | "assistant_view" => Some(RuleView::Model),
        _ => None,
    }
}

fn parse_macro_mode(v: Option<&Value>) -> MacroMode {
    match v.and_then(Value::as_str) {
        Some("raw") => MacroMode::Raw,
        Some("escaped") => MacroMode::Escaped,
        _ => MacroMode::None,
    }
}

fn parse_depth_bound(v: Option<&Value>) -> Option<i64> {
    match v {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    }
}

/// Validate one raw rule. Items without an id or a `findRegex` field are
/// dropped; unknown target/view spellings are dropped from their lists.
fn normalize_rule(v: &Value) -> Option<RegexRule> {
    let obj = v.as_object()?;
    if !obj.contains_key("findRegex") {
        return None;
    }

    let id = coerce_string(obj.get("id"));
    if id.is_empty() {
        return None;
    }

    let list = |key: &str| -> Vec<Value> {
        match obj.get(key) {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    };

    Some(RegexRule {
        id,
        name: coerce_string(obj.get("name")),
        enabled: obj.get("enabled") != Some(&Value::Bool(false)),
        find_pattern: coerce_string(obj.get("findRegex")),
        replace_template: coerce_string(obj.get("replaceRegex")),
        trim: string_list(obj.get("trimRegex")),
        targets: list("targets").iter().filter_map(parse_target).collect(),
        views: list("view").iter().filter_map(parse_view).collect(),
        run_on_edit: obj.get("runOnEdit") == Some(&Value::Bool(true)),
        macro_mode: parse_macro_mode(obj.get("macroMode")),
        min_depth: parse_depth_bound(obj.get("minDepth")),
        max_depth: parse_depth_bound(obj.get("maxDepth")),
    })
}

/// An array where every element looks like a rule (has both regex fields)
/// reads as a bare rule array rather than an array of files.
fn is_rule_array(v: &Value) -> bool {
    match v {
        Value::Array(items) => items.iter().all(|x| {
            x.as_object()
                .is_some_and(|o| o.contains_key("findRegex") && o.contains_key("replaceRegex"))
        }),
        _ => false,
    }
}

fn normalize_rule_file(v: &Value, out: &mut Vec<RegexRule>) {
    if is_rule_array(v) {
        if let Value::Array(items) = v {
            out.extend(items.iter().filter_map(normalize_rule));
        }
        return;
    }

    if let Some(obj) = v.as_object() {
        for key in ["regexScripts", "scripts"] {
            if let Some(Value::Array(items)) = obj.get(key) {
                out.extend(items.iter().filter_map(normalize_rule));
                return;
            }
        }
    }

    // A single bare rule object.
    if let Some(rule) = normalize_rule(v) {
        out.push(rule);
    }
}

/// Flatten any accepted rule input shape into validated rules.
///
/// Accepts a bare rule array, `{regexScripts: [...]}`, `{scripts: [...]}`,
/// a single rule object, or an array mixing any of these.
pub fn normalize_rules(input: &Value) -> Vec<RegexRule> {
    let mut out = Vec::new();

    match input {
        Value::Array(_) if is_rule_array(input) => normalize_rule_file(input, &mut out),
        Value::Array(files) => {
            for file in files {
                normalize_rule_file(file, &mut out);
            }
        }
        Value::Object(_) => normalize_rule_file(input, &mut out),
        _ => {}
    }

    debug!(rules = out.len(), "normalized rule input");
    out
}

/// Merge rule lists in pipeline order: global, then preset, then
/// character. Concatenation only; normalization happens upstream.
pub fn merge_rules(
    global: &[RegexRule],
    preset: &[RegexRule],
    character: &[RegexRule],
) -> Vec<RegexRule> {
    let mut all = Vec::with_capacity(global.len() + preset.len() + character.len());
    all.extend_from_slice(global);
    all.extend_from_slice(preset);
    all.extend_from_slice(character);
    all
}
