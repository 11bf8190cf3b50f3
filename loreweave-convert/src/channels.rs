//! Wire-format detection and conversion for chat histories.
//!
//! Internally every message is segment-shaped; the flat `content` shape
//! and plain text exist only at the boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use loreweave_core::errors::ConvertError;
use loreweave_core::models::{ChatMessage, ContentItem, MessageBody, Role, Segment};

/// External message shapes the boundary understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// Detect from the input's structure.
    Auto,
    /// Messages carrying an ordered `segments` list (the internal shape).
    Segments,
    /// Messages carrying a flat `content` string, with the model role
    /// spelled `assistant`.
    Flat,
    /// Provenance-tagged prompt items.
    Tagged,
    /// A bare string, or a list of strings joined by newlines.
    Text,
}

/// A message in the flat external shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub content: String,
}

/// One converted history, in whichever shape the caller asked for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StageOutput {
    Segments(Vec<ChatMessage>),
    Flat(Vec<FlatMessage>),
    Tagged(Vec<ContentItem>),
    Text(String),
}

// ── detection ─────────────────────────────────────────────────────────────

fn is_text(v: &Value) -> bool {
    match v {
        Value::String(_) => true,
        Value::Array(items) => items.iter().all(Value::is_string),
        _ => false,
    }
}

fn all_objects_with(v: &Value, keys: &[&str]) -> bool {
    match v {
        Value::Array(items) => items.iter().all(|x| {
            x.as_object()
                .is_some_and(|o| keys.iter().all(|k| o.contains_key(*k)))
        }),
        _ => false,
    }
}

/// Structure-probe the input: text, then tagged, then segments, then
/// flat. Anything unrecognized reads as segments — the internal shape is
/// the most forgiving to misread.
pub fn detect_format(input: &Value) -> WireFormat {
    if is_text(input) {
        return WireFormat::Text;
    }
    if all_objects_with(input, &["tag", "target", "text"]) {
        return WireFormat::Tagged;
    }
    if all_objects_with(input, &["role", "segments"]) {
        return WireFormat::Segments;
    }
    if all_objects_with(input, &["role", "content"]) {
        return WireFormat::Flat;
    }
    WireFormat::Segments
}

// ── inbound ───────────────────────────────────────────────────────────────

fn role_of(obj: &serde_json::Map<String, Value>, fallback: Role) -> Role {
    match obj.get("role").and_then(Value::as_str) {
        Some(raw) => Role::normalize(raw, fallback),
        None => fallback,
    }
}

fn name_of(obj: &serde_json::Map<String, Value>) -> Option<String> {
    obj.get("name")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn text_to_internal(input: &Value) -> Vec<ChatMessage> {
    let text = match input {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    };
    vec![ChatMessage::from_text(Role::User, text)]
}

fn segments_to_internal(input: &Value) -> Vec<ChatMessage> {
    let Value::Array(items) = input else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .map(|obj| {
            let role = role_of(obj, Role::User);
            let name = name_of(obj);
            let body = match obj.get("segments") {
                Some(v) => match serde_json::from_value::<Vec<Segment>>(v.clone()) {
                    Ok(segments) => MessageBody::Segments { segments },
                    Err(_) => MessageBody::Segments { segments: Vec::new() },
                },
                // A flat message slipped into a segment history: lift it.
                None => MessageBody::Segments {
                    segments: vec![Segment::Text {
                        text: obj
                            .get("content")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                    }],
                },
            };
            ChatMessage { role, name, body }
        })
        .collect()
}

fn flat_to_internal(input: &Value) -> Vec<ChatMessage> {
    let Value::Array(items) = input else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .map(|obj| {
            let text = obj
                .get("content")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let mut msg = ChatMessage::from_text(role_of(obj, Role::User), text);
            msg.name = name_of(obj);
            msg
        })
        .collect()
}

fn tagged_to_internal(input: &Value) -> Vec<ChatMessage> {
    let Value::Array(items) = input else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .map(|obj| {
            let text = obj
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            ChatMessage::from_text(role_of(obj, Role::System), text)
        })
        .collect()
}

/// Convert any accepted history input into internal segment-shaped
/// messages, returning the shape it arrived in alongside.
pub fn messages_in(input: &Value, format: WireFormat) -> (WireFormat, Vec<ChatMessage>) {
    let detected = match format {
        WireFormat::Auto => detect_format(input),
        other => other,
    };
    debug!(?detected, "converting history input");

    let internal = match detected {
        WireFormat::Text => text_to_internal(input),
        WireFormat::Tagged => tagged_to_internal(input),
        WireFormat::Flat => flat_to_internal(input),
        WireFormat::Segments | WireFormat::Auto => segments_to_internal(input),
    };
    (detected, internal)
}

// ── outbound ──────────────────────────────────────────────────────────────

fn to_flat(internal: &[ChatMessage]) -> Vec<FlatMessage> {
    internal
        .iter()
        .map(|m| FlatMessage {
            role: match m.role {
                Role::Model => "assistant".to_string(),
                other => other.as_str().to_string(),
            },
            name: m.name.clone(),
            content: m.text(),
        })
        .collect()
}

fn to_text(internal: &[ChatMessage]) -> String {
    internal
        .iter()
        .map(ChatMessage::text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Convert internal messages to the requested external shape.
///
/// `Tagged` fails: tag and target provenance is lost once items become
/// plain messages, so callers wanting tagged output must keep the tagged
/// assembly stage instead of converting backwards.
pub fn messages_out(
    internal: &[ChatMessage],
    format: WireFormat,
) -> Result<StageOutput, ConvertError> {
    match format {
        WireFormat::Segments | WireFormat::Auto => Ok(StageOutput::Segments(internal.to_vec())),
        WireFormat::Flat => Ok(StageOutput::Flat(to_flat(internal))),
        WireFormat::Text => Ok(StageOutput::Text(to_text(internal))),
        WireFormat::Tagged => Err(ConvertError::TaggedUnsupported),
    }
}
