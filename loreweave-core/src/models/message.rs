use serde::{Deserialize, Serialize};

use super::role::Role;

/// Inline binary payload inside a segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// External file reference inside a segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

/// One ordered piece of a segment-shaped message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segment {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    FileData {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
}

/// The two internal message shapes as a discriminated union. Consumers
/// match the discriminant exhaustively instead of probing field presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageBody {
    Segments { segments: Vec<Segment> },
    Flat { content: String },
}

/// A chat message in the engine's internal representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub body: MessageBody,
}

impl ChatMessage {
    /// A segment-shaped message holding a single text segment.
    pub fn from_text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            name: None,
            body: MessageBody::Segments {
                segments: vec![Segment::Text { text: text.into() }],
            },
        }
    }

    /// Concatenated text of the message. Non-text segments render empty.
    pub fn text(&self) -> String {
        match &self.body {
            MessageBody::Flat { content } => content.clone(),
            MessageBody::Segments { segments } => segments
                .iter()
                .map(|s| match s {
                    Segment::Text { text } => text.as_str(),
                    Segment::InlineData { .. } | Segment::FileData { .. } => "",
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_joins_segments_and_skips_binary() {
        let msg = ChatMessage {
            role: Role::User,
            name: None,
            body: MessageBody::Segments {
                segments: vec![
                    Segment::Text {
                        text: "a".to_string(),
                    },
                    Segment::InlineData {
                        inline_data: InlineData {
                            mime_type: "image/png".to_string(),
                            data: "...".to_string(),
                        },
                    },
                    Segment::Text {
                        text: "b".to_string(),
                    },
                ],
            },
        };
        assert_eq!(msg.text(), "ab");
    }

    #[test]
    fn body_shapes_serialize_distinctly() {
        let seg = ChatMessage::from_text(Role::User, "hi");
        let v = serde_json::to_value(&seg).unwrap();
        assert!(v.get("segments").is_some());

        let flat = ChatMessage {
            role: Role::Model,
            name: None,
            body: MessageBody::Flat {
                content: "hi".to_string(),
            },
        };
        let v = serde_json::to_value(&flat).unwrap();
        assert_eq!(v["content"], "hi");
    }
}
