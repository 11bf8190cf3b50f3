use serde::{Deserialize, Serialize};

/// Unified message role. `system` is always preserved internally;
/// downgrading it for channels that reject it happens only at the output
/// conversion boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Model,
}

impl Role {
    /// Map a raw role string onto the internal role set.
    ///
    /// `assistant` is an alias for `model`; anything unrecognized becomes
    /// the fallback.
    pub fn normalize(raw: &str, fallback: Role) -> Role {
        match raw.trim().to_ascii_lowercase().as_str() {
            "system" => Role::System,
            "user" => Role::User,
            "model" | "assistant" => Role::Model,
            _ => fallback,
        }
    }

    /// The lowercase wire name of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
