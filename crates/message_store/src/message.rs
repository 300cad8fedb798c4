use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MessageStoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    System,
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::System => "system",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roles are matched case-insensitively; surrounding whitespace is ignored.
impl FromStr for Role {
    type Err = MessageStoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "system" => Ok(Self::System),
            "assistant" => Ok(Self::Assistant),
            _ => Err(MessageStoreError::invalid_role(value)),
        }
    }
}

/// One conversation entry. Two messages are the same message when both role
/// and content are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    #[must_use]
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self::new(self.role, content)
    }

    /// Self-describing single-line record, e.g. `{"role":"user","content":"hi"}`.
    pub fn to_record(&self) -> Result<String, MessageStoreError> {
        serde_json::to_string(self).map_err(MessageStoreError::Serialize)
    }
}
