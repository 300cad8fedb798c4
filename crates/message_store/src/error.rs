use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessageStoreError {
    #[error("invalid role '{0}'; expected one of user, system, assistant")]
    InvalidRole(String),

    #[error("message content must not be empty")]
    EmptyContent,

    #[error("failed to serialize message record: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl MessageStoreError {
    #[must_use]
    pub fn invalid_role(role: impl Into<String>) -> Self {
        Self::InvalidRole(role.into())
    }
}
