use serde::{Deserialize, Serialize};

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
/// Default completion token budget.
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// One `{role, content}` entry of the request's `messages` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Request payload for the chat completions endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub max_tokens: u32,
    /// Default: true. The client forces this on before sending.
    #[serde(default = "default_true")]
    pub stream: bool,
    pub messages: Vec<ChatMessage>,
}

fn default_true() -> bool {
    true
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, max_tokens: u32, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            stream: true,
            messages,
        }
    }
}

impl Default for ChatRequest {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL, DEFAULT_MAX_TOKENS, Vec::new())
    }
}
