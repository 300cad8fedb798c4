use std::time::Duration;

use crate::retry::Backoff;
use crate::url::DEFAULT_CHAT_BASE_URL;

/// Transport configuration for chat completions requests.
#[derive(Debug, Clone)]
pub struct ChatApiConfig {
    /// Bearer credential passed in `Authorization`.
    pub api_key: String,
    /// Base URL; `/chat/completions` is appended when missing.
    pub base_url: String,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
    /// Optional per-request timeout.
    pub timeout: Option<Duration>,
    /// Rate-limit retry schedule.
    pub backoff: Backoff,
}

impl Default for ChatApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            user_agent: None,
            timeout: None,
            backoff: Backoff::default(),
        }
    }
}

impl ChatApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }
}
