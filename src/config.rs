//! Startup configuration from the environment and an optional JSON file.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chat_api::{ChatApiConfig, DEFAULT_CHAT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use serde::Deserialize;
use thiserror::Error;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "BLUE_API_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY must be set to use the chat service")]
    MissingApiKey,

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// On-disk config, e.g. `{"chatgpt_api_url": "https://proxy.example/v1"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub chatgpt_api_url: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Option<Duration>,
}

impl AppConfig {
    /// Resolve the credential and base URL. The config file wins over
    /// `BLUE_API_BASE_URL`, which wins over the built-in default.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let api_key = env_string_opt(API_KEY_ENV).ok_or(ConfigError::MissingApiKey)?;

        let file = match config_file {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let base_url = file
            .chatgpt_api_url
            .filter(|value| !value.trim().is_empty())
            .or_else(|| env_string_opt(BASE_URL_ENV))
            .unwrap_or_else(|| DEFAULT_CHAT_BASE_URL.to_string());

        Ok(Self {
            api_key,
            base_url,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: None,
        })
    }

    pub fn chat_api_config(&self) -> ChatApiConfig {
        let config = ChatApiConfig::new(self.api_key.clone()).with_base_url(self.base_url.clone());
        match self.timeout {
            Some(timeout) => config.with_timeout(timeout),
            None => config,
        }
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
