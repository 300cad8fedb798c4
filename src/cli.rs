use std::path::PathBuf;
use std::time::Duration;

use chat_api::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use clap::{Args, Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "blue")]
#[command(version)]
#[command(about = "Chat with a streaming completion service from the terminal")]
pub struct Cli {
    /// Log debug output to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// JSON config file, e.g. {"chatgpt_api_url": "..."}
    #[arg(long, global = true, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Starts a chat; with a prompt, runs a single turn and exits
    Chat(ChatArgs),
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ChatArgs {
    /// Model identifier sent with every request
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Maximum tokens in each reply
    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout_secs: Option<u64>,

    /// Compose the prompt in $EDITOR
    #[arg(long)]
    pub editor: bool,

    /// Prompt words for a single turn
    #[arg(value_name = "PROMPT")]
    pub prompt: Vec<String>,
}

/// How `chat` should obtain its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatMode {
    Interactive,
    Prompt(String),
    Editor,
}

impl ChatArgs {
    pub fn mode(&self) -> ChatMode {
        if !self.prompt.is_empty() {
            ChatMode::Prompt(self.prompt.join(" "))
        } else if self.editor {
            ChatMode::Editor
        } else {
            ChatMode::Interactive
        }
    }

    pub fn apply(&self, config: &mut AppConfig) {
        config.model = self.model.clone();
        config.max_tokens = self.max_tokens;
        config.timeout = self.timeout_secs.map(Duration::from_secs);
    }
}
