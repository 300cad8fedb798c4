//! External editor collaborator.
//!
//! The seed text is written to a temporary file, `$EDITOR` is run on it with
//! the terminal attached, and the file is read back once the editor exits.
//! The temporary file is removed when the guard drops, on every exit path.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::process::{Command, ExitStatus};
use std::sync::atomic::Ordering;
use std::time::Duration;

use chat_api::CancellationSignal;
use thiserror::Error;
use wait_timeout::ChildExt;

pub const EDITOR_ENV: &str = "EDITOR";
pub const FALLBACK_EDITOR: &str = "vi";

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub trait Editor {
    /// Return the edited text, exactly as the user saved it.
    fn edit(&mut self, seed: &str) -> Result<String, EditorError>;
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("editor command is empty")]
    EmptyCommand,

    #[error("failed to prepare editor buffer: {0}")]
    Buffer(#[source] io::Error),

    #[error("failed to launch editor '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed waiting for editor '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("editor '{program}' exited unsuccessfully ({status})")]
    Status { program: String, status: ExitStatus },

    #[error("editor was cancelled")]
    Cancelled,

    #[error("failed to read editor buffer: {0}")]
    Read(#[source] io::Error),
}

/// Editor backed by an external program such as `vim` or `code --wait`.
#[derive(Debug, Clone)]
pub struct ExternalEditor {
    program: String,
    args: Vec<String>,
    cancellation: Option<CancellationSignal>,
}

impl ExternalEditor {
    /// Parse a command line; words are split on whitespace.
    pub fn new(command: &str) -> Result<Self, EditorError> {
        let mut words = command.split_whitespace().map(str::to_string);
        let program = words.next().ok_or(EditorError::EmptyCommand)?;

        Ok(Self {
            program,
            args: words.collect(),
            cancellation: None,
        })
    }

    /// `$EDITOR`, or `vi` when unset or blank.
    pub fn from_env() -> Self {
        let command = env::var(EDITOR_ENV).unwrap_or_default();
        Self::new(&command).unwrap_or_else(|_| Self {
            program: FALLBACK_EDITOR.to_string(),
            args: Vec::new(),
            cancellation: None,
        })
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationSignal) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Acquire))
    }

    fn wait_for_exit(&self, child: &mut std::process::Child) -> Result<ExitStatus, EditorError> {
        loop {
            let waited = child
                .wait_timeout(WAIT_POLL_INTERVAL)
                .map_err(|source| EditorError::Wait {
                    program: self.program.clone(),
                    source,
                })?;

            if let Some(status) = waited {
                return Ok(status);
            }

            if self.is_cancelled() {
                let _ = child.kill();
                let _ = child.wait();
                return Err(EditorError::Cancelled);
            }
        }
    }
}

impl Editor for ExternalEditor {
    fn edit(&mut self, seed: &str) -> Result<String, EditorError> {
        let mut buffer = tempfile::Builder::new()
            .prefix("blue-")
            .suffix(".txt")
            .tempfile()
            .map_err(EditorError::Buffer)?;
        buffer
            .write_all(seed.as_bytes())
            .and_then(|()| buffer.flush())
            .map_err(EditorError::Buffer)?;

        tracing::debug!(program = %self.program, path = %buffer.path().display(), "opening editor");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(buffer.path())
            .spawn()
            .map_err(|source| EditorError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let status = self.wait_for_exit(&mut child)?;
        if !status.success() {
            return Err(EditorError::Status {
                program: self.program.clone(),
                status,
            });
        }

        fs::read_to_string(buffer.path()).map_err(EditorError::Read)
    }
}
