//! Per-turn directive processing over the message store.

use std::io;

use message_store::{Message, MessageStore, MessageStoreError};
use thiserror::Error;

use crate::directive::{self, Command};
use crate::editor::{Editor, EditorError};
use crate::sink::OutputSink;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unsupported command '{0}'")]
    UnsupportedCommand(String),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),

    #[error(transparent)]
    Store(#[from] MessageStoreError),
}

/// What a turn should do once directives have run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Send,
    /// A local command consumed the turn; nothing is sent.
    Aborted,
}

impl Readiness {
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Send)
    }
}

enum Flow {
    Continue,
    Abort,
}

/// Scans every message for directives, runs their effects, and decides
/// whether the turn goes out to the completion service.
pub struct CommandPipeline<'a> {
    editor: &'a mut dyn Editor,
    sink: &'a mut dyn OutputSink,
}

impl<'a> CommandPipeline<'a> {
    pub fn new(editor: &'a mut dyn Editor, sink: &'a mut dyn OutputSink) -> Self {
        Self { editor, sink }
    }

    /// Run one pass over `store`.
    ///
    /// Messages are visited in the order they held when the pass started.
    /// Every recognized directive is stripped before its effect runs, and the
    /// strip stays in place even when the effect fails. Injected messages are
    /// appended after the scan, including when it stopped on an error; a
    /// `c:print` discards them along with the rest of the conversation.
    pub fn process(&mut self, store: &mut MessageStore) -> Result<Readiness, PipelineError> {
        let snapshot = store.list().to_vec();
        let mut injections = Vec::new();
        let mut outcome = Ok(Readiness::Send);

        for message in snapshot {
            match self.process_message(store, message, &mut injections) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Abort) => {
                    injections.clear();
                    outcome = Ok(Readiness::Aborted);
                    break;
                }
                Err(error) => {
                    outcome = Err(error);
                    break;
                }
            }
        }

        append_injections(store, injections);
        outcome
    }

    fn process_message(
        &mut self,
        store: &mut MessageStore,
        message: Message,
        injections: &mut Vec<(String, String)>,
    ) -> Result<Flow, PipelineError> {
        let mut current = message;
        // False once a strip dropped the rewrite, either because it came out
        // empty or because an identical older message already exists.
        let mut live = true;

        if let Some(found) = directive::find_injection(&current.content) {
            let stripped = current.with_content(directive::strip(&current.content, found.span));
            live = store.replace(&current, stripped.clone());
            injections.push((found.role, found.content));
            current = stripped;
        }

        let Some(found) = directive::find_command(&current.content) else {
            return Ok(Flow::Continue);
        };

        let stripped = current.with_content(directive::strip(&current.content, found.span));
        if live {
            live = store.replace(&current, stripped.clone());
        }
        current = stripped;

        tracing::debug!(command = found.command.name(), role = %current.role, "running directive");

        match found.command {
            Command::Echo => {
                self.write(&current.content)?;
                self.write("\n")?;
                Ok(Flow::Continue)
            }
            Command::Editor => {
                let edited = self.editor.edit(&current.content)?;
                if live {
                    store.replace(&current, current.with_content(edited));
                } else if !edited.is_empty() {
                    store.append(current.role, edited)?;
                }
                Ok(Flow::Continue)
            }
            Command::Print => {
                for record in store.records()? {
                    self.write(&record)?;
                    self.write("\n")?;
                }
                store.reset();
                Ok(Flow::Abort)
            }
            Command::Unsupported(name) => Err(PipelineError::UnsupportedCommand(name)),
        }
    }

    fn write(&mut self, text: &str) -> Result<(), PipelineError> {
        self.sink.write(text).map_err(PipelineError::Output)
    }
}

fn append_injections(store: &mut MessageStore, injections: Vec<(String, String)>) {
    for (role, content) in injections {
        match store.append_raw(&role, content) {
            Ok(true) => {}
            Ok(false) => tracing::debug!(%role, "injected message already present"),
            Err(error) => tracing::warn!(%role, %error, "dropping injected message"),
        }
    }
}
