//! Conversation loop: read a turn, run directives, send, record the reply.

use std::io;

use message_store::{MessageStore, Role};
use thiserror::Error;

use crate::directive::trim_line_breaks;
use crate::editor::{Editor, EditorError};
use crate::interrupt::InterruptState;
use crate::input::InputSource;
use crate::pipeline::{CommandPipeline, PipelineError, Readiness};
use crate::sink::OutputSink;
use crate::transport::{CompletionTransport, TransportError};

#[derive(Debug, Error)]
pub enum TurnError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("failed to read input: {0}")]
    Input(#[source] io::Error),

    #[error("failed to report error: {0}")]
    Report(#[source] io::Error),
}

/// How a processed turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The conversation was sent and this reply came back.
    Replied(String),
    /// Nothing was sent: a local command consumed the turn, or no messages
    /// were left to send.
    Local,
}

pub struct ConversationSession<I, E, T, S> {
    store: MessageStore,
    input: I,
    editor: E,
    transport: T,
    sink: S,
    interrupts: InterruptState,
}

impl<I, E, T, S> ConversationSession<I, E, T, S>
where
    I: InputSource,
    E: Editor,
    T: CompletionTransport,
    S: OutputSink,
{
    pub fn new(input: I, editor: E, transport: T, sink: S) -> Self {
        Self {
            store: MessageStore::new(),
            input,
            editor,
            transport,
            sink,
            interrupts: InterruptState::new(),
        }
    }

    #[must_use]
    pub fn with_interrupts(mut self, interrupts: InterruptState) -> Self {
        self.interrupts = interrupts;
        self
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    /// Open the editor on an empty buffer to write a one-shot prompt.
    ///
    /// Counts as a turn, so an interrupt cancels the editor and its buffer is
    /// cleaned up instead of the process exiting underneath it.
    pub fn compose(&mut self) -> Result<String, EditorError> {
        let _turn = self.interrupts.begin_turn();
        self.editor.edit("")
    }

    /// Interactive loop. Returns once the input source yields an empty turn.
    ///
    /// Turn failures are reported through the sink and the loop continues
    /// with history intact; only input and reporting failures end it.
    pub fn run(&mut self) -> Result<(), TurnError> {
        loop {
            let raw = self.input.read_turn().map_err(TurnError::Input)?;
            if raw.is_empty() {
                tracing::debug!(messages = self.store.len(), "input finished; ending session");
                return Ok(());
            }

            if let Err(error) = self.process_turn(&raw) {
                tracing::debug!(%error, "turn failed");
                self.sink
                    .report(&error.to_string())
                    .map_err(TurnError::Report)?;
            }
        }
    }

    /// Process one raw turn: append it, run directives, and send when ready.
    pub fn process_turn(&mut self, raw: &str) -> Result<TurnOutcome, TurnError> {
        let _turn = self.interrupts.begin_turn();

        let content = trim_line_breaks(raw);
        if let Err(error) = self.store.append(Role::User, content) {
            tracing::warn!(%error, "user input not recorded");
        }

        let readiness = CommandPipeline::new(&mut self.editor, &mut self.sink)
            .process(&mut self.store)?;
        if readiness == Readiness::Aborted || self.store.is_empty() {
            return Ok(TurnOutcome::Local);
        }

        let cancellation = self.interrupts.cancellation();
        let reply = self
            .transport
            .stream(self.store.list(), &mut self.sink, &cancellation)?;

        if !reply.is_empty() {
            if let Err(error) = self.store.append(Role::Assistant, reply.clone()) {
                tracing::warn!(%error, "assistant reply not recorded");
            }
        }

        Ok(TurnOutcome::Replied(reply))
    }
}
