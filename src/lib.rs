//! Terminal chat client for streaming chat-completion services.
//!
//! A turn of user input is appended to the conversation, scanned for inline
//! directives (`c:echo`, `c:editor`, `c:print`, `i:<role>:<content>`), and,
//! unless a directive consumed the turn, streamed to the completion service
//! with the reply rendered as it arrives.

pub mod cli;
pub mod config;
pub mod directive;
pub mod editor;
pub mod input;
pub mod interrupt;
pub mod logging;
pub mod pipeline;
pub mod session;
pub mod sink;
pub mod transport;

pub use config::{AppConfig, ConfigError};
pub use directive::Command;
pub use editor::{Editor, EditorError, ExternalEditor};
pub use input::{InputSource, LineInput, TerminalInput};
pub use interrupt::InterruptState;
pub use pipeline::{CommandPipeline, PipelineError, Readiness};
pub use session::{ConversationSession, TurnError, TurnOutcome};
pub use sink::{OutputSink, StdoutSink, WriterSink};
pub use transport::{ChatApiTransport, CompletionTransport, TransportError};
