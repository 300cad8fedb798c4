//! Transport-only chat completions client primitives.
//!
//! This crate owns request building, rate-limit retry, and SSE response
//! parsing for the chat completions endpoint. It knows nothing about the
//! conversation store, inline directives, or terminal rendering; callers hand
//! it an ordered message list and a handler for incremental output.
//!
//! Only an explicit `429 Too Many Requests`
//! response is retried, on the exponential schedule described by
//! [`Backoff`]. Every other failure surfaces immediately.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod payload;
pub mod retry;
pub mod sse;
pub mod url;

pub use client::{CancellationSignal, ChatApiClient, StreamResult};
pub use config::ChatApiConfig;
pub use error::ChatApiError;
pub use events::ChatStreamEvent;
pub use payload::{ChatMessage, ChatRequest, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
pub use retry::Backoff;
pub use sse::SseStreamParser;
pub use url::{normalize_chat_url, DEFAULT_CHAT_BASE_URL};
