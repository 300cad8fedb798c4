use serde::{Deserialize, Serialize};

/// Stream event emitted by the parser after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatStreamEvent {
    /// One content increment.
    ContentDelta { delta: String },
    /// A choice reported why it stopped generating.
    Finished { reason: String },
    /// The `[DONE]` sentinel. Terminal; never carries content.
    Done,
    /// An error object delivered inside the stream.
    Error {
        code: Option<String>,
        message: Option<String>,
    },
}
