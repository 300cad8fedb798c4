use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;

#[derive(Debug)]
pub enum ChatApiError {
    MissingApiKey,
    InvalidHeader(String),
    EmptyConversation,
    Request(reqwest::Error),
    Status(StatusCode, String),
    MalformedSse(String),
    Serde(JsonError),
    RetryExhausted {
        attempts: u32,
        last_error: Option<String>,
    },
    StreamFailed {
        code: Option<String>,
        message: String,
    },
    Cancelled,
    Aborted,
    Unknown(String),
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(rename = "error")]
    pub value: Option<ErrorPayloadFields>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayloadFields {
    pub message: Option<String>,
    pub code: Option<serde_json::Value>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
}

impl ErrorPayloadFields {
    pub fn code_string(&self) -> Option<String> {
        match self.code.as_ref() {
            Some(serde_json::Value::String(code)) if !code.is_empty() => Some(code.clone()),
            Some(serde_json::Value::Number(code)) => Some(code.to_string()),
            _ => self.type_.clone().filter(|value| !value.is_empty()),
        }
    }

    pub fn message_or_fallback(&self) -> Option<String> {
        let explicit = self.message.as_deref().and_then(non_empty_string)?;
        Some(explicit.to_owned())
    }
}

impl fmt::Display for ChatApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "API key is required"),
            Self::InvalidHeader(message) => write!(f, "invalid header: {message}"),
            Self::EmptyConversation => write!(f, "cannot send an empty conversation"),
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Status(status, message) => write!(f, "HTTP {status} {message}"),
            Self::MalformedSse(message) => write!(f, "malformed SSE event: {message}"),
            Self::Serde(error) => write!(f, "serialization error: {error}"),
            Self::RetryExhausted {
                attempts,
                last_error,
            } => {
                let last_error = last_error.as_deref().unwrap_or("n/a");
                write!(
                    f,
                    "rate limited: retry exhausted after {attempts} attempts (last_error: {last_error})"
                )
            }
            Self::StreamFailed { code, message } => match code {
                Some(code) if !code.trim().is_empty() => {
                    write!(f, "stream failed ({code}): {message}")
                }
                _ => write!(f, "stream failed: {message}"),
            },
            Self::Cancelled => write!(f, "request was cancelled"),
            Self::Aborted => write!(f, "stream stopped by event handler"),
            Self::Unknown(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ChatApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request(error) => Some(error),
            Self::Serde(error) => Some(error),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ChatApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for ChatApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

/// Reduce an HTTP error body to a human-readable message.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    let fallback = || {
        if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            body.to_string()
        }
    };

    let Ok(parsed) = serde_json::from_str::<ErrorPayload>(body) else {
        return fallback();
    };

    parsed
        .value
        .and_then(|error| error.message_or_fallback())
        .unwrap_or_else(fallback)
}

fn non_empty_string(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
