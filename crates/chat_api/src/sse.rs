use serde_json::Value;

use crate::error::{ChatApiError, ErrorPayload};
use crate::events::ChatStreamEvent;

const DONE_SENTINEL: &str = "[DONE]";

/// Incremental parser for SSE text streams.
///
/// Bytes are buffered until a full frame (terminated by a blank line) is
/// available, so frames and multi-byte characters may be split arbitrarily
/// across network chunks.
#[derive(Debug, Default)]
pub struct SseStreamParser {
    buffer: Vec<u8>,
}

impl SseStreamParser {
    /// Feed arbitrary bytes into the parser and drain complete events.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<ChatStreamEvent>, ChatApiError> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();

        while let Some((end, separator_len)) = find_frame_end(&self.buffer) {
            let frame: Vec<u8> = self.buffer.drain(..end + separator_len).collect();
            let frame = String::from_utf8_lossy(&frame[..end]);

            if let Some(payload) = extract_data_payload(&frame) {
                events.extend(map_payload(&payload)?);
            }
        }

        Ok(events)
    }

    /// Flush a trailing frame that was not terminated by a blank line.
    pub fn finish(&mut self) -> Result<Vec<ChatStreamEvent>, ChatApiError> {
        if self.is_empty_buffer() {
            self.buffer.clear();
            return Ok(Vec::new());
        }

        let frame = std::mem::take(&mut self.buffer);
        let frame = String::from_utf8_lossy(&frame);
        match extract_data_payload(&frame) {
            Some(payload) => map_payload(&payload),
            None => Ok(Vec::new()),
        }
    }

    /// Parse a complete SSE payload string in one shot.
    pub fn parse_frames(input: &str) -> Result<Vec<ChatStreamEvent>, ChatApiError> {
        let mut parser = Self::default();
        let mut events = parser.feed(input.as_bytes())?;
        events.extend(parser.finish()?);
        Ok(events)
    }

    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.iter().all(u8::is_ascii_whitespace)
    }
}

fn find_frame_end(buffer: &[u8]) -> Option<(usize, usize)> {
    let lf = buffer.windows(2).position(|window| window == b"\n\n");
    let crlf = buffer.windows(4).position(|window| window == b"\r\n\r\n");

    match (lf, crlf) {
        (Some(lf), Some(crlf)) if crlf < lf => Some((crlf, 4)),
        (Some(lf), _) => Some((lf, 2)),
        (None, Some(crlf)) => Some((crlf, 4)),
        (None, None) => None,
    }
}

fn extract_data_payload(frame: &str) -> Option<String> {
    let data_lines: Vec<&str> = frame
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect();

    if data_lines.is_empty() {
        None
    } else {
        Some(data_lines.join("\n"))
    }
}

fn map_payload(payload: &str) -> Result<Vec<ChatStreamEvent>, ChatApiError> {
    if payload == DONE_SENTINEL {
        return Ok(vec![ChatStreamEvent::Done]);
    }

    let value: Value = serde_json::from_str(payload)
        .map_err(|error| ChatApiError::MalformedSse(format!("{error}: {payload}")))?;

    if value.get("error").is_some_and(|error| !error.is_null()) {
        return Ok(vec![map_error(value)]);
    }

    let mut events = Vec::new();
    let choices = value
        .get("choices")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for choice in choices {
        let delta = choice
            .get("delta")
            .and_then(|delta| delta.get("content"))
            .and_then(Value::as_str)
            .unwrap_or("");
        if !delta.is_empty() {
            events.push(ChatStreamEvent::ContentDelta {
                delta: delta.to_owned(),
            });
        }

        if let Some(reason) = choice.get("finish_reason").and_then(Value::as_str) {
            events.push(ChatStreamEvent::Finished {
                reason: reason.to_owned(),
            });
        }
    }

    Ok(events)
}

fn map_error(value: Value) -> ChatStreamEvent {
    match serde_json::from_value::<ErrorPayload>(value) {
        Ok(ErrorPayload { value: Some(fields) }) => ChatStreamEvent::Error {
            code: fields.code_string(),
            message: fields.message_or_fallback(),
        },
        _ => ChatStreamEvent::Error {
            code: None,
            message: None,
        },
    }
}
