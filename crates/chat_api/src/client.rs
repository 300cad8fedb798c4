use std::future::Future;
use std::ops::ControlFlow;
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Response};

use crate::config::ChatApiConfig;
use crate::error::{parse_error_message, ChatApiError};
use crate::events::ChatStreamEvent;
use crate::payload::ChatRequest;
use crate::retry::is_rate_limited;
use crate::sse::SseStreamParser;
use crate::url::normalize_chat_url;

/// Optional cancellation signal shared across request and stream loops.
pub type CancellationSignal = Arc<AtomicBool>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);
const DEFAULT_USER_AGENT: &str = concat!("blue/", env!("CARGO_PKG_VERSION"));

#[derive(Debug)]
pub struct ChatApiClient {
    http: Client,
    config: ChatApiConfig,
}

/// Aggregate of one streamed completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamResult {
    /// Concatenation of every content increment, in arrival order.
    pub content: String,
    /// Last `finish_reason` reported by the stream, if any.
    pub finish_reason: Option<String>,
    /// Whether the explicit `[DONE]` sentinel was seen (a clean body close
    /// also ends the stream successfully).
    pub done: bool,
}

impl ChatApiClient {
    pub fn new(config: ChatApiConfig) -> Result<Self, ChatApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ChatApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn normalized_endpoint(&self) -> String {
        normalize_chat_url(&self.config.base_url)
    }

    pub fn build_headers(&self) -> Result<HeaderMap, ChatApiError> {
        let api_key = self.config.api_key.trim();
        if api_key.is_empty() {
            return Err(ChatApiError::MissingApiKey);
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| {
                ChatApiError::InvalidHeader("API key is not a valid header value".to_string())
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));

        let user_agent = self
            .config
            .user_agent
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_USER_AGENT);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent).map_err(|_| {
                ChatApiError::InvalidHeader(format!("invalid user agent: {user_agent}"))
            })?,
        );

        Ok(headers)
    }

    pub fn build_request(
        &self,
        request: &ChatRequest,
    ) -> Result<reqwest::RequestBuilder, ChatApiError> {
        if request.messages.is_empty() {
            return Err(ChatApiError::EmptyConversation);
        }

        let headers = self.build_headers()?;
        let mut payload = request.clone();
        payload.stream = true;
        Ok(self
            .http
            .post(self.normalized_endpoint())
            .headers(headers)
            .json(&payload))
    }

    /// Open the response stream, retrying only on `429 Too Many Requests`.
    ///
    /// Any other HTTP status or connection failure is returned immediately.
    /// Cancellation is observed before each attempt, while the request is in
    /// flight, and during the backoff sleep.
    pub async fn send_with_retry(
        &self,
        request: &ChatRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<Response, ChatApiError> {
        let backoff = self.config.backoff;
        let mut last_error = None;

        for attempt in 0..backoff.max_attempts {
            if is_cancelled(cancellation) {
                return Err(ChatApiError::Cancelled);
            }

            let response = self.build_request(request)?.send();
            let response = await_or_cancel(response, cancellation)
                .await?
                .map_err(ChatApiError::from)?;

            let status = response.status();
            if status.is_success() {
                tracing::debug!(attempt, %status, "chat completion stream opened");
                return Ok(response);
            }

            let body = await_or_cancel(response.text(), cancellation)
                .await?
                .unwrap_or_default();
            let message = parse_error_message(status, &body);

            if !is_rate_limited(status) {
                tracing::debug!(attempt, %status, %message, "chat completion request rejected");
                return Err(ChatApiError::Status(status, message));
            }

            last_error = Some(message);
            if !backoff.allows_retry_after(attempt) {
                break;
            }

            let delay = backoff.delay(attempt);
            tracing::warn!(
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "rate limited; backing off before retry"
            );
            await_or_cancel(tokio::time::sleep(delay), cancellation).await?;
        }

        Err(ChatApiError::RetryExhausted {
            attempts: backoff.max_attempts,
            last_error,
        })
    }

    /// Stream one completion, handing every event to `on_event` as it is
    /// parsed and returning the aggregate once the stream ends.
    ///
    /// Returning `ControlFlow::Break` from the handler stops reading and
    /// fails the call with [`ChatApiError::Aborted`].
    ///
    /// The response body is owned by this call and dropped on every exit
    /// path, which releases the underlying connection.
    pub async fn stream_with_handler<F>(
        &self,
        request: &ChatRequest,
        cancellation: Option<&CancellationSignal>,
        mut on_event: F,
    ) -> Result<StreamResult, ChatApiError>
    where
        F: FnMut(&ChatStreamEvent) -> ControlFlow<()>,
    {
        let response = self.send_with_retry(request, cancellation).await?;
        let mut bytes = response.bytes_stream();
        let mut parser = SseStreamParser::default();
        let mut result = StreamResult::default();

        while !result.done {
            let Some(chunk) = await_or_cancel(bytes.next(), cancellation).await? else {
                for event in parser.finish()? {
                    process_stream_event(event, &mut result, &mut on_event)?;
                }
                break;
            };
            let chunk = chunk.map_err(ChatApiError::from)?;
            for event in parser.feed(&chunk)? {
                process_stream_event(event, &mut result, &mut on_event)?;
                if result.done {
                    break;
                }
            }
        }

        tracing::debug!(
            bytes = result.content.len(),
            finish_reason = result.finish_reason.as_deref().unwrap_or("none"),
            done = result.done,
            "chat completion stream finished"
        );
        Ok(result)
    }

    pub async fn stream(
        &self,
        request: &ChatRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<StreamResult, ChatApiError> {
        self.stream_with_handler(request, cancellation, |_| ControlFlow::Continue(()))
            .await
    }
}

fn process_stream_event<F>(
    event: ChatStreamEvent,
    result: &mut StreamResult,
    on_event: &mut F,
) -> Result<(), ChatApiError>
where
    F: FnMut(&ChatStreamEvent) -> ControlFlow<()>,
{
    match &event {
        ChatStreamEvent::ContentDelta { delta } => result.content.push_str(delta),
        ChatStreamEvent::Finished { reason } => result.finish_reason = Some(reason.clone()),
        ChatStreamEvent::Done => result.done = true,
        ChatStreamEvent::Error { code, message } => {
            return Err(ChatApiError::StreamFailed {
                code: code.clone(),
                message: message
                    .clone()
                    .unwrap_or_else(|| "stream reported an error".to_owned()),
            });
        }
    }

    match on_event(&event) {
        ControlFlow::Continue(()) => Ok(()),
        ControlFlow::Break(()) => Err(ChatApiError::Aborted),
    }
}

fn is_cancelled(cancel: Option<&CancellationSignal>) -> bool {
    cancel.is_some_and(|token| token.load(Ordering::Acquire))
}

async fn await_or_cancel<F>(
    future: F,
    cancellation: Option<&CancellationSignal>,
) -> Result<F::Output, ChatApiError>
where
    F: Future,
{
    if cancellation.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancellation) {
            return Err(ChatApiError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            if is_cancelled(cancellation) {
                return Err(ChatApiError::Cancelled);
            }
            return Ok(output);
        }
    }
}
