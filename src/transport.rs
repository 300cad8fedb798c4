//! Blocking bridge from the session to the async chat client.

use std::io;
use std::ops::ControlFlow;

use chat_api::{
    CancellationSignal, ChatApiClient, ChatApiError, ChatMessage, ChatRequest, ChatStreamEvent,
};
use message_store::Message;
use thiserror::Error;

use crate::sink::OutputSink;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Api(#[from] ChatApiError),

    #[error("failed to write reply: {0}")]
    Output(#[source] io::Error),
}

impl TransportError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Api(ChatApiError::Cancelled))
    }
}

pub trait CompletionTransport {
    /// Send `messages`, forwarding every content increment to `sink` as it
    /// arrives, and return the full reply.
    fn stream(
        &mut self,
        messages: &[Message],
        sink: &mut dyn OutputSink,
        cancellation: &CancellationSignal,
    ) -> Result<String, TransportError>;
}

pub struct ChatApiTransport {
    client: ChatApiClient,
    model: String,
    max_tokens: u32,
}

impl ChatApiTransport {
    pub fn new(client: ChatApiClient, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            client,
            model: model.into(),
            max_tokens,
        }
    }

    pub fn request_for(&self, messages: &[Message]) -> ChatRequest {
        let messages = messages
            .iter()
            .map(|message| ChatMessage::new(message.role.as_str(), message.content.clone()))
            .collect();
        ChatRequest::new(self.model.clone(), self.max_tokens, messages)
    }
}

impl CompletionTransport for ChatApiTransport {
    fn stream(
        &mut self,
        messages: &[Message],
        sink: &mut dyn OutputSink,
        cancellation: &CancellationSignal,
    ) -> Result<String, TransportError> {
        let request = self.request_for(messages);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                ChatApiError::Unknown(format!("failed to initialize tokio runtime: {error}"))
            })?;

        let mut wrote_any = false;
        let mut sink_error = None;
        let result = runtime.block_on(self.client.stream_with_handler(
            &request,
            Some(cancellation),
            |event| {
                let ChatStreamEvent::ContentDelta { delta } = event else {
                    return ControlFlow::Continue(());
                };
                match sink.write(delta) {
                    Ok(()) => {
                        wrote_any = true;
                        ControlFlow::Continue(())
                    }
                    Err(error) => {
                        sink_error = Some(error);
                        ControlFlow::Break(())
                    }
                }
            },
        ));

        if let Some(error) = sink_error {
            return Err(TransportError::Output(error));
        }

        match result {
            Ok(reply) => {
                sink.write("\n").map_err(TransportError::Output)?;
                Ok(reply.content)
            }
            Err(error) => {
                if wrote_any {
                    let _ = sink.write("\n");
                }
                Err(error.into())
            }
        }
    }
}
