#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use blue::{CompletionTransport, Editor, EditorError, InputSource, OutputSink, TransportError};
use chat_api::{CancellationSignal, ChatApiError};
use message_store::Message;

#[derive(Debug, Default)]
pub struct SinkTrace {
    pub writes: Vec<String>,
    pub reports: Vec<String>,
}

impl SinkTrace {
    pub fn output(&self) -> String {
        self.writes.concat()
    }
}

#[derive(Clone, Default)]
pub struct RecordingSink {
    state: Arc<Mutex<SinkTrace>>,
}

impl RecordingSink {
    pub fn new() -> (Self, Arc<Mutex<SinkTrace>>) {
        let sink = Self::default();
        let state = Arc::clone(&sink.state);
        (sink, state)
    }
}

impl OutputSink for RecordingSink {
    fn write(&mut self, text: &str) -> io::Result<()> {
        lock_unpoisoned(&self.state).writes.push(text.to_string());
        Ok(())
    }

    fn report(&mut self, message: &str) -> io::Result<()> {
        lock_unpoisoned(&self.state).reports.push(message.to_string());
        Ok(())
    }
}

/// Editor that replays scripted results and records every seed it was given.
#[derive(Clone, Default)]
pub struct ScriptedEditor {
    results: Arc<Mutex<VecDeque<Result<String, String>>>>,
    seeds: Arc<Mutex<Vec<String>>>,
}

impl ScriptedEditor {
    pub fn returning(results: Vec<Result<&str, &str>>) -> Self {
        let results = results
            .into_iter()
            .map(|result| result.map(str::to_string).map_err(str::to_string))
            .collect();
        Self {
            results: Arc::new(Mutex::new(results)),
            seeds: Arc::default(),
        }
    }

    pub fn seeds(&self) -> Vec<String> {
        lock_unpoisoned(&self.seeds).clone()
    }
}

impl Editor for ScriptedEditor {
    fn edit(&mut self, seed: &str) -> Result<String, EditorError> {
        lock_unpoisoned(&self.seeds).push(seed.to_string());
        match lock_unpoisoned(&self.results).pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(EditorError::Buffer(io::Error::other(message))),
            None => panic!("editor invoked more times than scripted"),
        }
    }
}

pub struct ScriptedInput {
    turns: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new(turns: &[&str]) -> Self {
        Self {
            turns: turns.iter().map(|turn| turn.to_string()).collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn read_turn(&mut self) -> io::Result<String> {
        Ok(self.turns.pop_front().unwrap_or_default())
    }
}

pub enum TransportScript {
    Reply(Vec<&'static str>),
    Fail(fn() -> ChatApiError),
}

#[derive(Default)]
pub struct TransportTrace {
    pub calls: Vec<Vec<Message>>,
}

/// Transport that streams scripted increments into the sink.
pub struct FakeTransport {
    scripts: VecDeque<TransportScript>,
    state: Arc<Mutex<TransportTrace>>,
}

impl FakeTransport {
    pub fn new(scripts: Vec<TransportScript>) -> (Self, Arc<Mutex<TransportTrace>>) {
        let state = Arc::new(Mutex::new(TransportTrace::default()));
        (
            Self {
                scripts: scripts.into(),
                state: Arc::clone(&state),
            },
            state,
        )
    }
}

impl CompletionTransport for FakeTransport {
    fn stream(
        &mut self,
        messages: &[Message],
        sink: &mut dyn OutputSink,
        _cancellation: &CancellationSignal,
    ) -> Result<String, TransportError> {
        lock_unpoisoned(&self.state).calls.push(messages.to_vec());

        match self.scripts.pop_front() {
            Some(TransportScript::Reply(increments)) => {
                for increment in &increments {
                    sink.write(increment).map_err(TransportError::Output)?;
                }
                sink.write("\n").map_err(TransportError::Output)?;
                Ok(increments.concat())
            }
            Some(TransportScript::Fail(error)) => Err(TransportError::Api(error())),
            None => panic!("transport invoked more times than scripted"),
        }
    }
}

pub fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
