//! Ctrl-C handling.
//!
//! While a turn is being processed, SIGINT raises the turn's cancellation
//! flag so the request, backoff sleep, stream read, or editor wait can stop
//! early. Outside of a turn it ends the process with status 130.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chat_api::CancellationSignal;

pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Shared flags between the session and the signal thread.
#[derive(Debug, Clone, Default)]
pub struct InterruptState {
    cancel: CancellationSignal,
    in_turn: Arc<AtomicBool>,
}

impl InterruptState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancellation(&self) -> CancellationSignal {
        Arc::clone(&self.cancel)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    pub fn in_turn(&self) -> bool {
        self.in_turn.load(Ordering::Acquire)
    }

    /// Clear any stale cancellation and mark a turn as running until the
    /// returned guard drops.
    pub fn begin_turn(&self) -> TurnGuard<'_> {
        self.cancel.store(false, Ordering::Release);
        self.in_turn.store(true, Ordering::Release);
        TurnGuard { state: self }
    }

    /// Returns `true` when the interrupt was absorbed by a running turn.
    pub fn interrupt(&self) -> bool {
        if self.in_turn() {
            self.cancel.store(true, Ordering::Release);
            true
        } else {
            false
        }
    }
}

pub struct TurnGuard<'a> {
    state: &'a InterruptState,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.state.in_turn.store(false, Ordering::Release);
    }
}

/// Keeps the SIGINT listener thread alive; closes it on drop.
#[cfg(unix)]
pub struct InterruptGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl Drop for InterruptGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(unix)]
pub fn install(state: InterruptState) -> io::Result<InterruptGuard> {
    use signal_hook::consts::SIGINT;
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT])?;
    let handle = signals.handle();

    let thread = std::thread::spawn(move || {
        for _ in signals.forever() {
            if state.interrupt() {
                tracing::debug!("interrupt received; cancelling current turn");
            } else {
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        }
    });

    Ok(InterruptGuard {
        handle,
        thread: Some(thread),
    })
}

/// No listener is installed; Ctrl-C keeps the platform default.
#[cfg(not(unix))]
pub struct InterruptGuard;

#[cfg(not(unix))]
pub fn install(_state: InterruptState) -> io::Result<InterruptGuard> {
    Ok(InterruptGuard)
}
