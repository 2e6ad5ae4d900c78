//! Console redirection
//!
//! The process console is the pair of streams the host and the debugger
//! core treat as standard input and standard output. A remote session swaps
//! them for the operator's connection while it is active and puts the
//! previous pair back when it ends.

use std::sync::{Mutex, MutexGuard, PoisonError};

use transport::{LocalStream, StreamHandle};

/// The two console roles
#[derive(Debug, Clone)]
pub struct ConsoleStreams {
    pub stdin: StreamHandle,
    pub stdout: StreamHandle,
}

impl ConsoleStreams {
    /// The process's real standard input and output
    pub fn local() -> Self {
        Self {
            stdin: StreamHandle::new(LocalStream::Stdin),
            stdout: StreamHandle::new(LocalStream::Stdout),
        }
    }

    /// One stream serving both roles
    pub fn mirrored(stream: StreamHandle) -> Self {
        Self {
            stdin: stream.clone(),
            stdout: stream,
        }
    }
}

/// Process-wide console context
///
/// Changes go through [`Console::acquire`] and [`Console::release`], or the
/// [`Console::redirect`] guard which pairs them.
#[derive(Debug)]
pub struct Console {
    streams: Mutex<ConsoleStreams>,
}

impl Console {
    pub fn new(streams: ConsoleStreams) -> Self {
        Self {
            streams: Mutex::new(streams),
        }
    }

    fn streams(&self) -> MutexGuard<'_, ConsoleStreams> {
        self.streams.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current(&self) -> ConsoleStreams {
        self.streams().clone()
    }

    pub fn stdin(&self) -> StreamHandle {
        self.streams().stdin.clone()
    }

    pub fn stdout(&self) -> StreamHandle {
        self.streams().stdout.clone()
    }

    /// Install `streams`, returning the ones they replace
    #[must_use = "the previous streams are needed to release the console"]
    pub fn acquire(&self, streams: ConsoleStreams) -> ConsoleStreams {
        tracing::debug!(
            stdin = %streams.stdin.id(),
            stdout = %streams.stdout.id(),
            "redirecting console"
        );
        std::mem::replace(&mut *self.streams(), streams)
    }

    /// Put back streams returned by [`Console::acquire`]
    pub fn release(&self, previous: ConsoleStreams) {
        tracing::debug!(
            stdin = %previous.stdin.id(),
            stdout = %previous.stdout.id(),
            "restoring console"
        );
        *self.streams() = previous;
    }

    /// Install `streams` until the returned guard is dropped
    pub fn redirect(&self, streams: ConsoleStreams) -> Redirection<'_> {
        let previous = self.acquire(streams);
        Redirection {
            console: self,
            previous: Some(previous),
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new(ConsoleStreams::local())
    }
}

/// Restores the console when dropped
#[derive(Debug)]
pub struct Redirection<'c> {
    console: &'c Console,
    previous: Option<ConsoleStreams>,
}

impl Redirection<'_> {
    /// Restore the console now
    pub fn restore(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.console.release(previous);
        }
    }
}

impl Drop for Redirection<'_> {
    fn drop(&mut self) {
        self.release();
    }
}
