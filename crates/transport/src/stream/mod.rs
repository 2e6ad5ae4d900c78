//! Console streams
//!
//! A console stream is what an interactive debugger reads commands from and
//! writes its output to. Instead of relying on whatever a concrete stream
//! type happens to offer, the operations a debugger needs are spelled out as
//! [`Capability`] values on the [`ConsoleStream`] trait. Every operation
//! defaults to [`StreamError::Unsupported`], so an adapter only implements
//! what its backing stream can do, and [`FallbackStream`] chains adapters so
//! that a missing capability is looked up on the next stream in line.
//!
//! [`StreamHandle`] is the shared, identity-carrying handle the rest of the
//! system passes around.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::StreamError;

mod connection;
mod fallback;
mod local;

pub use connection::ConnectionStream;
pub use fallback::FallbackStream;
pub use local::LocalStream;

/// Raw OS descriptor returned by [`ConsoleStream::fileno`]
pub type RawDescriptor = i32;

/// An operation a console stream may or may not support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ReadLine,
    Write,
    Flush,
    Fileno,
    IsTerminal,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::ReadLine => "read_line",
            Capability::Write => "write",
            Capability::Flush => "flush",
            Capability::Fileno => "fileno",
            Capability::IsTerminal => "is_terminal",
        };
        f.write_str(name)
    }
}

/// The operations an interactive debugger performs on its console
///
/// All methods take `&self`: implementations synchronise internally so that
/// a read blocked on one half does not hold up writes on the other.
pub trait ConsoleStream: Send + Sync {
    /// Read one line, including the trailing newline, appending to `buf`.
    ///
    /// Returns the number of bytes read; `0` means end of input.
    fn read_line(&self, _buf: &mut String) -> Result<usize, StreamError> {
        Err(StreamError::Unsupported(Capability::ReadLine))
    }

    /// Write the whole buffer.
    fn write_all(&self, _buf: &[u8]) -> Result<(), StreamError> {
        Err(StreamError::Unsupported(Capability::Write))
    }

    fn flush(&self) -> Result<(), StreamError> {
        Err(StreamError::Unsupported(Capability::Flush))
    }

    /// The OS-level descriptor backing this stream.
    fn fileno(&self) -> Result<RawDescriptor, StreamError> {
        Err(StreamError::Unsupported(Capability::Fileno))
    }

    fn is_terminal(&self) -> Result<bool, StreamError> {
        Err(StreamError::Unsupported(Capability::IsTerminal))
    }
}

/// Identity of a console stream
///
/// Assigned once when a [`StreamHandle`] is created and shared by all of its
/// clones. Only ever compared for equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId(u64);

impl StreamId {
    fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stream#{}", self.0)
    }
}

/// Shared handle to a console stream
///
/// Cloning the handle does not create a new stream: clones share both the
/// underlying stream and its [`StreamId`].
#[derive(Clone)]
pub struct StreamHandle {
    id: StreamId,
    stream: Arc<dyn ConsoleStream>,
}

impl StreamHandle {
    pub fn new(stream: impl ConsoleStream + 'static) -> Self {
        Self {
            id: StreamId::next(),
            stream: Arc::new(stream),
        }
    }

    pub fn id(&self) -> StreamId {
        self.id
    }

    /// Support for `write!` and `writeln!` on a handle
    pub fn write_fmt(&self, args: fmt::Arguments<'_>) -> Result<(), StreamError> {
        match args.as_str() {
            Some(s) => self.stream.write_all(s.as_bytes()),
            None => self.stream.write_all(args.to_string().as_bytes()),
        }
    }

    /// Read one line with the trailing line terminator removed
    ///
    /// Returns `None` at end of input.
    pub fn read_command_line(&self) -> Result<Option<String>, StreamError> {
        let mut line = String::new();
        if self.stream.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}

impl ConsoleStream for StreamHandle {
    fn read_line(&self, buf: &mut String) -> Result<usize, StreamError> {
        self.stream.read_line(buf)
    }

    fn write_all(&self, buf: &[u8]) -> Result<(), StreamError> {
        self.stream.write_all(buf)
    }

    fn flush(&self) -> Result<(), StreamError> {
        self.stream.flush()
    }

    fn fileno(&self) -> Result<RawDescriptor, StreamError> {
        self.stream.fileno()
    }

    fn is_terminal(&self) -> Result<bool, StreamError> {
        self.stream.is_terminal()
    }
}

impl fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHandle").field("id", &self.id).finish()
    }
}
