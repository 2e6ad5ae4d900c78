//! IO abstraction layer for console transport
//!
//! This module provides an abstraction over the byte channels a remote
//! console can run over. The core trait [`ConsoleTransport`] allows plugging
//! in different IO implementations such as an accepted TCP connection or
//! in-memory channels.
//!
//! # Examples
//!
//! ## Using TCP Transport
//!
//! ```no_run
//! use std::net::TcpListener;
//! use transport::{ConnectionStream, StreamHandle, TcpTransport};
//!
//! let listener = TcpListener::bind("127.0.0.1:4444")?;
//! let (stream, _peer) = listener.accept()?;
//! let transport = TcpTransport::new(stream)?;
//! let console = StreamHandle::new(ConnectionStream::from_transport(transport)?);
//! # Ok::<(), eyre::Error>(())
//! ```
//!
//! ## Using In-Memory Transport for Testing
//!
//! ```
//! use transport::{ConnectionStream, InMemoryTransport, StreamHandle};
//!
//! let (session_side, operator_side) = InMemoryTransport::pair();
//! let console = StreamHandle::new(ConnectionStream::from_transport(session_side)?);
//! # Ok::<(), eyre::Error>(())
//! ```

use std::io::{BufRead, Write};

mod memory;
mod tcp;

pub use memory::InMemoryTransport;
pub use tcp::TcpTransport;

/// Trait for bidirectional console transport
///
/// Implementations must provide a way to split the transport into separate
/// reader and writer halves, so that a blocked read does not hold up writes
/// made from elsewhere in the process.
///
/// # Requirements
///
/// - The reader must implement [`BufRead`] for line-based reading
/// - The writer must implement [`Write`]
/// - Reads block until data arrives or the peer goes away; an orderly close
///   reads as end of input
pub trait ConsoleTransport: Send + 'static {
    /// The reader type that implements BufRead
    type Reader: BufRead + Send + 'static;

    /// The writer type that implements Write
    type Writer: Write + Send + 'static;

    /// Split the transport into separate reader and writer halves
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be split (e.g., socket cloning fails)
    fn split(self) -> eyre::Result<(Self::Reader, Self::Writer)>;
}
