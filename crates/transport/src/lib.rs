//! Console transport
//!
//! This crate contains the plumbing that lets a network connection stand in
//! for a process console: transports that carry bytes, and console streams
//! that expose the small set of operations an interactive debugger needs.
mod error;
pub mod io;
pub mod stream;

pub use error::StreamError;
pub use io::{ConsoleTransport, InMemoryTransport, TcpTransport};
pub use stream::{
    Capability, ConnectionStream, ConsoleStream, FallbackStream, LocalStream, StreamHandle,
    StreamId,
};
