//! Remote debugging sessions
//!
//! Lets a running process hand its console to an operator connected over
//! TCP, so that a debugger can be driven from another terminal when the
//! process's own standard streams are out of reach.
//!
//! ```no_run
//! use rdb::LineDebugger;
//!
//! // blocks until an operator connects to 127.0.0.1:4444 and continues
//! rdb::set_trace::<LineDebugger>("127.0.0.1", 4444)?;
//! # Ok::<(), rdb::SessionError>(())
//! ```
mod command;
pub mod console;
mod debugger;
mod error;
mod host;
mod line;
pub mod registry;
pub mod session;
pub mod shell;
mod tracer;

pub use command::{Command, Terminator};
pub use console::{Console, ConsoleStreams};
pub use debugger::{CoreOptions, DEFAULT_PROMPT, DebuggerCore, StopLocation, Traceback};
pub use error::SessionError;
pub use host::Host;
pub use line::LineDebugger;
pub use registry::PortRegistry;
pub use session::{Listener, RemoteSession, SessionState};
pub use tracer::{TraceOutcome, Tracer, post_mortem, set_trace};

pub use transport::{StreamHandle, StreamId};

pub use config::{ColorScheme, Config, DEFAULT_ADDRESS, DEFAULT_PORT, ListenConfig};
