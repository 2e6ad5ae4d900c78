use std::{io, net::SocketAddr};

use transport::StreamError;

/// Errors raised while setting up or running a remote session
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The address is already in use, either by another session of this
    /// process or by something unrelated.
    #[error("address {addr} is already in use")]
    BindConflict {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("binding {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("resolving {address}:{port}")]
    Resolve {
        address: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("accepting operator connection")]
    Accept(#[source] io::Error),

    #[error("setting up operator connection: {0}")]
    Connection(eyre::Report),

    /// The operator console failed, usually because the peer went away.
    #[error("operator console failed")]
    Io(#[from] StreamError),

    /// The session was already torn down; sessions cannot be resumed.
    #[error("session on port {port} has already terminated")]
    Terminated { port: u16 },

    /// The debugger core reported a failure.
    #[error("debugger core failed: {0}")]
    Core(eyre::Report),
}

impl SessionError {
    pub fn is_bind_conflict(&self) -> bool {
        matches!(self, SessionError::BindConflict { .. })
    }
}
