//! TCP-based transport implementation

use std::io::BufReader;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};

use eyre::{Context, Result};

use super::ConsoleTransport;

/// TCP-based console transport
///
/// Wraps a [`TcpStream`], usually one just accepted from an operator.
///
/// # Blocking Behavior
///
/// Reads have no timeout: the debugged thread is meant to wait for the
/// operator for as long as it takes. A dropped connection shows up as end of
/// input or as an I/O error on the next read.
pub struct TcpTransport {
    stream: TcpStream,
    peer: Option<SocketAddr>,
}

impl TcpTransport {
    /// Create a new TCP transport from an existing stream
    ///
    /// # Errors
    ///
    /// Returns an error if the stream cannot be configured
    pub fn new(stream: TcpStream) -> Result<Self> {
        stream
            .set_read_timeout(None)
            .context("clearing read timeout on TCP stream")?;
        stream
            .set_nodelay(true)
            .context("disabling Nagle's algorithm on TCP stream")?;
        let peer = stream.peer_addr().ok();
        tracing::debug!(?peer, "created TCP transport");
        Ok(Self { stream, peer })
    }

    /// Connect to a listening session at the given address
    ///
    /// This is what an operator console does; the session side uses
    /// [`TcpTransport::new`] on an accepted stream.
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr).context("connecting to remote session")?;
        Self::new(stream)
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }
}

impl ConsoleTransport for TcpTransport {
    type Reader = BufReader<TcpStream>;
    type Writer = TcpStream;

    fn split(self) -> Result<(Self::Reader, Self::Writer)> {
        let input = self
            .stream
            .try_clone()
            .context("cloning TCP stream for reader")?;
        let output = self.stream;

        Ok((BufReader::new(input), output))
    }
}
