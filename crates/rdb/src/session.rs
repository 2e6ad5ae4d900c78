//! Remote session lifecycle
//!
//! ```text
//! Binding -> Listening -> AwaitingClient -> Active -> Terminated
//! ```
//!
//! [`Listener::bind`] covers the first two states. [`RemoteSession::accept`]
//! blocks until an operator connects, then wraps the connection, installs it
//! as the process console and claims the port. The session stays `Active`
//! until a terminating command, [`RemoteSession::shutdown`], or drop.

use std::{
    collections::VecDeque,
    io::Write,
    net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs},
};

use config::{ColorScheme, ListenConfig};
use socket2::{Domain, Protocol, Socket, Type};
use transport::{ConnectionStream, ConsoleStream, FallbackStream, StreamHandle, TcpTransport};

use crate::{
    Command, CoreOptions, DebuggerCore, Host, SessionError, StopLocation, Terminator, Traceback,
    console::ConsoleStreams,
    shell::{self, ShellIntegration},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Binding,
    Listening,
    AwaitingClient,
    Active,
    Terminated,
}

/// A bound listening socket waiting for its single operator
#[derive(Debug)]
pub struct Listener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Bind `address:port`
    ///
    /// An address already in use is reported as
    /// [`SessionError::BindConflict`], whoever the occupant is.
    #[tracing::instrument]
    pub fn bind(address: &str, port: u16) -> Result<Self, SessionError> {
        tracing::debug!(state = ?SessionState::Binding, "binding session socket");
        let addr = resolve(address, port)?;
        let listener = listen(addr)?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| SessionError::Bind { addr, source })?;

        tracing::debug!(state = ?SessionState::Listening, %local_addr, "session socket bound");
        // stdout may be off limits in the host, so announce on stderr
        let _ = writeln!(std::io::stderr(), "rdb is running on {local_addr}");

        Ok(Self {
            listener,
            local_addr,
        })
    }

    pub fn from_config(listen: &ListenConfig) -> Result<Self, SessionError> {
        Self::bind(&listen.address, listen.port)
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    fn accept(&self) -> Result<(TcpStream, SocketAddr), SessionError> {
        tracing::debug!(state = ?SessionState::AwaitingClient, local_addr = %self.local_addr, "waiting for operator");
        self.listener.accept().map_err(SessionError::Accept)
    }
}

/// Listening socket with room for a single queued operator
///
/// Address reuse lets a restarted host bind the same port straight away.
fn listen(addr: SocketAddr) -> Result<TcpListener, SessionError> {
    let bind_error = |source: std::io::Error| {
        if source.kind() == std::io::ErrorKind::AddrInUse {
            SessionError::BindConflict { addr, source }
        } else {
            SessionError::Bind { addr, source }
        }
    };

    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
        .map_err(bind_error)?;
    socket.set_reuse_address(true).map_err(bind_error)?;
    socket.bind(&addr.into()).map_err(bind_error)?;
    socket.listen(1).map_err(bind_error)?;
    Ok(socket.into())
}

fn resolve(address: &str, port: u16) -> Result<SocketAddr, SessionError> {
    let resolve_error = |source| SessionError::Resolve {
        address: address.to_string(),
        port,
        source,
    };
    (address, port)
        .to_socket_addrs()
        .map_err(resolve_error)?
        .next()
        .ok_or_else(|| {
            resolve_error(std::io::Error::new(
                std::io::ErrorKind::AddrNotAvailable,
                "address resolved to nothing",
            ))
        })
}

/// An operator attached to this process over TCP
///
/// While active, the operator's connection is the process console of the
/// borrowed [`Host`] and the port is claimed in its registry. Teardown runs
/// exactly once: on a terminating command, on [`RemoteSession::shutdown`],
/// or when the session is dropped, including while unwinding.
pub struct RemoteSession<'h, C: DebuggerCore> {
    host: &'h Host,
    port: u16,
    local_addr: SocketAddr,
    peer_addr: SocketAddr,
    listener: Option<TcpListener>,
    client: Option<TcpStream>,
    saved: Option<ConsoleStreams>,
    wrapper: StreamHandle,
    core: C,
    preamble: VecDeque<String>,
    last_command: Option<Command>,
    state: SessionState,
}

impl<'h, C: DebuggerCore> RemoteSession<'h, C> {
    /// Bind, then wait for the operator
    pub fn open(
        host: &'h Host,
        listen: &ListenConfig,
        color_scheme: ColorScheme,
        shell: &dyn ShellIntegration,
    ) -> Result<Self, SessionError> {
        let listener = Listener::from_config(listen)?;
        Self::accept(host, listener, color_scheme, shell)
    }

    /// Wait for the operator on `listener` and take over the console
    pub fn accept(
        host: &'h Host,
        listener: Listener,
        color_scheme: ColorScheme,
        shell: &dyn ShellIntegration,
    ) -> Result<Self, SessionError> {
        let (stream, peer_addr) = listener.accept()?;
        tracing::debug!(%peer_addr, "operator connected");

        let client = stream.try_clone().map_err(SessionError::Accept)?;
        let connection = TcpTransport::new(stream)
            .and_then(ConnectionStream::from_transport)
            .map_err(SessionError::Connection)?;

        // capabilities the connection lacks are answered by the console we replace
        let local = host.console().current();
        let wrapper = StreamHandle::new(FallbackStream::new(
            connection,
            FallbackStream::new(local.stdin, local.stdout),
        ));

        let core = C::attach(CoreOptions {
            stdin: wrapper.clone(),
            stdout: wrapper.clone(),
            color_scheme,
        })
        .map_err(SessionError::Core)?;
        let preamble = shell::preamble(shell);

        let saved = host
            .console()
            .acquire(ConsoleStreams::mirrored(wrapper.clone()));
        let port = listener.local_addr.port();
        host.registry().claim(port, wrapper.id());

        tracing::debug!(state = ?SessionState::Active, port, wrapper = %wrapper.id(), "remote session active");
        Ok(Self {
            host,
            port,
            local_addr: listener.local_addr,
            peer_addr,
            listener: Some(listener.listener),
            client: Some(client),
            saved: Some(saved),
            wrapper,
            core,
            preamble,
            last_command: None,
            state: SessionState::Active,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// The stream installed as the process console
    pub fn console(&self) -> &StreamHandle {
        &self.wrapper
    }

    pub fn core(&self) -> &C {
        &self.core
    }

    /// Stop at `location` and serve the operator until a terminating command
    #[tracing::instrument(skip(self), fields(port = self.port))]
    pub fn set_trace(&mut self, location: StopLocation) -> Result<Terminator, SessionError> {
        self.ensure_active()?;
        self.core.enter(location).map_err(SessionError::Core)?;
        self.command_loop()
    }

    /// Present `traceback` and serve the operator until a terminating command
    #[tracing::instrument(skip_all, fields(port = self.port))]
    pub fn post_mortem(&mut self, traceback: &Traceback) -> Result<Terminator, SessionError> {
        self.ensure_active()?;
        self.core.reset();
        self.core
            .enter_post_mortem(traceback)
            .map_err(SessionError::Core)?;
        self.command_loop()
    }

    /// Serve the operator until a terminating command
    ///
    /// A failing operator connection is returned as [`SessionError::Io`] and
    /// leaves the session active: the port stays claimed until the session
    /// is shut down or dropped.
    pub fn command_loop(&mut self) -> Result<Terminator, SessionError> {
        self.ensure_active()?;

        loop {
            let command = match self.next_command()? {
                Some(command) => command,
                None => continue,
            };

            if let Some(terminator) = command.terminator() {
                return self.terminate(terminator, &command.arg);
            }

            tracing::trace!(%command, "dispatching command");
            self.core.dispatch(&command).map_err(SessionError::Core)?;
            self.last_command = Some(command);
        }
    }

    // there is no resume once torn down
    fn ensure_active(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Terminated => Err(SessionError::Terminated { port: self.port }),
            _ => Ok(()),
        }
    }

    fn next_command(&mut self) -> Result<Option<Command>, SessionError> {
        if let Some(line) = self.preamble.pop_front() {
            tracing::debug!(%line, "running startup command");
            return Ok(Command::parse(&line));
        }

        self.wrapper.write_all(self.core.prompt().as_bytes())?;
        self.wrapper.flush()?;

        match self.wrapper.read_command_line()? {
            None => Ok(Some(Command::eof())),
            // an empty line repeats the previous command
            Some(line) => Ok(Command::parse(&line).or_else(|| self.last_command.clone())),
        }
    }

    fn terminate(&mut self, terminator: Terminator, arg: &str) -> Result<Terminator, SessionError> {
        tracing::debug!(?terminator, "terminating command");
        let outcome = match terminator {
            Terminator::Continue => self.core.do_continue(arg),
            Terminator::Quit => self.core.do_quit(arg),
            Terminator::Eof => self.core.do_eof(arg),
        };
        self.shutdown();
        outcome.map_err(SessionError::Core)?;
        Ok(terminator)
    }

    /// Restore the console, release the port and close both sockets
    ///
    /// Does nothing once the session is terminated.
    pub fn shutdown(&mut self) {
        if self.state == SessionState::Terminated {
            return;
        }

        if let Some(saved) = self.saved.take() {
            self.host.console().release(saved);
        }
        self.host.registry().unclaim(self.port);
        if let Some(client) = self.client.take() {
            if let Err(e) = client.shutdown(Shutdown::Both) {
                tracing::debug!(error = %e, "operator connection already closed");
            }
        }
        drop(self.listener.take());

        self.state = SessionState::Terminated;
        tracing::debug!(state = ?self.state, port = self.port, "remote session terminated");
    }
}

impl<C: DebuggerCore> Drop for RemoteSession<'_, C> {
    fn drop(&mut self) {
        if self.state != SessionState::Terminated {
            tracing::debug!(port = self.port, "tearing down abandoned session");
            self.shutdown();
        }
    }
}

impl<C: DebuggerCore> std::fmt::Debug for RemoteSession<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSession")
            .field("port", &self.port)
            .field("peer_addr", &self.peer_addr)
            .field("wrapper", &self.wrapper)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::{net::TcpListener, time::Duration};

    use super::*;

    #[test]
    fn bind_conflict_on_occupied_port() {
        let occupant = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = occupant.local_addr().unwrap().port();

        let err = Listener::bind("127.0.0.1", port).unwrap_err();

        assert!(err.is_bind_conflict(), "{err:?}");
    }

    #[test]
    fn bind_any_port() {
        let listener = Listener::bind("127.0.0.1", 0).unwrap();
        assert_ne!(listener.local_addr().port(), 0);
        assert!(listener.local_addr().ip().is_loopback());
    }

    #[test]
    fn unresolvable_address() {
        let err = Listener::bind("not an address", 4444).unwrap_err();
        assert!(matches!(err, SessionError::Resolve { port: 4444, .. }), "{err:?}");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn backlog_holds_a_single_queued_operator() {
        let listener = Listener::bind("127.0.0.1", 0).unwrap();
        let addr = listener.local_addr();

        // nobody accepts, so only the backlog can complete handshakes
        let queued: Vec<_> = (0..6)
            .filter_map(|_| TcpStream::connect_timeout(&addr, Duration::from_millis(300)).ok())
            .collect();

        // linux admits one more than the backlog
        assert!(
            !queued.is_empty() && queued.len() <= 2,
            "listener queued {} operators",
            queued.len()
        );
    }

    #[test]
    fn rebind_after_close() {
        let listener = Listener::bind("127.0.0.1", 0).unwrap();
        let port = listener.local_addr().port();
        drop(listener);

        Listener::bind("127.0.0.1", port).unwrap();
    }
}
