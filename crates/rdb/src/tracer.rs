//! Entry points
//!
//! `set_trace` and `post_mortem` open a session, hand it to the debugger
//! core, and deal with the one collision that is not an error: a second
//! `set_trace` on a port this process is already serving through the very
//! stream that is now its console.

use std::{
    io::Write,
    panic::{self, AssertUnwindSafe},
};

use config::{ColorScheme, Config, ListenConfig};
use transport::ConsoleStream;

use crate::{
    DebuggerCore, Host, RemoteSession, SessionError, StopLocation, Terminator, Traceback,
    shell::{ConfiguredShell, NoShell, ShellIntegration},
};

const RECURRENT_NOTICE: &str = "(Recurrent rdb invocation ignored)\n";

/// How a call to an entry point ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceOutcome {
    /// The operator ended the session with this command
    Finished(Terminator),
    /// This process already serves the port on the current console
    Recurrent,
    /// The debugger core failed; the failure was reported on stderr
    Aborted,
}

/// Builder for the entry points
pub struct Tracer<'h> {
    host: &'h Host,
    listen: ListenConfig,
    color_scheme: ColorScheme,
    shell: Box<dyn ShellIntegration + 'h>,
}

impl<'h> Tracer<'h> {
    /// Tracer with default settings: `127.0.0.1:4444`, no shell
    pub fn new(host: &'h Host) -> Self {
        Self {
            host,
            listen: ListenConfig::default(),
            color_scheme: ColorScheme::default(),
            shell: Box::new(NoShell),
        }
    }

    /// Tracer using the listen settings, colours and startup commands of `config`
    pub fn from_config(host: &'h Host, config: &Config) -> Self {
        Self {
            host,
            listen: config.listen.clone(),
            color_scheme: config.color_scheme,
            shell: Box::new(ConfiguredShell::from_config(config)),
        }
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.listen.address = address.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.listen.port = port;
        self
    }

    pub fn color_scheme(mut self, color_scheme: ColorScheme) -> Self {
        self.color_scheme = color_scheme;
        self
    }

    pub fn shell(mut self, shell: impl ShellIntegration + 'h) -> Self {
        self.shell = Box::new(shell);
        self
    }

    fn open<C: DebuggerCore>(&self) -> Result<Option<RemoteSession<'h, C>>, SessionError> {
        match RemoteSession::open(self.host, &self.listen, self.color_scheme, &*self.shell) {
            Ok(session) => Ok(Some(session)),
            Err(e) if e.is_bind_conflict() && self.is_ours() => {
                tracing::debug!(port = self.listen.port, "port already served by this console");
                let stdout = self.host.console().stdout();
                if let Err(e) = stdout
                    .write_all(RECURRENT_NOTICE.as_bytes())
                    .and_then(|()| stdout.flush())
                {
                    tracing::warn!(error = %e, "could not notify operator");
                }
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn is_ours(&self) -> bool {
        let stdout = self.host.console().stdout();
        self.host.registry().is_claimed(self.listen.port, stdout.id())
    }

    /// Stop here and wait for an operator
    ///
    /// Blocks until an operator connects and ends the session. A port held by
    /// anything other than this process's active session is an error. Once
    /// the session is up, failures of the debugger core (including panics)
    /// are reported on stderr and swallowed so they cannot take the host
    /// down.
    #[track_caller]
    pub fn set_trace<C: DebuggerCore>(&self) -> Result<TraceOutcome, SessionError> {
        let location = StopLocation::caller();
        let Some(mut session) = self.open::<C>()? else {
            return Ok(TraceOutcome::Recurrent);
        };

        let result = panic::catch_unwind(AssertUnwindSafe(|| session.set_trace(location)));
        let outcome = match result {
            Ok(Ok(terminator)) => TraceOutcome::Finished(terminator),
            Ok(Err(e)) => {
                let report = eyre::Report::new(e);
                tracing::error!(error = ?report, "debugger session failed");
                let _ = writeln!(std::io::stderr(), "{report:?}");
                TraceOutcome::Aborted
            }
            Err(payload) => {
                report_panic(&panic_message(payload.as_ref()));
                TraceOutcome::Aborted
            }
        };

        // no-op unless the session was abandoned
        session.shutdown();
        Ok(outcome)
    }

    /// Open a session on `report` after the fact
    ///
    /// The report is written to stderr first. Failures during the session
    /// are returned to the caller, who is already handling an error.
    pub fn post_mortem<C: DebuggerCore>(
        &self,
        report: &eyre::Report,
    ) -> Result<TraceOutcome, SessionError> {
        let Some(mut session) = self.open::<C>()? else {
            return Ok(TraceOutcome::Recurrent);
        };

        let _ = writeln!(std::io::stderr(), "{report:?}");
        let traceback = Traceback::from(report);
        let terminator = session.post_mortem(&traceback)?;
        Ok(TraceOutcome::Finished(terminator))
    }
}

fn report_panic(message: &str) {
    tracing::error!(panic = %message, "debugger core panicked");
    let _ = writeln!(std::io::stderr(), "debugger core panicked: {message}");
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}

/// Stop here and wait for an operator on `address:port`
///
/// Uses the process-wide [`Host`]. See [`Tracer::set_trace`].
#[track_caller]
pub fn set_trace<C: DebuggerCore>(address: &str, port: u16) -> Result<TraceOutcome, SessionError> {
    Tracer::new(Host::global())
        .address(address)
        .port(port)
        .set_trace::<C>()
}

/// Debug `report` with an operator on `address:port`
///
/// Uses the process-wide [`Host`]. See [`Tracer::post_mortem`].
pub fn post_mortem<C: DebuggerCore>(
    address: &str,
    port: u16,
    report: &eyre::Report,
) -> Result<TraceOutcome, SessionError> {
    Tracer::new(Host::global())
        .address(address)
        .port(port)
        .post_mortem::<C>(report)
}
