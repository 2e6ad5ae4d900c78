//! The debugger core seam
//!
//! A remote session does not evaluate anything itself. Stepping, frame
//! inspection and command evaluation belong to a debugger core plugged in
//! through [`DebuggerCore`]; the session only feeds it operator commands and
//! takes over when a command ends the session.

use std::{fmt, panic::Location};

use config::ColorScheme;
use transport::StreamHandle;

use crate::Command;

pub const DEFAULT_PROMPT: &str = "(rdb) ";

/// What a debugger core is constructed with
#[derive(Debug, Clone)]
pub struct CoreOptions {
    pub stdin: StreamHandle,
    pub stdout: StreamHandle,
    pub color_scheme: ColorScheme,
}

/// Where `set_trace` was called from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopLocation {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
}

impl StopLocation {
    #[track_caller]
    pub fn caller() -> Self {
        Location::caller().into()
    }
}

impl From<&'static Location<'static>> for StopLocation {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl fmt::Display for StopLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A captured error, handed to a post-mortem session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traceback {
    /// The outermost error message
    pub summary: String,
    /// Messages of the underlying causes, outermost first
    pub causes: Vec<String>,
    /// Full report as the error handler renders it
    pub rendered: String,
}

impl From<&eyre::Report> for Traceback {
    fn from(report: &eyre::Report) -> Self {
        Self {
            summary: report.to_string(),
            causes: report.chain().skip(1).map(ToString::to_string).collect(),
            rendered: format!("{report:?}"),
        }
    }
}

/// An interactive debugger driven by a remote session
///
/// The session reads operator lines, dispatches every ordinary command by
/// name through [`DebuggerCore::dispatch`], and intercepts the terminating
/// commands: their `do_*` hook runs first, then the session tears down no
/// matter what the hook returned.
pub trait DebuggerCore {
    /// Build a core that talks through the given streams
    fn attach(options: CoreOptions) -> eyre::Result<Self>
    where
        Self: Sized;

    fn prompt(&self) -> &str {
        DEFAULT_PROMPT
    }

    /// Forget any state from a previous stop
    fn reset(&mut self);

    /// Stop at a live location
    fn enter(&mut self, location: StopLocation) -> eyre::Result<()>;

    /// Stop on a captured error
    fn enter_post_mortem(&mut self, traceback: &Traceback) -> eyre::Result<()>;

    /// Run a non-terminating command
    fn dispatch(&mut self, command: &Command) -> eyre::Result<()>;

    fn do_continue(&mut self, _arg: &str) -> eyre::Result<()> {
        Ok(())
    }

    fn do_quit(&mut self, _arg: &str) -> eyre::Result<()> {
        Ok(())
    }

    fn do_eof(&mut self, _arg: &str) -> eyre::Result<()> {
        Ok(())
    }
}
