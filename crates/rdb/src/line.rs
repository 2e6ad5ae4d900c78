//! A minimal line-oriented debugger core
//!
//! [`LineDebugger`] knows where it stopped and what it has been asked. It is
//! enough to drive a session end to end when the host has no real debugger
//! core to plug in.

use config::ColorScheme;
use eyre::WrapErr;
use transport::{ConsoleStream, StreamHandle};

use crate::{Command, CoreOptions, DebuggerCore, StopLocation, Traceback};

#[derive(Debug, Clone)]
enum Stop {
    Live(StopLocation),
    PostMortem(Traceback),
}

#[derive(Debug)]
pub struct LineDebugger {
    stdout: StreamHandle,
    color_scheme: ColorScheme,
    stop: Option<Stop>,
    history: Vec<String>,
}

const HELP: &str = "\
Documented commands:
  where (w, bt)          show where execution stopped
  history                list the commands run so far
  help (h, ?)            show this message
  continue (c, cont)     end the session and resume the program
  quit (q, exit)         end the session
";

impl LineDebugger {
    fn highlight(&self, text: &str) -> String {
        match self.color_scheme {
            ColorScheme::NoColor => text.to_string(),
            ColorScheme::Linux => format!("\x1b[1;32m{text}\x1b[0m"),
            ColorScheme::LightBg => format!("\x1b[1;34m{text}\x1b[0m"),
        }
    }

    fn show_stop(&self) -> eyre::Result<()> {
        match &self.stop {
            None => writeln!(self.stdout, "*** not stopped anywhere")?,
            Some(Stop::Live(location)) => {
                writeln!(self.stdout, "> {}", self.highlight(&location.to_string()))?
            }
            Some(Stop::PostMortem(traceback)) => {
                writeln!(self.stdout, "> {}", self.highlight(&traceback.summary))?;
                for cause in &traceback.causes {
                    writeln!(self.stdout, "  caused by: {cause}")?;
                }
            }
        }
        Ok(())
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }
}

impl DebuggerCore for LineDebugger {
    fn attach(options: CoreOptions) -> eyre::Result<Self> {
        Ok(Self {
            stdout: options.stdout,
            color_scheme: options.color_scheme,
            stop: None,
            history: Vec::new(),
        })
    }

    fn reset(&mut self) {
        self.stop = None;
        self.history.clear();
    }

    fn enter(&mut self, location: StopLocation) -> eyre::Result<()> {
        self.stop = Some(Stop::Live(location));
        self.show_stop().wrap_err("showing stop location")
    }

    fn enter_post_mortem(&mut self, traceback: &Traceback) -> eyre::Result<()> {
        self.stop = Some(Stop::PostMortem(traceback.clone()));
        writeln!(self.stdout, "Post mortem debugging of:")?;
        self.show_stop().wrap_err("showing traceback")
    }

    fn dispatch(&mut self, command: &Command) -> eyre::Result<()> {
        self.history.push(command.to_string());
        match command.name.as_str() {
            "where" | "w" | "bt" => self.show_stop()?,
            "help" | "h" | "?" => write!(self.stdout, "{HELP}")?,
            "history" => {
                for (n, line) in self.history.iter().enumerate() {
                    writeln!(self.stdout, "{:>4}  {line}", n + 1)?;
                }
            }
            _ => writeln!(self.stdout, "*** Unknown syntax: {command}")?,
        }
        self.stdout.flush()?;
        Ok(())
    }

    fn do_eof(&mut self, _arg: &str) -> eyre::Result<()> {
        // keep the operator's terminal tidy
        match writeln!(self.stdout) {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::debug!(error = %e, "operator console gone at end of input");
                Ok(())
            }
        }
    }
}
