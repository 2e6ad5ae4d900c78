//! Shell integration
//!
//! A host may already run an interactive shell, or carry startup commands
//! in its configuration. Sessions ask a [`ShellIntegration`] for those
//! commands and run them before the first prompt.

use std::{collections::VecDeque, io::Write};

/// Kind of interactive shell already running in the process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    /// A top-level shell which loaded its own configuration
    Terminal,
    /// A shell embedded in a host program; its configuration was not loaded
    Embedded,
}

pub trait ShellIntegration {
    /// Startup commands to merge into the session preamble
    fn exec_lines(&self) -> Vec<String>;

    /// The shell already running in this process, if any
    fn active_shell(&self) -> Option<ShellKind> {
        None
    }
}

/// No shell and no startup commands
#[derive(Debug, Clone, Copy, Default)]
pub struct NoShell;

impl ShellIntegration for NoShell {
    fn exec_lines(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Startup commands taken from configuration
#[derive(Debug, Clone, Default)]
pub struct ConfiguredShell {
    exec_lines: Vec<String>,
    active: Option<ShellKind>,
}

impl ConfiguredShell {
    pub fn new(exec_lines: Vec<String>) -> Self {
        Self {
            exec_lines,
            active: None,
        }
    }

    pub fn from_config(config: &config::Config) -> Self {
        Self::new(config.exec_lines.clone())
    }

    /// Report `kind` as the shell already running in the process
    pub fn running(mut self, kind: ShellKind) -> Self {
        self.active = Some(kind);
        self
    }
}

impl ShellIntegration for ConfiguredShell {
    fn exec_lines(&self) -> Vec<String> {
        self.exec_lines.clone()
    }

    fn active_shell(&self) -> Option<ShellKind> {
        self.active
    }
}

/// Commands a session runs before reading from the operator
///
/// Blank lines and `#` comments are dropped. Inside an embedded shell the
/// configuration is not loaded, so nothing is queued and a notice goes to
/// stderr.
pub(crate) fn preamble(shell: &dyn ShellIntegration) -> VecDeque<String> {
    if shell.active_shell() == Some(ShellKind::Embedded) {
        tracing::debug!("embedded shell detected, skipping startup commands");
        let _ = write!(
            std::io::stderr(),
            "\nYou are currently in an embedded shell,\n\
             the configuration will not be loaded.\n\n"
        );
        return VecDeque::new();
    }

    shell
        .exec_lines()
        .into_iter()
        .filter(|line| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_shell_has_no_preamble() {
        assert!(preamble(&NoShell).is_empty());
    }

    #[test]
    fn configured_lines_in_order() {
        let shell = ConfiguredShell::new(vec![
            "where".to_string(),
            "".to_string(),
            "# show the stack".to_string(),
            "help".to_string(),
        ]);

        assert_eq!(preamble(&shell), vec!["where", "help"]);
    }

    #[test]
    fn running_terminal_shell_keeps_configuration() {
        let shell = ConfiguredShell::new(vec!["where".to_string()]).running(ShellKind::Terminal);
        assert_eq!(preamble(&shell), vec!["where"]);
    }

    #[test]
    fn embedded_shell_skips_configuration() {
        let shell = ConfiguredShell::new(vec!["where".to_string()]).running(ShellKind::Embedded);
        assert!(preamble(&shell).is_empty());
    }

    #[test]
    fn from_config() {
        let config = config::Config {
            exec_lines: vec!["help".to_string()],
            ..Default::default()
        };
        assert_eq!(ConfiguredShell::from_config(&config).exec_lines(), vec!["help"]);
    }
}
