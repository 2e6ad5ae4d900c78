use std::sync::OnceLock;

use crate::{Console, PortRegistry, console::ConsoleStreams};

/// Debugging state shared by every session of a process
///
/// Sessions borrow a `Host` for their whole lifetime. Most programs use the
/// single [`Host::global`] instance; tests and embedders can build their own
/// so that sessions do not touch the real process console.
#[derive(Debug, Default)]
pub struct Host {
    registry: PortRegistry,
    console: Console,
}

impl Host {
    pub fn new(console: Console) -> Self {
        Self {
            registry: PortRegistry::new(),
            console,
        }
    }

    /// Host whose console starts out as the given streams
    pub fn with_streams(streams: ConsoleStreams) -> Self {
        Self::new(Console::new(streams))
    }

    /// The process-wide host, backed by the real standard streams
    pub fn global() -> &'static Host {
        static HOST: OnceLock<Host> = OnceLock::new();
        HOST.get_or_init(Host::default)
    }

    pub fn registry(&self) -> &PortRegistry {
        &self.registry
    }

    pub fn console(&self) -> &Console {
        &self.console
    }
}
