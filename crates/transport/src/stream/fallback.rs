use crate::StreamError;

use super::{Capability, ConsoleStream, RawDescriptor};

/// Composite stream that looks a capability up on `primary` first
///
/// When `primary` reports [`StreamError::Unsupported`] the same operation is
/// tried on `fallback`. If neither supports it the error names the missing
/// capability. Any other error from `primary` is returned as is: an I/O
/// failure on the connection is never papered over by the local stream.
pub struct FallbackStream<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackStream<P, F>
where
    P: ConsoleStream,
    F: ConsoleStream,
{
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    fn resolve<T>(
        &self,
        capability: Capability,
        mut op: impl FnMut(&dyn ConsoleStream) -> Result<T, StreamError>,
    ) -> Result<T, StreamError> {
        match op(&self.primary) {
            Err(StreamError::Unsupported(_)) => {
                tracing::trace!(%capability, "capability served by fallback stream");
                match op(&self.fallback) {
                    Err(StreamError::Unsupported(_)) => Err(StreamError::Unsupported(capability)),
                    other => other,
                }
            }
            other => other,
        }
    }
}

impl<P, F> ConsoleStream for FallbackStream<P, F>
where
    P: ConsoleStream,
    F: ConsoleStream,
{
    fn read_line(&self, buf: &mut String) -> Result<usize, StreamError> {
        self.resolve(Capability::ReadLine, |s| s.read_line(buf))
    }

    fn write_all(&self, buf: &[u8]) -> Result<(), StreamError> {
        self.resolve(Capability::Write, |s| s.write_all(buf))
    }

    fn flush(&self) -> Result<(), StreamError> {
        self.resolve(Capability::Flush, |s| s.flush())
    }

    fn fileno(&self) -> Result<RawDescriptor, StreamError> {
        self.resolve(Capability::Fileno, |s| s.fileno())
    }

    fn is_terminal(&self) -> Result<bool, StreamError> {
        self.resolve(Capability::IsTerminal, |s| s.is_terminal())
    }
}
