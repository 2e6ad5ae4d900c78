use std::io::{self, IsTerminal, Write};

use crate::StreamError;

use super::{Capability, ConsoleStream, RawDescriptor};

/// The process's own standard input or standard output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalStream {
    Stdin,
    Stdout,
}

impl ConsoleStream for LocalStream {
    fn read_line(&self, buf: &mut String) -> Result<usize, StreamError> {
        match self {
            LocalStream::Stdin => Ok(io::stdin().read_line(buf)?),
            LocalStream::Stdout => Err(StreamError::Unsupported(Capability::ReadLine)),
        }
    }

    fn write_all(&self, buf: &[u8]) -> Result<(), StreamError> {
        match self {
            LocalStream::Stdin => Err(StreamError::Unsupported(Capability::Write)),
            LocalStream::Stdout => Ok(io::stdout().lock().write_all(buf)?),
        }
    }

    fn flush(&self) -> Result<(), StreamError> {
        match self {
            LocalStream::Stdin => Err(StreamError::Unsupported(Capability::Flush)),
            LocalStream::Stdout => Ok(io::stdout().flush()?),
        }
    }

    #[cfg(unix)]
    fn fileno(&self) -> Result<RawDescriptor, StreamError> {
        use std::os::fd::AsRawFd;

        Ok(match self {
            LocalStream::Stdin => io::stdin().as_raw_fd(),
            LocalStream::Stdout => io::stdout().as_raw_fd(),
        })
    }

    #[cfg(not(unix))]
    fn fileno(&self) -> Result<RawDescriptor, StreamError> {
        Err(StreamError::Unsupported(Capability::Fileno))
    }

    fn is_terminal(&self) -> Result<bool, StreamError> {
        Ok(match self {
            LocalStream::Stdin => io::stdin().is_terminal(),
            LocalStream::Stdout => io::stdout().is_terminal(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdin_cannot_be_written() {
        assert!(matches!(
            LocalStream::Stdin.write_all(b"x"),
            Err(StreamError::Unsupported(Capability::Write))
        ));
        assert!(LocalStream::Stdin.flush().unwrap_err().is_unsupported());
    }

    #[test]
    fn stdout_cannot_be_read() {
        let mut buf = String::new();
        assert!(matches!(
            LocalStream::Stdout.read_line(&mut buf),
            Err(StreamError::Unsupported(Capability::ReadLine))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn standard_descriptors() {
        assert_eq!(LocalStream::Stdin.fileno().unwrap(), 0);
        assert_eq!(LocalStream::Stdout.fileno().unwrap(), 1);
    }
}
