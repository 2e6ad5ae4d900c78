//! Error types for console streams.

use std::io;

use crate::stream::Capability;

/// Errors that can occur when using a console stream.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Neither the stream nor any of its fallbacks provides the capability.
    #[error("unsupported stream operation: {0}")]
    Unsupported(Capability),

    /// An I/O error occurred while reading or writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StreamError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, StreamError::Unsupported(_))
    }
}

impl From<StreamError> for io::Error {
    fn from(value: StreamError) -> Self {
        match value {
            StreamError::Io(e) => e,
            StreamError::Unsupported(capability) => io::Error::new(
                io::ErrorKind::Unsupported,
                format!("unsupported stream operation: {capability}"),
            ),
        }
    }
}
