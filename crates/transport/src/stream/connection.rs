use std::{
    io::{BufRead, Write},
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{ConsoleTransport, StreamError};

use super::ConsoleStream;

/// Console stream backed by a network connection
///
/// Supports line reads, writes and flushes. It has no descriptor and no
/// notion of a terminal; wrap it in a [`super::FallbackStream`] to answer
/// those from a local stream.
pub struct ConnectionStream<R, W> {
    reader: Mutex<R>,
    writer: Mutex<W>,
}

impl<R, W> ConnectionStream<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
        }
    }

    /// Split `transport` and use its halves
    pub fn from_transport<T>(transport: T) -> eyre::Result<Self>
    where
        T: ConsoleTransport<Reader = R, Writer = W>,
    {
        let (reader, writer) = transport.split()?;
        Ok(Self::new(reader, writer))
    }
}

// a panic while holding one of the locks must not make the console unusable
fn relock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<R, W> ConsoleStream for ConnectionStream<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn read_line(&self, buf: &mut String) -> Result<usize, StreamError> {
        Ok(relock(&self.reader).read_line(buf)?)
    }

    fn write_all(&self, buf: &[u8]) -> Result<(), StreamError> {
        Ok(relock(&self.writer).write_all(buf)?)
    }

    fn flush(&self) -> Result<(), StreamError> {
        Ok(relock(&self.writer).flush()?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::{Capability, InMemoryTransport, StreamHandle};

    #[test]
    fn reads_and_writes_over_transport() -> eyre::Result<()> {
        let (session, operator) = InMemoryTransport::pair();
        let console = StreamHandle::new(ConnectionStream::from_transport(session)?);
        let (mut operator_reader, mut operator_writer) = operator.split()?;

        operator_writer.write_all(b"where\r\n")?;
        assert_eq!(console.read_command_line()?, Some("where".to_string()));

        write!(console, "(rdb) ")?;
        console.flush()?;
        let mut prompt = [0u8; 6];
        operator_reader.read_exact(&mut prompt)?;
        assert_eq!(&prompt, b"(rdb) ");

        Ok(())
    }

    #[test]
    fn end_of_input_when_operator_leaves() -> eyre::Result<()> {
        let (session, operator) = InMemoryTransport::pair();
        let console = StreamHandle::new(ConnectionStream::from_transport(session)?);

        drop(operator);

        assert_eq!(console.read_command_line()?, None);
        Ok(())
    }

    #[test]
    fn no_descriptor_on_a_connection() -> eyre::Result<()> {
        let (session, _operator) = InMemoryTransport::pair();
        let console = ConnectionStream::from_transport(session)?;

        assert!(matches!(
            console.fileno(),
            Err(StreamError::Unsupported(Capability::Fileno))
        ));
        assert!(console.is_terminal().unwrap_err().is_unsupported());
        Ok(())
    }
}
