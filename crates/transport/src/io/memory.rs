//! In-memory transport implementation for testing

use std::io::{self, BufRead, Cursor, Read, Write};

use crossbeam_channel::{Receiver, Sender};

use super::ConsoleTransport;

/// In-memory transport for testing
///
/// This transport uses channels for bidirectional communication without
/// requiring actual network connections.
///
/// # Examples
///
/// ```
/// use std::io::{BufRead, Write};
/// use transport::io::{ConsoleTransport, InMemoryTransport};
///
/// let (session, operator) = InMemoryTransport::pair();
/// let (_session_reader, mut session_writer) = session.split()?;
/// let (mut operator_reader, _operator_writer) = operator.split()?;
///
/// session_writer.write_all(b"(rdb) \n")?;
/// let mut line = String::new();
/// operator_reader.read_line(&mut line)?;
/// assert_eq!(line, "(rdb) \n");
/// # Ok::<(), eyre::Error>(())
/// ```
pub struct InMemoryTransport {
    reader: InMemoryReader,
    writer: InMemoryWriter,
}

/// Reader half of in-memory transport
///
/// Implements [`BufRead`] by reading from a channel and maintaining an
/// internal buffer. Reads block until the peer writes; once every writer of
/// the peer is gone the reader reports end of input.
pub struct InMemoryReader {
    buffer: Cursor<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
}

/// Writer half of in-memory transport
pub struct InMemoryWriter {
    tx: Sender<Vec<u8>>,
}

impl InMemoryTransport {
    /// Create a connected pair of in-memory transports
    ///
    /// Data written to one can be read from the other.
    pub fn pair() -> (Self, Self) {
        let (left_tx, right_rx) = crossbeam_channel::unbounded();
        let (right_tx, left_rx) = crossbeam_channel::unbounded();

        let left = Self {
            reader: InMemoryReader {
                buffer: Cursor::new(Vec::new()),
                rx: left_rx,
            },
            writer: InMemoryWriter { tx: left_tx },
        };

        let right = Self {
            reader: InMemoryReader {
                buffer: Cursor::new(Vec::new()),
                rx: right_rx,
            },
            writer: InMemoryWriter { tx: right_tx },
        };

        (left, right)
    }
}

impl ConsoleTransport for InMemoryTransport {
    type Reader = InMemoryReader;
    type Writer = InMemoryWriter;

    fn split(self) -> eyre::Result<(Self::Reader, Self::Writer)> {
        Ok((self.reader, self.writer))
    }
}

impl BufRead for InMemoryReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        while self.buffer.position() >= self.buffer.get_ref().len() as u64 {
            match self.rx.recv() {
                Ok(data) => self.buffer = Cursor::new(data),
                // every sender is gone
                Err(_) => return Ok(&[]),
            }
        }

        self.buffer.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.buffer.consume(amt)
    }
}

impl Read for InMemoryReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let len = std::cmp::min(available.len(), buf.len());
        buf[..len].copy_from_slice(&available[..len]);
        self.consume(len);
        Ok(len)
    }
}

impl Write for InMemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.tx
            .send(buf.to_vec())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "channel disconnected"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
