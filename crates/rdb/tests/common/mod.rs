//! Shared test harness: an operator console driving a session over TCP
#![allow(dead_code)]

use std::{
    io::{BufRead, BufReader, IsTerminal, Read, Write},
    net::{Shutdown, SocketAddr, TcpListener, TcpStream},
    time::Duration,
};

use eyre::WrapErr;
use retry::{delay::Fixed, retry};
use tracing_subscriber::EnvFilter;

// test suite "constructor"
#[ctor::ctor]
fn init() {
    let in_ci = std::env::var("CI")
        .map(|val| val == "true")
        .unwrap_or(false);

    if std::io::stderr().is_terminal() || in_ci {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .json()
            .try_init();
    }

    // error traces
    let _ = color_eyre::install();
}

/// A port nothing is listening on right now
pub fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("binding ephemeral port");
    listener.local_addr().unwrap().port()
}

/// The operator end of a session
pub struct Operator {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl Operator {
    /// Connect, retrying while the session is not listening yet
    pub fn connect(addr: SocketAddr) -> eyre::Result<Self> {
        let stream = retry(Fixed::from_millis(20).take(250), || {
            tracing::debug!(%addr, "trying to reach session");
            TcpStream::connect(addr)
        })
        .wrap_err("failed to connect to session")?;
        stream.set_read_timeout(Some(Duration::from_secs(10)))?;

        Ok(Self {
            reader: BufReader::new(stream.try_clone()?),
            writer: stream,
        })
    }

    pub fn connect_port(port: u16) -> eyre::Result<Self> {
        Self::connect(SocketAddr::from(([127, 0, 0, 1], port)))
    }

    /// Everything the session writes up to the next prompt, prompt excluded
    pub fn until_prompt(&mut self) -> eyre::Result<String> {
        let prompt = rdb::DEFAULT_PROMPT.as_bytes();
        let mut out = Vec::new();
        loop {
            let available = self.reader.fill_buf().wrap_err("reading session output")?;
            let Some(&byte) = available.first() else {
                eyre::bail!(
                    "session closed before prompt, got {:?}",
                    String::from_utf8_lossy(&out)
                );
            };
            self.reader.consume(1);
            out.push(byte);
            if out.ends_with(prompt) {
                out.truncate(out.len() - prompt.len());
                return Ok(String::from_utf8(out)?);
            }
        }
    }

    pub fn send(&mut self, line: &str) -> eyre::Result<()> {
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Everything until the session closes the connection
    pub fn read_to_end(&mut self) -> eyre::Result<String> {
        let mut out = String::new();
        self.reader
            .read_to_string(&mut out)
            .wrap_err("waiting for session to close")?;
        Ok(out)
    }

    /// Stop sending; the session sees end of input
    pub fn hang_up(&mut self) -> eyre::Result<()> {
        self.writer.shutdown(Shutdown::Write)?;
        Ok(())
    }
}
