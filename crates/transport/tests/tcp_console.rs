//! Integration tests for a console running over a real TCP connection

use std::{
    io::{BufRead, IsTerminal, Write},
    net::TcpListener,
    thread,
};

use eyre::Result;
use tracing_subscriber::EnvFilter;
use transport::{
    Capability, ConnectionStream, ConsoleStream, FallbackStream, LocalStream, StreamError,
    StreamHandle, TcpTransport,
    io::ConsoleTransport,
};

#[ctor::ctor]
fn init() {
    if std::io::stderr().is_terminal() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .json()
            .try_init();
    }

    let _ = color_eyre::install();
}

fn accept_console(listener: &TcpListener) -> Result<StreamHandle> {
    let (stream, _) = listener.accept()?;
    let connection = ConnectionStream::from_transport(TcpTransport::new(stream)?)?;
    Ok(StreamHandle::new(FallbackStream::new(
        connection,
        LocalStream::Stdin,
    )))
}

#[test]
fn test_operator_round_trip() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;

    let operator = thread::spawn(move || -> Result<Vec<String>> {
        let (reader, mut writer) = TcpTransport::connect(addr)?.split()?;
        writer.write_all(b"where\nhelp\n")?;
        writer.flush()?;
        let lines = reader.lines().collect::<std::io::Result<Vec<_>>>()?;
        Ok(lines)
    });

    let console = accept_console(&listener)?;
    assert_eq!(console.read_command_line()?.as_deref(), Some("where"));
    writeln!(console, "stopped at main.rs:3")?;
    assert_eq!(console.read_command_line()?.as_deref(), Some("help"));
    writeln!(console, "commands: where help")?;
    console.flush()?;
    drop(console);

    let lines = operator.join().unwrap()?;
    assert_eq!(lines, vec!["stopped at main.rs:3", "commands: where help"]);
    Ok(())
}

#[test]
fn test_local_capabilities_behind_connection() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let operator = thread::spawn(move || TcpTransport::connect(addr));

    let console = accept_console(&listener)?;
    let _operator = operator.join().unwrap()?;

    // answered by the local stdin
    assert_eq!(console.is_terminal()?, std::io::stdin().is_terminal());
    #[cfg(unix)]
    assert_eq!(console.fileno()?, 0);
    Ok(())
}

#[test]
fn test_end_of_input_after_operator_hangs_up() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let operator = thread::spawn(move || -> Result<()> {
        let (_reader, mut writer) = TcpTransport::connect(addr)?.split()?;
        writer.write_all(b"where")?;
        Ok(())
    });

    let console = accept_console(&listener)?;
    operator.join().unwrap()?;

    // the final unterminated line is still delivered
    assert_eq!(console.read_command_line()?.as_deref(), Some("where"));
    assert_eq!(console.read_command_line()?, None);

    let unsupported = StreamHandle::new(LocalStream::Stdout);
    assert!(matches!(
        unsupported.read_command_line(),
        Err(StreamError::Unsupported(Capability::ReadLine))
    ));
    Ok(())
}
