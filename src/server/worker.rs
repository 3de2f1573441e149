//! Listener setup and the accept/serve loop

use crate::error::{Result, ScopeError};
use crate::server::handler::CommandHandler;
use crate::server::protocol::{Request, REQUEST_SIZE};

use socket2::{Domain, Protocol, Socket, Type};
use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Listen backlog for the command socket
const LISTEN_BACKLOG: i32 = 10;

/// How often the accept loop re-checks the shutdown flag
pub const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Receive/send timeout on an accepted connection
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(2);

/// Build the listening socket with SO_REUSEADDR and the fixed backlog
///
/// The listener is non-blocking so the accept loop can poll the shutdown
/// flag between waits. Port 0 binds an ephemeral port, which the test
/// suite relies on.
pub fn bind_listener(port: u16) -> Result<TcpListener> {
    let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    let addr: SocketAddr = SocketAddr::from(([0, 0, 0, 0], port));
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;
    let listener: TcpListener = socket.into();
    listener.set_nonblocking(true)?;
    Ok(listener)
}

/// The command-serving worker
///
/// Owns the listener and the handler; runs until the shutdown flag drops
/// or the listener fails. Transport failures are fatal to the worker (the
/// sampler keeps running); protocol and directory errors only cost the
/// offending connection.
pub struct ServerWorker {
    listener: TcpListener,
    handler: CommandHandler,
    control_word: i64,
    running: Arc<AtomicBool>,
}

impl ServerWorker {
    /// Create a worker over an already-bound listener
    pub fn new(
        listener: TcpListener,
        handler: CommandHandler,
        control_word: i64,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            listener,
            handler,
            control_word,
            running,
        }
    }

    /// Run the accept loop until shutdown or a fatal listener error
    pub fn run(&mut self) {
        tracing::info!("command server started");
        while self.running.load(Ordering::SeqCst) {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    if let Err(e) = self.serve_connection(stream) {
                        // Connection is already closed; log and keep serving
                        tracing::warn!(%peer, error = %e, "request failed");
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    std::thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::error!(error = %e, "listener wait failed, server stopping");
                    break;
                }
            }
        }
        tracing::info!("command server stopped");
    }

    /// Serve exactly one request on an accepted connection
    ///
    /// The connection is closed on every path, including errors.
    fn serve_connection(&self, mut stream: TcpStream) -> Result<()> {
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(CONNECTION_TIMEOUT))?;
        stream.set_write_timeout(Some(CONNECTION_TIMEOUT))?;

        let mut buf = [0u8; REQUEST_SIZE];
        stream.read_exact(&mut buf).map_err(|e| {
            if e.kind() == ErrorKind::UnexpectedEof {
                ScopeError::Protocol("undersized request".to_string())
            } else {
                ScopeError::Io(e)
            }
        })?;

        let request = Request::parse(&buf)?;
        if request.control != self.control_word {
            return Err(ScopeError::Protocol(format!(
                "control word mismatch: got 0x{:X}, expected 0x{:X}",
                request.control, self.control_word
            )));
        }

        tracing::debug!(command = ?request.command, selector = request.selector, "request");
        let response = self.handler.execute(&request)?;
        if !response.is_empty() {
            stream.write_all(response.as_bytes())?;
        }
        let _ = stream.shutdown(Shutdown::Both);
        Ok(())
    }
}
