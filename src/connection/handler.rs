//! Connection Handler Module
//!
//! This module handles individual client connections to NeuronKV.
//! Each client gets its own handler task that runs in a loop,
//! reading lines and sending replies.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects (TCP handshake)
//!        │
//!        ▼
//! 2. ConnectionHandler spawned
//!        │
//!        ▼
//! 3. ┌──────────────────────────────┐
//!    │      Main Loop               │
//!    │                              │
//!    │  Read bytes from socket      │
//!    │  Split off complete lines    │
//!    │  Execute each command        │
//!    │  Send each reply             │
//!    │         [Loop back]          │
//!    └──────────────────────────────┘
//!        │
//!        ▼
//! 4. Peer closes / bad bytes / I/O error / server shutdown
//!        │
//!        ▼
//! 5. Stream shut down and dropped, handler task ends
//! ```
//!
//! Command errors never end the loop; they are sent back as error replies.
//!
//! ## Buffer Management
//!
//! We use a BytesMut buffer to accumulate incoming data. TCP is a stream
//! protocol, so a read can hold half a line or several lines at once.

use crate::commands::CommandHandler;
use crate::protocol::{find_line, Reply};
use crate::shutdown::Shutdown;
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, info, trace, warn};

/// Longest unterminated line we buffer before closing the connection (64 KB)
const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// How long closing the stream may wait for unsent replies
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Statistics for connection handling
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total commands processed
    pub commands_processed: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn command_processed(&self) {
        self.commands_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Handles a single client connection.
///
/// Generic over the stream so it can run over a `TcpStream` or any other
/// duplex byte stream.
pub struct ConnectionHandler<S> {
    /// The client stream, buffered for writes
    stream: BufWriter<S>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Buffer for incoming data
    buffer: BytesMut,

    /// The command handler (shared across connections)
    command_handler: CommandHandler,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,

    /// Server shutdown listener
    shutdown: Shutdown,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new connection handler.
    pub fn new(
        stream: S,
        addr: SocketAddr,
        command_handler: CommandHandler,
        stats: Arc<ConnectionStats>,
        shutdown: Shutdown,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            command_handler,
            stats,
            shutdown,
        }
    }

    /// Runs the connection until the client leaves, a transport error occurs,
    /// or the server shuts down.
    ///
    /// The stream is shut down and released on every exit path.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => info!(client = %self.addr, "Connection closed by server"),
            Err(e) => match e {
                ConnectionError::ClientDisconnected => {
                    info!(client = %self.addr, "Client disconnected")
                }
                ConnectionError::Io(io_err)
                    if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
                {
                    debug!(client = %self.addr, "Connection reset by client")
                }
                _ => warn!(client = %self.addr, error = %e, "Connection error"),
            },
        }

        // A peer that stopped reading would block the flush forever
        match tokio::time::timeout(CLOSE_TIMEOUT, self.stream.shutdown()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => trace!(client = %self.addr, error = %e, "Stream shutdown failed"),
            Err(_) => debug!(client = %self.addr, "Dropping unsent replies on close"),
        }
        self.stats.connection_closed();
        result
    }

    /// The main read-execute-reply loop.
    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            while let Some(line) = self.try_read_line()? {
                let reply = self.command_handler.execute_line(&line);
                self.stats.command_processed();
                if !self.send_reply(&reply).await? {
                    debug!(client = %self.addr, "Shutdown signal received while writing");
                    return Ok(());
                }
            }

            if self.shutdown.is_shutdown() {
                return Ok(());
            }

            self.check_buffer_limit()?;

            // Ensure we have some capacity
            if self.buffer.capacity() - self.buffer.len() < 1024 {
                self.buffer.reserve(4096);
            }

            let n = tokio::select! {
                read = self.stream.get_mut().read_buf(&mut self.buffer) => read?,
                _ = self.shutdown.recv() => {
                    debug!(client = %self.addr, "Shutdown signal received");
                    return Ok(());
                }
            };

            if n == 0 {
                // Connection closed by client
                return if self.buffer.is_empty() {
                    Err(ConnectionError::ClientDisconnected)
                } else {
                    Err(ConnectionError::UnexpectedEof)
                };
            }

            self.stats.bytes_read(n);
            trace!(client = %self.addr, bytes = n, "Read data");
        }
    }

    /// Splits the next complete line off the buffer.
    fn try_read_line(&mut self) -> Result<Option<String>, ConnectionError> {
        let Some((line_len, consumed)) = find_line(&self.buffer) else {
            return Ok(None);
        };

        let frame = self.buffer.split_to(consumed);
        let line = std::str::from_utf8(&frame[..line_len])?;

        trace!(
            client = %self.addr,
            consumed = consumed,
            remaining = self.buffer.len(),
            "Read line"
        );
        Ok(Some(line.to_owned()))
    }

    fn check_buffer_limit(&self) -> Result<(), ConnectionError> {
        if self.buffer.len() >= MAX_LINE_LENGTH {
            warn!(
                client = %self.addr,
                size = self.buffer.len(),
                "Line length limit exceeded"
            );
            return Err(ConnectionError::LineTooLong);
        }
        Ok(())
    }

    /// Sends a reply to the client.
    ///
    /// Returns `false` if shutdown was signalled before the reply was fully
    /// written.
    async fn send_reply(&mut self, reply: &Reply) -> Result<bool, ConnectionError> {
        let bytes = reply.serialize();

        let stream = &mut self.stream;
        let shutdown = &mut self.shutdown;
        let write = async {
            stream.write_all(&bytes).await?;
            stream.flush().await
        };

        tokio::select! {
            written = write => written?,
            _ = shutdown.recv() => return Ok(false),
        }

        self.stats.bytes_written(bytes.len());
        if reply.is_error() {
            debug!(client = %self.addr, reply = %reply, "Sent error reply");
        } else {
            trace!(client = %self.addr, reply = %reply, "Sent reply");
        }
        Ok(true)
    }
}

/// Errors that end a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The client sent bytes that are not valid UTF-8
    #[error("invalid UTF-8 in request: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Client disconnected normally
    #[error("Client disconnected")]
    ClientDisconnected,

    /// Client disconnected in the middle of a line
    #[error("Unexpected end of stream")]
    UnexpectedEof,

    /// The client sent a line longer than the buffer limit
    #[error("Line length limit exceeded")]
    LineTooLong,
}

/// Handles a client connection.
///
/// This is a convenience function that creates a ConnectionHandler
/// and runs it to completion. Errors are logged, not returned.
pub async fn handle_connection<S>(
    stream: S,
    addr: SocketAddr,
    command_handler: CommandHandler,
    stats: Arc<ConnectionStats>,
    shutdown: Shutdown,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let handler = ConnectionHandler::new(stream, addr, command_handler, stats, shutdown);
    if let Err(e) = handler.run().await {
        match e {
            ConnectionError::ClientDisconnected => {}
            ConnectionError::Io(ref io_err)
                if io_err.kind() == std::io::ErrorKind::ConnectionReset => {}
            _ => {
                debug!(client = %addr, error = %e, "Connection ended with error");
            }
        }
    }
}
