//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::engine::Engine;
use crate::error::{EmberError, Result};
use crate::protocol::{read_value, write_value, Value};

/// Connection-level verb that stops the server
const SHUTDOWN: &str = "SHUTDOWN";

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Reference to the engine
    engine: Arc<Engine>,

    /// Raised to stop the accept loop
    shutdown: Arc<AtomicBool>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O
    pub fn new(stream: TcpStream, engine: Arc<Engine>, shutdown: Arc<AtomicBool>) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            engine,
            shutdown,
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 leaves the socket blocking forever)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let read_stream = self.reader.get_ref();
        let write_stream = self.writer.get_ref();

        if read_ms > 0 {
            read_stream.set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            write_stream.set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads requests in a loop and sends replies.
    /// Returns when the client disconnects or an error occurs.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            // Read next request
            let request = match read_value(&mut self.reader) {
                Ok(Some(value)) => value,
                Ok(None) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(ref e) if e.is_disconnect() => {
                    tracing::debug!("Connection to {} closed: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(EmberError::Io(ref e))
                    if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    // Read timeout (Windows uses TimedOut instead of WouldBlock)
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    // Send error reply if possible, then drop the connection
                    let _ = self.send(&Value::error(format!("ERR {}", e)));
                    return Err(e);
                }
            };

            tracing::trace!("Received request from {}: {:?}", self.peer_addr, request);

            if Self::is_shutdown(&request) {
                return self.shutdown_server();
            }

            let reply = match self.engine.execute(&request) {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::warn!("Request from {} failed: {}", self.peer_addr, e);
                    let _ = self.send(&Value::error(format!("ERR {}", e)));
                    return Err(e);
                }
            };

            // Send reply
            if let Err(e) = self.send(&reply) {
                // If the client went away before we could reply, log and exit
                // gracefully rather than treating it as a server error.
                if e.is_disconnect() {
                    tracing::debug!(
                        "Client {} disconnected before reply could be sent: {}",
                        self.peer_addr, e
                    );
                    return Ok(());
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    fn is_shutdown(request: &Value) -> bool {
        request
            .as_array()
            .and_then(|items| items.first())
            .and_then(Value::as_bulk)
            .map(|name| name.eq_ignore_ascii_case(SHUTDOWN.as_bytes()))
            .unwrap_or(false)
    }

    /// Sync the log, acknowledge, and tell the server to stop accepting
    fn shutdown_server(&mut self) -> Result<()> {
        tracing::info!("SHUTDOWN requested by {}", self.peer_addr);
        if let Err(e) = self.engine.sync() {
            tracing::error!("Failed to sync AOF before shutdown: {}", e);
            let _ = self.send(&Value::error(format!("ERR {}", e)));
            return Err(e);
        }
        self.shutdown.store(true, Ordering::SeqCst);
        let _ = self.send(&Value::ok());
        Ok(())
    }

    /// Send a reply to the client
    fn send(&mut self, reply: &Value) -> Result<()> {
        write_value(&mut self.writer, reply)
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
