//! TCP Client
//!
//! Blocking client used by the CLI and the end-to-end tests.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use crate::error::{EmberError, Result};
use crate::protocol::{read_value, write_value, Value};

/// A connection to an EmberKV server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Send one command and wait for its reply
    pub fn request<T: AsRef<[u8]>>(&mut self, words: &[T]) -> Result<Value> {
        self.send(&Value::request(words))
    }

    /// Send an already built value and wait for the reply
    pub fn send(&mut self, value: &Value) -> Result<Value> {
        write_value(&mut self.writer, value)?;
        read_value(&mut self.reader)?.ok_or_else(|| {
            EmberError::Network("server closed the connection".to_string())
        })
    }
}
