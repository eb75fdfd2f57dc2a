//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! Every value starts with a one-byte type marker; lines end in CRLF.
//! ```text
//! +OK\r\n                          simple string
//! -ERR message\r\n                 error
//! :42\r\n                          integer
//! $5\r\nhello\r\n                  bulk string   ($-1\r\n = null)
//! *2\r\n$3\r\nGET\r\n$1\r\nk\r\n   array         (*-1\r\n = null)
//! ```

use std::io::{BufRead, Cursor, ErrorKind, Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use super::Value;
use crate::error::{EmberError, Result};

/// Line terminator
pub const CRLF: &[u8] = b"\r\n";

/// Maximum bulk string payload (512 MB)
pub const MAX_BULK_LEN: i64 = 512 * 1024 * 1024;

/// Maximum number of array elements
pub const MAX_ARRAY_LEN: i64 = 1024 * 1024;

/// Maximum length of a single header/status line, terminator included
pub const MAX_LINE_LEN: usize = 64 * 1024;

// =============================================================================
// Encoding
// =============================================================================

/// Encode a value to bytes
pub fn encode_value(value: &Value) -> Bytes {
    let mut buf = BytesMut::with_capacity(encoded_len_hint(value));
    encode_into(value, &mut buf);
    buf.freeze()
}

/// Append the encoding of `value` to `buf`
pub fn encode_into(value: &Value, buf: &mut BytesMut) {
    match value {
        Value::SimpleString(s) => put_line(buf, b'+', s.as_bytes()),
        Value::Error(e) => put_line(buf, b'-', e.as_bytes()),
        Value::Integer(n) => put_line(buf, b':', n.to_string().as_bytes()),
        Value::BulkString(None) => put_line(buf, b'$', b"-1"),
        Value::BulkString(Some(data)) => {
            put_line(buf, b'$', data.len().to_string().as_bytes());
            buf.put_slice(data);
            buf.put_slice(CRLF);
        }
        Value::Array(None) => put_line(buf, b'*', b"-1"),
        Value::Array(Some(items)) => {
            put_line(buf, b'*', items.len().to_string().as_bytes());
            for item in items {
                encode_into(item, buf);
            }
        }
    }
}

fn put_line(buf: &mut BytesMut, marker: u8, content: &[u8]) {
    buf.reserve(1 + content.len() + CRLF.len());
    buf.put_u8(marker);
    buf.put_slice(content);
    buf.put_slice(CRLF);
}

/// Rough size so most values encode without reallocating
fn encoded_len_hint(value: &Value) -> usize {
    match value {
        Value::SimpleString(s) | Value::Error(s) => s.len() + 3,
        Value::Integer(_) => 24,
        Value::BulkString(Some(data)) => data.len() + 16,
        Value::BulkString(None) | Value::Array(None) => 5,
        Value::Array(Some(items)) => 16 + items.iter().map(encoded_len_hint).sum::<usize>(),
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode one complete value from a buffer
///
/// Trailing bytes after the value are ignored. An empty or incomplete
/// buffer is an error.
pub fn decode_value(bytes: &[u8]) -> Result<Value> {
    let mut cursor = Cursor::new(bytes);
    match read_value(&mut cursor) {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(EmberError::Protocol("Empty input".to_string())),
        Err(EmberError::Io(ref e)) if e.kind() == ErrorKind::UnexpectedEof => Err(
            EmberError::Protocol(format!("Incomplete value: {} bytes", bytes.len())),
        ),
        Err(e) => Err(e),
    }
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete value from a stream
///
/// Blocks until a complete value is received or an error occurs.
///
/// Returns:
/// - `Ok(Some(value))`: one value decoded
/// - `Ok(None)`: the stream ended cleanly before the first byte of a value
/// - `Err(Io(UnexpectedEof))`: the stream ended inside a value
/// - `Err(Protocol(_))`: the bytes are not a valid encoding
pub fn read_value<R: BufRead>(reader: &mut R) -> Result<Option<Value>> {
    // Peek so a clean end of stream can be told apart from a truncated value
    if reader.fill_buf()?.is_empty() {
        return Ok(None);
    }
    read_value_inner(reader).map(Some)
}

fn read_value_inner<R: BufRead>(reader: &mut R) -> Result<Value> {
    let line = read_line(reader)?;
    let (marker, content) = match line.split_first() {
        Some((marker, content)) => (*marker, content),
        None => return Err(EmberError::Protocol("Empty line where a type marker was expected".to_string())),
    };

    match marker {
        b'+' => Ok(Value::SimpleString(line_text(content)?)),
        b'-' => Ok(Value::Error(line_text(content)?)),
        b':' => Ok(Value::Integer(parse_integer(content)?)),
        b'$' => read_bulk(reader, content),
        b'*' => read_array(reader, content),
        _ => Err(EmberError::Protocol(format!(
            "Unknown type marker: 0x{:02x}",
            marker
        ))),
    }
}

fn read_bulk<R: BufRead>(reader: &mut R, header: &[u8]) -> Result<Value> {
    let len = parse_integer(header)?;
    if len == -1 {
        return Ok(Value::BulkString(None));
    }
    if !(0..=MAX_BULK_LEN).contains(&len) {
        return Err(EmberError::Protocol(format!("Invalid bulk length: {}", len)));
    }
    let len = len as usize;

    // Grow as data arrives instead of trusting the header for the allocation
    let mut data = Vec::with_capacity(len.min(64 * 1024));
    reader.by_ref().take(len as u64).read_to_end(&mut data)?;
    if data.len() < len {
        return Err(unexpected_eof());
    }

    let mut terminator = [0u8; 2];
    reader.read_exact(&mut terminator)?;
    if terminator != CRLF {
        return Err(EmberError::Protocol(
            "Bulk string not terminated by CRLF".to_string(),
        ));
    }

    Ok(Value::BulkString(Some(Bytes::from(data))))
}

fn read_array<R: BufRead>(reader: &mut R, header: &[u8]) -> Result<Value> {
    let count = parse_integer(header)?;
    if count == -1 {
        return Ok(Value::Array(None));
    }
    if !(0..=MAX_ARRAY_LEN).contains(&count) {
        return Err(EmberError::Protocol(format!("Invalid array length: {}", count)));
    }

    let count = count as usize;
    let mut items = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        items.push(read_value_inner(reader)?);
    }
    Ok(Value::Array(Some(items)))
}

/// Read one CRLF-terminated line, returning it without the terminator
fn read_line<R: BufRead>(reader: &mut R) -> Result<Vec<u8>> {
    let mut line = Vec::new();
    let read = reader
        .by_ref()
        .take(MAX_LINE_LEN as u64)
        .read_until(b'\n', &mut line)?;

    if read == 0 || line.last() != Some(&b'\n') {
        if line.len() >= MAX_LINE_LEN {
            return Err(EmberError::Protocol(format!(
                "Line exceeds {} bytes",
                MAX_LINE_LEN
            )));
        }
        return Err(unexpected_eof());
    }
    if !line.ends_with(CRLF) {
        return Err(EmberError::Protocol(
            "Line terminated by LF without CR".to_string(),
        ));
    }

    line.truncate(line.len() - CRLF.len());
    Ok(line)
}

fn line_text(content: &[u8]) -> Result<String> {
    String::from_utf8(content.to_vec())
        .map_err(|_| EmberError::Protocol("Invalid UTF-8 in line".to_string()))
}

/// Parse a decimal integer; an optional `-` is the only sign allowed
fn parse_integer(content: &[u8]) -> Result<i64> {
    std::str::from_utf8(content)
        .ok()
        .filter(|s| !s.starts_with('+'))
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| {
            EmberError::Protocol(format!(
                "Invalid integer: '{}'",
                String::from_utf8_lossy(content)
            ))
        })
}

fn unexpected_eof() -> EmberError {
    EmberError::Io(std::io::Error::new(
        ErrorKind::UnexpectedEof,
        "stream ended inside a value",
    ))
}

/// Write a value to a stream
pub fn write_value<W: Write>(writer: &mut W, value: &Value) -> Result<()> {
    let bytes = encode_value(value);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
