//! Value definitions
//!
//! The single data unit that flows through the codec, the command handlers
//! and the append-only log.

use std::fmt;

use bytes::Bytes;

/// A protocol value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Short status reply, e.g. `OK` or `PONG`
    SimpleString(String),

    /// Error reply; the text starts with an error class such as `ERR`
    Error(String),

    /// Signed 64-bit integer reply
    Integer(i64),

    /// Binary-safe string; `None` is the null bulk string
    BulkString(Option<Bytes>),

    /// Ordered values; `None` is the null array
    Array(Option<Vec<Value>>),
}

impl Value {
    /// The null bulk string (`$-1`)
    pub const NULL: Value = Value::BulkString(None);

    /// The null array (`*-1`)
    pub const NULL_ARRAY: Value = Value::Array(None);

    pub fn simple(text: impl Into<String>) -> Self {
        Value::SimpleString(text.into())
    }

    /// `+OK`
    pub fn ok() -> Self {
        Value::SimpleString("OK".to_string())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Value::Error(message.into())
    }

    pub fn integer(n: i64) -> Self {
        Value::Integer(n)
    }

    pub fn bulk(data: impl Into<Bytes>) -> Self {
        Value::BulkString(Some(data.into()))
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Some(items))
    }

    /// Build a request array out of command words
    pub fn request<I, T>(words: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        Value::array(
            words
                .into_iter()
                .map(|w| Value::bulk(Bytes::copy_from_slice(w.as_ref())))
                .collect(),
        )
    }

    /// Payload of a non-null bulk string
    pub fn as_bulk(&self) -> Option<&Bytes> {
        match self {
            Value::BulkString(Some(data)) => Some(data),
            _ => None,
        }
    }

    /// Elements of a non-null array
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(Some(items)) => Some(items),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// True for both the null bulk string and the null array
    pub fn is_null(&self) -> bool {
        matches!(self, Value::BulkString(None) | Value::Array(None))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::bulk(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::bulk(s.into_bytes())
    }
}

impl From<Vec<u8>> for Value {
    fn from(data: Vec<u8>) -> Self {
        Value::bulk(data)
    }
}

impl From<Bytes> for Value {
    fn from(data: Bytes) -> Self {
        Value::bulk(data)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::array(items)
    }
}

// =============================================================================
// Terminal rendering
// =============================================================================

/// Renders replies the way an interactive client prints them
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(self, f, 0)
    }
}

fn render(value: &Value, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
    match value {
        Value::SimpleString(s) => write!(f, "{}", s),
        Value::Error(e) => write!(f, "(error) {}", e),
        Value::Integer(n) => write!(f, "(integer) {}", n),
        Value::BulkString(Some(data)) => write!(f, "{:?}", String::from_utf8_lossy(data)),
        Value::BulkString(None) | Value::Array(None) => write!(f, "(nil)"),
        Value::Array(Some(items)) if items.is_empty() => write!(f, "(empty array)"),
        Value::Array(Some(items)) => {
            let width = items.len().to_string().len();
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, "\n{:indent$}", "", indent = indent)?;
                }
                write!(f, "{:>width$}) ", i + 1, width = width)?;
                render(item, f, indent + width + 2)?;
            }
            Ok(())
        }
    }
}
