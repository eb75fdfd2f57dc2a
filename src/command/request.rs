//! Request definitions
//!
//! A decoded client request, checked for shape before dispatch.

use bytes::Bytes;

use crate::error::{EmberError, Result};
use crate::protocol::Value;

/// A command name with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Command name, uppercased
    pub name: String,

    /// Raw arguments after the name
    pub args: Vec<Bytes>,
}

impl Request {
    pub fn new(name: impl AsRef<str>, args: Vec<Bytes>) -> Self {
        Self {
            name: name.as_ref().to_ascii_uppercase(),
            args,
        }
    }
}

impl TryFrom<&Value> for Request {
    type Error = EmberError;

    /// A request must be a non-empty array of non-null bulk strings
    fn try_from(value: &Value) -> Result<Self> {
        let items = match value {
            Value::Array(Some(items)) if !items.is_empty() => items,
            Value::Array(Some(_)) => {
                return Err(EmberError::Protocol("Empty request array".to_string()))
            }
            _ => {
                return Err(EmberError::Protocol(
                    "Request must be an array of bulk strings".to_string(),
                ))
            }
        };

        let mut words = Vec::with_capacity(items.len());
        for item in items {
            match item.as_bulk() {
                Some(word) => words.push(word.clone()),
                None => {
                    return Err(EmberError::Protocol(
                        "Request elements must be bulk strings".to_string(),
                    ))
                }
            }
        }

        let args = words.split_off(1);
        let name = String::from_utf8_lossy(&words[0]);
        Ok(Request::new(name, args))
    }
}
