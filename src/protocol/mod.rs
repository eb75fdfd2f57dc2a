//! Protocol Module
//!
//! Defines the wire protocol for client-server communication: a subset of
//! RESP2, the Redis serialization protocol.
//!
//! ### Types
//! - `+` simple string
//! - `-` error
//! - `:` integer
//! - `$` bulk string (binary safe, `$-1` is null)
//! - `*` array (`*-1` is null)
//!
//! ### Requests
//! A request is always an array of bulk strings; the first names the
//! command. The append-only log stores requests in this same encoding.

mod value;
mod codec;

pub use value::Value;
pub use codec::{
    decode_value, encode_into, encode_value, read_value, write_value, CRLF, MAX_ARRAY_LEN,
    MAX_BULK_LEN, MAX_LINE_LEN,
};
