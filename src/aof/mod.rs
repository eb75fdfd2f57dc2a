//! Append-Only File (AOF) Module
//!
//! Provides durability by logging every applied mutating command.
//!
//! ## Responsibilities
//! - Append requests after they were applied to the store
//! - Flush each append to the OS before the reply goes out
//! - Replay the log on startup to rebuild the store
//! - Trim a partially written tail record
//!
//! ## File Format
//! The log is a plain concatenation of requests in the wire encoding.
//! There is no header, checksum or separator beyond the codec framing:
//! ```text
//! *3\r\n$3\r\nSET\r\n$1\r\na\r\n$1\r\n1\r\n
//! *4\r\n$4\r\nHSET\r\n$1\r\nh\r\n$1\r\nf\r\n$1\r\n2\r\n
//! *2\r\n$3\r\nDEL\r\n$1\r\na\r\n
//! ```

mod writer;
mod reader;
mod recovery;

pub use writer::AofWriter;
pub use reader::{AofReader, AofRequests};
pub use recovery::{AofRecovery, RecoveryResult};
