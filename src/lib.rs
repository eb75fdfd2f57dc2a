//! # EmberKV
//!
//! A small single-node key-value server with:
//! - A Redis-compatible (RESP2) wire protocol
//! - String and hash maps with single-writer/multi-reader locking
//! - An append-only file (AOF) replayed on startup
//! - One worker thread per client connection
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  protocol::read_value / write_value
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Engine                                 │
//! │        Request shape check → CommandTable dispatch           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │    Store    │          │     AOF     │
//!   │ (RwLock x2) │          │  (Append)   │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod store;
pub mod command;
pub mod aof;
pub mod engine;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{EmberError, Result};
pub use config::Config;
pub use engine::Engine;
pub use protocol::Value;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of EmberKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
