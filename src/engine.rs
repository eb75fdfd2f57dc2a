//! Engine Module
//!
//! The core engine that coordinates all components.
//!
//! ## Responsibilities
//! - Rebuild the store from the AOF on startup
//! - Route requests through the command table
//! - Append applied mutations to the AOF before replying
//! - Handle concurrent read/write access

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::aof::{AofRecovery, AofWriter, RecoveryResult};
use crate::command::{CommandTable, Dispatch, Request};
use crate::config::Config;
use crate::error::Result;
use crate::protocol::Value;
use crate::store::Store;

/// The main engine
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Writes** (SET/HSET/DEL/HDEL): Serialized by the `aof` mutex
///   - Held across store mutation and log append
///   - Log order therefore equals apply order
///
/// - **Reads** (GET/HGET/...): Never touch the `aof` mutex
///   - Only take the read lock of the map they look at
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// In-memory data (internal RwLock per map)
    store: Store,

    /// Registered commands
    commands: CommandTable,

    /// Append-only log; its mutex doubles as the write lock
    aof: Mutex<AofWriter>,

    /// Outcome of the startup replay
    recovery: RecoveryResult,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Create the data directory
    /// 2. Replay the AOF into an empty store
    /// 3. Open the AOF for appending
    /// 4. Ready to serve requests
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        // Step 1: Create data directory if it doesn't exist
        fs::create_dir_all(&config.data_dir)?;
        let aof_path = config.aof_path();

        // Step 2: Replay, applying each record exactly as a live request but
        // without logging it again or replying to anyone
        let store = Store::new();
        let commands = CommandTable::new();
        let recovery = AofRecovery::replay(&aof_path, |request| {
            Self::apply_replayed(&store, &commands, &request)
        })?;

        if recovery.records_replayed > 0 || recovery.was_truncated {
            tracing::info!(
                "AOF replay: {} records, {} bytes, truncated={}",
                recovery.records_replayed,
                recovery.valid_len,
                recovery.was_truncated
            );
        }

        // Step 3: Open for appending (after any truncation)
        let aof = AofWriter::open(&aof_path, config.aof_sync_strategy)?;

        Ok(Self {
            config,
            store,
            commands,
            aof: Mutex::new(aof),
            recovery,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let mut config = Config::default();
        config.data_dir = path.to_path_buf();
        Self::open(config)
    }

    fn apply_replayed(store: &Store, commands: &CommandTable, request: &Value) {
        let request = match Request::try_from(request) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("Skipping malformed AOF record: {}", e);
                return;
            }
        };

        match commands.dispatch(store, &request) {
            Dispatch::Reply { value, .. } if value.is_error() => {
                tracing::warn!("AOF record {} failed on replay: {:?}", request.name, value);
            }
            Dispatch::Reply { .. } => {}
            Dispatch::Unknown(name) => {
                tracing::warn!("Skipping unknown command in AOF: {}", name);
            }
        }
    }

    /// Execute a request
    ///
    /// Returns the reply to send. Only malformed requests and AOF failures
    /// are errors; command-level problems are `Value::Error` replies.
    pub fn execute(&self, request: &Value) -> Result<Value> {
        let parsed = Request::try_from(request)?;

        // Writers hold the log for the whole apply + append step
        let mut aof = if self.commands.is_mutating(&parsed.name) {
            Some(self.aof.lock())
        } else {
            None
        };

        match self.commands.dispatch(&self.store, &parsed) {
            Dispatch::Reply { value, mutated } => {
                if mutated {
                    if let Some(aof) = aof.as_mut() {
                        if let Err(e) = aof.append(request) {
                            tracing::error!(
                                "{} applied but not logged; durability lost: {}",
                                parsed.name,
                                e
                            );
                            return Err(e);
                        }
                    }
                }
                Ok(value)
            }
            Dispatch::Unknown(name) => {
                tracing::warn!("Unknown command: {}", name);
                Ok(Self::unknown_command_reply())
            }
        }
    }

    /// Reply sent for a command name with no handler: an empty status
    /// line, so clients keep the connection in step
    pub fn unknown_command_reply() -> Value {
        Value::simple("")
    }

    /// fsync the AOF
    pub fn sync(&self) -> Result<()> {
        self.aof.lock().sync()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// The in-memory store
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The command registry
    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    /// Path of the append-only log
    pub fn aof_path(&self) -> PathBuf {
        self.config.aof_path()
    }

    /// Current AOF length in bytes
    pub fn aof_len(&self) -> u64 {
        self.aof.lock().len()
    }

    /// What the startup replay found
    pub fn recovery(&self) -> &RecoveryResult {
        &self.recovery
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
