//! AOF Writer
//!
//! Handles appending requests to the log file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::AofSyncStrategy;
use crate::error::{EmberError, Result};
use crate::protocol::{encode_value, Value};

/// Appends encoded requests to the AOF
///
/// The writer is the only handle writing to the file for the life of the
/// process.
pub struct AofWriter {
    file: File,
    path: PathBuf,
    /// Current file length in bytes
    len: u64,
    sync_strategy: AofSyncStrategy,
    /// Appends since the last fsync
    unsynced: usize,
    /// Bytes of a failed append may still sit past `len`
    dirty: bool,
}

impl AofWriter {
    /// Open or create an AOF for appending
    pub fn open(path: &Path, sync_strategy: AofSyncStrategy) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let len = file.metadata()?.len();

        Ok(Self {
            file,
            path: path.to_path_buf(),
            len,
            sync_strategy,
            unsynced: 0,
            dirty: false,
        })
    }

    /// Append one request to the log
    ///
    /// The bytes have reached the OS when this returns; whether they were
    /// also fsynced depends on the sync strategy. Returns the number of
    /// bytes written.
    ///
    /// A failed write is cut back off the file before the error is
    /// returned. If that cut fails too, every later append retries it and
    /// refuses to write until it succeeds.
    pub fn append(&mut self, request: &Value) -> Result<u64> {
        if self.dirty {
            self.discard_partial()?;
        }

        let bytes = encode_value(request);

        if let Err(e) = self.file.write_all(&bytes).and_then(|_| self.file.flush()) {
            if let Err(cut) = self.discard_partial() {
                tracing::error!("{}", cut);
            }
            return Err(EmberError::AofWrite(format!(
                "append to {}: {}",
                self.path.display(),
                e
            )));
        }

        self.len += bytes.len() as u64;
        self.unsynced += 1;

        let due = match self.sync_strategy {
            AofSyncStrategy::EveryWrite => true,
            AofSyncStrategy::EveryNEntries { count } => self.unsynced >= count,
        };
        if due {
            self.sync()?;
        }

        Ok(bytes.len() as u64)
    }

    /// Cut the file back to the end of the last acknowledged record
    ///
    /// Drops whatever a failed append left behind so the next record
    /// starts on a record boundary.
    pub fn discard_partial(&mut self) -> Result<()> {
        self.dirty = true;
        self.file.set_len(self.len).map_err(|e| {
            EmberError::AofWrite(format!(
                "cut {} back to {} bytes: {}",
                self.path.display(),
                self.len,
                e
            ))
        })?;
        self.dirty = false;
        tracing::warn!(
            "AOF {} cut back to {} bytes after a failed append",
            self.path.display(),
            self.len
        );
        Ok(())
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_data().map_err(|e| {
            EmberError::AofWrite(format!("fsync {}: {}", self.path.display(), e))
        })?;
        self.unsynced = 0;
        Ok(())
    }

    /// Current log length in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends not yet fsynced
    pub fn unsynced(&self) -> usize {
        self.unsynced
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
