//! AOF Recovery
//!
//! Replays the log on startup.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use super::AofReader;
use crate::error::{EmberError, Result};
use crate::protocol::{read_value, Value};

/// Replays and checks AOF files
pub struct AofRecovery;

/// Result of a replay or verification pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of complete records read
    pub records_replayed: u64,

    /// Length of the log up to the end of the last complete record
    pub valid_len: u64,

    /// Whether a partial record was found at the end of the log
    pub was_truncated: bool,
}

impl AofRecovery {
    /// Replay every record of the log through `apply`, in file order
    ///
    /// This will:
    /// 1. Treat a missing file as an empty log
    /// 2. Stop at a partially written final record, move it to
    ///    [`partial_path`](Self::partial_path) and cut it from the log
    /// 3. Fail on a record that is malformed rather than merely cut short
    ///
    /// A record that runs into the end of the file but is followed by
    /// complete records (a damaged length header) counts as malformed.
    pub fn replay<F>(path: &Path, mut apply: F) -> Result<RecoveryResult>
    where
        F: FnMut(Value),
    {
        let result = Self::scan(path, &mut apply)?;

        if result.was_truncated {
            let tail = read_tail(path, result.valid_len)?;
            let partial = Self::partial_path(path);
            fs::write(&partial, &tail)?;

            tracing::warn!(
                "AOF {} ends in a partial record; moved {} bytes to {} and truncated to {} bytes",
                path.display(),
                tail.len(),
                partial.display(),
                result.valid_len
            );
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(result.valid_len)?;
            file.sync_all()?;
        }

        Ok(result)
    }

    /// Check a log without applying or modifying anything
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        Self::scan(path, &mut |_: Value| {})
    }

    /// Where replay keeps the bytes of a partial final record it cut off
    pub fn partial_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".partial");
        path.with_file_name(name)
    }

    fn scan(path: &Path, apply: &mut dyn FnMut(Value)) -> Result<RecoveryResult> {
        let mut reader = match AofReader::open(path) {
            Ok(reader) => reader,
            Err(EmberError::Io(ref e)) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("AOF {} not found, starting empty", path.display());
                return Ok(RecoveryResult::default());
            }
            Err(e) => return Err(e),
        };

        let mut result = RecoveryResult::default();
        loop {
            match reader.next_request() {
                Ok(Some(request)) => {
                    apply(request);
                    result.records_replayed += 1;
                }
                Ok(None) => break,
                Err(EmberError::Io(ref e)) if e.kind() == ErrorKind::UnexpectedEof => {
                    result.was_truncated = true;
                    break;
                }
                Err(EmberError::Protocol(msg)) => {
                    return Err(EmberError::AofCorruption(format!(
                        "{}: bad record after offset {}: {}",
                        path.display(),
                        reader.position(),
                        msg
                    )));
                }
                Err(e) => return Err(e),
            }
        }

        result.valid_len = reader.position();

        if result.was_truncated {
            let tail = read_tail(path, result.valid_len)?;
            if let Some(offset) = complete_record_in(&tail) {
                return Err(EmberError::AofCorruption(format!(
                    "{}: record after offset {} runs to end of file over a complete record at offset {}",
                    path.display(),
                    result.valid_len,
                    result.valid_len + offset as u64
                )));
            }
        }

        Ok(result)
    }
}

/// Bytes of the log from `offset` to the end
fn read_tail(path: &Path, offset: u64) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(offset))?;
    let mut tail = Vec::new();
    file.read_to_end(&mut tail)?;
    Ok(tail)
}

/// Offset of the first complete request array starting on a line boundary
/// inside `tail`, past its first byte
fn complete_record_in(tail: &[u8]) -> Option<usize> {
    (1..tail.len())
        .filter(|&i| tail[i] == b'*' && tail[i - 1] == b'\n')
        .find(|&i| {
            let mut rest = &tail[i..];
            matches!(
                read_value(&mut rest),
                Ok(Some(Value::Array(Some(items)))) if !items.is_empty()
            )
        })
}
