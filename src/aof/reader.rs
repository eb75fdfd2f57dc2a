//! AOF Reader
//!
//! Handles reading requests back from the log file.

use std::fs::File;
use std::io::{BufReader, Seek};
use std::path::Path;

use crate::error::Result;
use crate::protocol::{read_value, Value};

/// Reads requests from the AOF
pub struct AofReader {
    file: BufReader<File>,
    /// End offset of the last complete record
    position: u64,
}

impl AofReader {
    /// Open an AOF for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            file: BufReader::new(file),
            position: 0,
        })
    }

    /// Read the next request from the log
    ///
    /// Returns `Ok(None)` at a clean end of file. A record cut short by the
    /// end of the file comes back as an `Io(UnexpectedEof)` error; anything
    /// undecodable is a `Protocol` error.
    pub fn next_request(&mut self) -> Result<Option<Value>> {
        let value = read_value(&mut self.file)?;
        if value.is_some() {
            self.position = self.file.stream_position()?;
        }
        Ok(value)
    }

    /// Byte offset just past the last complete record read so far
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Iterate over all requests
    pub fn requests(self) -> AofRequests {
        AofRequests {
            reader: self,
            done: false,
        }
    }
}

/// Iterator over AOF requests
///
/// Yields the first error it hits, then stops.
pub struct AofRequests {
    reader: AofReader,
    done: bool,
}

impl Iterator for AofRequests {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_request() {
            Ok(Some(value)) => Some(Ok(value)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
