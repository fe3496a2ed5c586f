//! Record reader
//!
//! Loads the raw text of one record. Size is checked before the read so an
//! oversized file is never pulled into memory.

use crate::config::DEFAULT_MAX_FILE_SIZE;
use crate::error::ReadError;
use std::path::Path;

/// Reads record files as UTF-8 text
#[derive(Debug, Clone, Copy)]
pub struct RecordReader {
    max_file_size: u64,
}

impl Default for RecordReader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE)
    }
}

impl RecordReader {
    /// Create reader with a size limit
    #[inline]
    #[must_use]
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// Read one record
    ///
    /// A leading byte order mark is removed.
    ///
    /// # Errors
    /// - `ReadError::Io` if the file cannot be read
    /// - `ReadError::TooLarge` if it exceeds the limit
    /// - `ReadError::NotUtf8` if the content is not UTF-8
    pub fn read(&self, path: &Path) -> Result<String, ReadError> {
        let size = std::fs::metadata(path)
            .map_err(|e| ReadError::io_error(path, e))?
            .len();
        if size > self.max_file_size {
            return Err(ReadError::TooLarge {
                path: path.to_path_buf(),
                size,
                limit: self.max_file_size,
            });
        }

        let bytes = std::fs::read(path).map_err(|e| ReadError::io_error(path, e))?;
        let mut text = String::from_utf8(bytes).map_err(|source| ReadError::NotUtf8 {
            path: path.to_path_buf(),
            source,
        })?;

        if text.starts_with('\u{feff}') {
            text.drain(..'\u{feff}'.len_utf8());
        }
        Ok(text)
    }
}
