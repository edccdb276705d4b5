//! Unified error type for all storage operations.

use std::path::PathBuf;
use thiserror::Error;

/// Things that can go wrong when opening or saving a storage.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// The backing file was missing and could not be created (directory or
    /// file creation failed).
    #[error("cannot create storage file {}: {source}", .path.display())]
    Create {
        /// File that was being created.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The backing file exists but could not be read.
    #[error("cannot read storage file {}: {source}", .path.display())]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The backing file is not valid JSON.
    #[error("storage file {} is not valid JSON: {source}", .path.display())]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser error, with line/column.
        source: serde_json::Error,
    },

    /// The backing file is valid JSON but of the wrong top-level type.
    #[error("storage file {} holds a JSON {found}, expected an {expected}", .path.display())]
    Shape {
        /// File that was loaded.
        path: PathBuf,
        /// Top-level type the storage needs (`object` or `array`).
        expected: &'static str,
        /// Top-level type actually found.
        found: &'static str,
    },

    /// Writing the serialized storage back to disk failed.
    #[error("cannot write storage file {}: {source}", .path.display())]
    Write {
        /// File that was being written.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// A typed accessor could not convert to or from a JSON value.
    #[error("value conversion error: {0}")]
    Value(#[from] serde_json::Error),

    /// Bad configuration (autosave without a runtime, etc.).
    #[error("config error: {0}")]
    Config(String),
}

/// Result alias using our [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
