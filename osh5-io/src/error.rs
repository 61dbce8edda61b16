//! I/O error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for convention I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types for the file convention.
#[derive(Error, Debug)]
pub enum Error {
    /// Path does not exist.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Container cannot be parsed as HDF5, or is malformed inside.
    #[error("invalid file format: {0}")]
    Format(String),

    /// No dataset at the file root.
    #[error("no primary dataset found at file root")]
    MissingDataset,

    /// Filename lacks the iteration digit run.
    #[error("no timestamp found in filename: {0:?}")]
    TimestampParse(String),

    /// Neither an explicit filename nor a timestamp to derive one from.
    #[error("no filename given and no timestamp to derive one")]
    MissingFilename,

    /// Text/byte attribute conversion failure.
    #[error("attribute encoding error: {0}")]
    Encoding(String),

    /// Underlying HDF5 write failure.
    #[error("write failed: {0}")]
    StoreWrite(#[source] hdf5::Error),

    /// File system error (e.g. removing an existing destination).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
