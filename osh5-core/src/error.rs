//! Error types for osh5-core.

use thiserror::Error;

/// Result type alias for core model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the data model.
#[derive(Error, Debug)]
pub enum Error {
    /// Units expression could not be parsed.
    #[error("cannot parse units expression: {0:?}")]
    UnitsParse(String),

    /// Axis count does not match array rank.
    #[error("have {axes} axes but array is {rank}-dimensional")]
    AxisRankMismatch { axes: usize, rank: usize },

    /// Axis point count does not match the array dimension it describes.
    #[error("axis {index} has {len} points but array dimension is {dim}")]
    AxisLengthMismatch {
        index: usize,
        len: usize,
        dim: usize,
    },
}
