//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum SkirmishError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// Returns were requested from a rollout without transitions.
    #[error("Rollout storage is empty")]
    EmptyRollout,

    /// Training inputs were requested before returns were computed.
    #[error("Returns have not been computed for this rollout")]
    ReturnsNotComputed,

    /// Discount factor must lie in `[0, 1)`.
    #[error("Discount factor out of range [0, 1): {0}")]
    DiscountOutOfRange(f64),

    /// Width of a batch differs from the number of environments in the rollout.
    #[error("Batch size mismatch: expected {expected}, got {actual}")]
    BatchSizeMismatch {
        /// Number of environments in the rollout.
        expected: usize,
        /// Width of the offending batch.
        actual: usize,
    },

    /// Flat index does not fit in the spatial grid.
    #[error("Index {index} out of range for grid {rows}x{cols}")]
    CoordsOutOfRange {
        /// Flat index.
        index: i64,
        /// Number of rows of the grid.
        rows: i64,
        /// Number of columns of the grid.
        cols: i64,
    },

    /// Rollout horizon must be positive.
    #[error("Invalid rollout horizon: {0}")]
    InvalidHorizon(usize),
}
