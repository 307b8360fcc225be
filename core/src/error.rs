//! Error types for snapshot handling.

use thiserror::Error;

/// A tile observation that cannot be placed on the board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// Entry text is not of the form `value,row,col`.
    #[error("malformed observation {0:?}: expected value,row,col")]
    Malformed(String),

    #[error("row {0} is outside 1..=4")]
    RowOutOfRange(u32),

    #[error("column {0} is outside 1..=4")]
    ColOutOfRange(u32),

    /// Tile values are powers of two from 2 up to 131072.
    #[error("tile value {0} is not a power of two in 2..=131072")]
    InvalidValue(u32),
}

/// Result type alias for snapshot operations.
pub type Result<T> = std::result::Result<T, SnapshotError>;
