//! Error types for the board layer.

use crate::CellCoord;

/// Errors produced by board queries, mutations and the positional codec.
///
/// None of these are fatal. The authority turns `InvalidColumn` and
/// `ColumnFull` into move rejections; the replication layer turns the
/// decode variants into "no snapshot available".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// The column index is outside `[0, columns)`.
    #[error("column {column} is out of range (board has {columns} columns)")]
    InvalidColumn { column: usize, columns: usize },

    /// Every cell in the column is already occupied.
    #[error("column {0} is full")]
    ColumnFull(usize),

    /// A cell coordinate lies outside the grid.
    #[error("cell {0} is outside the board")]
    OutOfBounds(CellCoord),

    /// An encoded board string has the wrong number of symbols.
    #[error("encoded board has length {actual}, expected {expected}")]
    BadLength { expected: usize, actual: usize },

    /// An encoded board string contains a symbol other than `0`, `1`, `2`.
    #[error("encoded board has invalid symbol {symbol:?} at index {index}")]
    BadSymbol { index: usize, symbol: char },

    /// A board configuration that cannot describe a playable grid.
    #[error("invalid board config: {0}")]
    InvalidConfig(String),
}
