//! What a presentation layer needs to draw.

use dropgrid_board::{Alliance, CellCoord};
use serde::{Deserialize, Serialize};

/// Something the board view should animate or draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum RenderEvent {
    /// Drop a piece into `(row, column)`.
    PiecePlaced {
        row: usize,
        column: usize,
        alliance: Alliance,
    },

    /// Draw the winning line between two cell centres.
    WinLine { start: CellCoord, end: CellCoord },

    /// Clear every piece.
    BoardReset,
}
