//! Cell contents, alliances and grid coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Alliance
// ---------------------------------------------------------------------------

/// One of the two sides in a match.
///
/// The mapping from participants to alliances is fixed: the authority
/// holder always plays [`Alliance::PlayerA`], everyone else plays
/// [`Alliance::PlayerB`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alliance {
    PlayerA,
    PlayerB,
}

impl Alliance {
    /// Returns the other alliance.
    pub fn opponent(self) -> Self {
        match self {
            Self::PlayerA => Self::PlayerB,
            Self::PlayerB => Self::PlayerA,
        }
    }

    /// The cell color this alliance drops.
    pub fn cell(self) -> Cell {
        match self {
            Self::PlayerA => Cell::PlayerA,
            Self::PlayerB => Cell::PlayerB,
        }
    }

    /// One-bit turn encoding used by the persisted `TURN` property.
    pub fn turn_bit(self) -> u8 {
        match self {
            Self::PlayerA => 0,
            Self::PlayerB => 1,
        }
    }

    /// Inverse of [`turn_bit`](Self::turn_bit). Anything but 0 or 1 is `None`.
    pub fn from_turn_bit(bit: i64) -> Option<Self> {
        match bit {
            0 => Some(Self::PlayerA),
            1 => Some(Self::PlayerB),
            _ => None,
        }
    }
}

impl fmt::Display for Alliance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlayerA => write!(f, "PlayerA"),
            Self::PlayerB => write!(f, "PlayerB"),
        }
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// The content of one grid cell.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum Cell {
    #[default]
    Empty,
    PlayerA,
    PlayerB,
}

impl Cell {
    /// The alliance owning this cell, or `None` when empty.
    pub fn alliance(self) -> Option<Alliance> {
        match self {
            Self::Empty => None,
            Self::PlayerA => Some(Alliance::PlayerA),
            Self::PlayerB => Some(Alliance::PlayerB),
        }
    }

    pub fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Symbol used by the positional board encoding.
    pub fn symbol(self) -> char {
        match self {
            Self::Empty => '0',
            Self::PlayerA => '1',
            Self::PlayerB => '2',
        }
    }

    /// Inverse of [`symbol`](Self::symbol).
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '0' => Some(Self::Empty),
            '1' => Some(Self::PlayerA),
            '2' => Some(Self::PlayerB),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// A `(row, column)` position on the grid. Row 0 is the top row; pieces
/// fall towards the highest row index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
pub struct CellCoord {
    pub row: usize,
    pub column: usize,
}

impl CellCoord {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(row={}, col={})", self.row, self.column)
    }
}

/// A piece that has been dropped: where it landed and whose it is.
///
/// This is exactly what a presentation layer needs to animate a drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub coord: CellCoord,
    pub alliance: Alliance,
}
