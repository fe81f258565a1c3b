//! The grid itself: gravity drops, occupancy queries and the positional
//! string encoding used by persisted snapshots.

use std::fmt;

use crate::{Alliance, BoardConfig, BoardError, Cell, CellCoord, Placement};

/// A fixed `rows x columns` grid of [`Cell`]s with column gravity.
///
/// Cells are stored row-major. Pieces fill a column from the bottom row
/// (`rows - 1`) upward, so a column's occupied cells always form one
/// contiguous run ending at the bottom. The only way back to `Empty` is a
/// whole new board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    rows: usize,
    columns: usize,
    cells: Vec<Cell>,
}

impl BoardState {
    /// Creates an empty board.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            cells: vec![Cell::Empty; rows * columns],
        }
    }

    /// Creates an empty board with the configured dimensions.
    pub fn with_config(config: &BoardConfig) -> Self {
        Self::new(config.rows, config.columns)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Returns the cell at `(row, column)`, or `None` off the grid.
    pub fn get(&self, row: usize, column: usize) -> Option<Cell> {
        if row < self.rows && column < self.columns {
            Some(self.cells[row * self.columns + column])
        } else {
            None
        }
    }

    /// Same as [`get`](Self::get) but takes a coordinate.
    pub fn cell(&self, coord: CellCoord) -> Option<Cell> {
        self.get(coord.row, coord.column)
    }

    /// Finds where a piece dropped into `column` would land.
    ///
    /// Scans from the bottom row upward and returns the first empty row.
    /// `None` means the column is full (or does not exist).
    pub fn find_drop_row(&self, column: usize) -> Option<usize> {
        if column >= self.columns {
            return None;
        }
        (0..self.rows)
            .rev()
            .find(|&row| self.cells[row * self.columns + column].is_empty())
    }

    /// Drops a piece for `alliance` into `column`.
    ///
    /// Returns the coordinate the piece landed on. On error the board is
    /// left untouched.
    ///
    /// # Errors
    /// - [`BoardError::InvalidColumn`] if `column >= columns`
    /// - [`BoardError::ColumnFull`] if the column has no empty cell
    pub fn set_piece(
        &mut self,
        column: usize,
        alliance: Alliance,
    ) -> Result<CellCoord, BoardError> {
        if column >= self.columns {
            return Err(BoardError::InvalidColumn {
                column,
                columns: self.columns,
            });
        }
        let row = self
            .find_drop_row(column)
            .ok_or(BoardError::ColumnFull(column))?;
        self.cells[row * self.columns + column] = alliance.cell();
        Ok(CellCoord::new(row, column))
    }

    /// Writes a placement decided elsewhere (by the authority) into this
    /// board without re-running move validation.
    ///
    /// Used by mirrors. Writing the same piece twice is a no-op, which
    /// makes replayed broadcasts harmless.
    ///
    /// # Errors
    /// [`BoardError::OutOfBounds`] if the coordinate is off the grid.
    pub fn apply_placement(
        &mut self,
        placement: Placement,
    ) -> Result<(), BoardError> {
        let CellCoord { row, column } = placement.coord;
        if row >= self.rows || column >= self.columns {
            return Err(BoardError::OutOfBounds(placement.coord));
        }
        self.cells[row * self.columns + column] = placement.alliance.cell();
        Ok(())
    }

    /// Number of non-empty cells. Every accepted move adds exactly one.
    pub fn piece_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    /// `true` iff no cell is empty.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }

    /// Returns the first occupied cell that sits directly above an empty
    /// one, scanning row-major. Boards built by [`set_piece`](Self::set_piece)
    /// never have one; a decoded snapshot might.
    pub fn find_gravity_violation(&self) -> Option<CellCoord> {
        for row in 0..self.rows.saturating_sub(1) {
            for column in 0..self.columns {
                let here = self.cells[row * self.columns + column];
                let below = self.cells[(row + 1) * self.columns + column];
                if !here.is_empty() && below.is_empty() {
                    return Some(CellCoord::new(row, column));
                }
            }
        }
        None
    }

    /// Encodes the board as one symbol per cell, row-major: `0` empty,
    /// `1` PlayerA, `2` PlayerB.
    pub fn serialize(&self) -> String {
        self.cells.iter().map(|c| c.symbol()).collect()
    }

    /// Decodes a string produced by [`serialize`](Self::serialize).
    ///
    /// # Errors
    /// - [`BoardError::BadLength`] if the length is not `rows * columns`
    /// - [`BoardError::BadSymbol`] for anything outside `{0, 1, 2}`
    pub fn deserialize(
        encoded: &str,
        rows: usize,
        columns: usize,
    ) -> Result<Self, BoardError> {
        let expected = rows * columns;
        let actual = encoded.chars().count();
        if actual != expected {
            return Err(BoardError::BadLength { expected, actual });
        }

        let cells = encoded
            .chars()
            .enumerate()
            .map(|(index, symbol)| {
                Cell::from_symbol(symbol)
                    .ok_or(BoardError::BadSymbol { index, symbol })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            rows,
            columns,
            cells,
        })
    }
}

/// ASCII rendering, top row first: `.` empty, `A`/`B` for the alliances.
impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for column in 0..self.columns {
                let ch = match self.cells[row * self.columns + column] {
                    Cell::Empty => '.',
                    Cell::PlayerA => 'A',
                    Cell::PlayerB => 'B',
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
