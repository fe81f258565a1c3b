//! Line detection: finds a run of `win_length` same-colored cells along
//! any of the four grid orientations.
//!
//! Two entry points share one notion of "run":
//!
//! - [`WinDetector::evaluate`] scans the whole board in a fixed order and
//!   reports the first winning run it meets. Used when a board arrives from
//!   somewhere else (a loaded snapshot) and nothing is known about it.
//! - [`WinDetector::evaluate_from`] only looks at the runs through one
//!   cell. Used right after a move, since any new win must pass through
//!   the piece just placed.
//!
//! On every board reachable by legal play the two agree, including which
//! line they report.

use serde::{Deserialize, Serialize};

use crate::{Alliance, BoardConfig, BoardState, CellCoord};

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// A line orientation. The positive step of each is listed on the variant;
/// a run's `start` is the end reached by stepping backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Down a column: `(+1, 0)`.
    Vertical,
    /// Along a row: `(0, +1)`.
    Horizontal,
    /// `(+1, +1)`, drawn as `\`.
    DiagonalDownRight,
    /// `(+1, -1)`, drawn as `/`.
    DiagonalDownLeft,
}

impl Direction {
    /// All orientations, in the order the full scan visits them.
    pub const ALL: [Direction; 4] = [
        Direction::Vertical,
        Direction::Horizontal,
        Direction::DiagonalDownRight,
        Direction::DiagonalDownLeft,
    ];

    fn delta(self) -> (isize, isize) {
        match self {
            Self::Vertical => (1, 0),
            Self::Horizontal => (0, 1),
            Self::DiagonalDownRight => (1, 1),
            Self::DiagonalDownLeft => (1, -1),
        }
    }
}

// ---------------------------------------------------------------------------
// WinLine / Evaluation
// ---------------------------------------------------------------------------

/// A maximal run that meets the win threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinLine {
    pub alliance: Alliance,
    /// First cell of the run (smallest row; smallest column for
    /// horizontal runs).
    pub start: CellCoord,
    /// Last cell of the run.
    pub end: CellCoord,
    /// Number of cells in the run. Can exceed the win length.
    pub length: usize,
    pub direction: Direction,
}

impl WinLine {
    /// Sort key reproducing the full-board scan order: verticals by
    /// column then row, horizontals by row then column, diagonals by
    /// row then column with down-right before down-left.
    fn scan_rank(&self) -> (u8, usize, usize, u8) {
        let CellCoord { row, column } = self.start;
        match self.direction {
            Direction::Vertical => (0, column, row, 0),
            Direction::Horizontal => (1, row, column, 0),
            Direction::DiagonalDownRight => (2, row, column, 0),
            Direction::DiagonalDownLeft => (2, row, column, 1),
        }
    }
}

/// Result of checking a board for a finished line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    NotFinished,
    Finished(WinLine),
}

impl Evaluation {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }

    pub fn line(&self) -> Option<&WinLine> {
        match self {
            Self::Finished(line) => Some(line),
            Self::NotFinished => None,
        }
    }

    /// Returns the winning line.
    ///
    /// # Panics
    /// If the board is not finished. Asking for the line of an unfinished
    /// game is a caller bug, not a runtime condition.
    pub fn expect_line(&self) -> &WinLine {
        match self {
            Self::Finished(line) => line,
            Self::NotFinished => {
                panic!("win line requested but the game is not finished")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// WinDetector
// ---------------------------------------------------------------------------

/// Detects runs of at least `win_length` cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinDetector {
    win_length: usize,
}

impl WinDetector {
    pub fn new(win_length: usize) -> Self {
        Self { win_length }
    }

    pub fn with_config(config: &BoardConfig) -> Self {
        Self::new(config.win_length)
    }

    pub fn win_length(&self) -> usize {
        self.win_length
    }

    /// Scans the whole board.
    ///
    /// Visit order: columns left to right (each top to bottom) for
    /// vertical runs, then rows top to bottom (each left to right) for
    /// horizontal runs, then every cell row-major for the two diagonals.
    /// The first qualifying run wins, which keeps the reported line
    /// deterministic even on a board holding several.
    pub fn evaluate(&self, board: &BoardState) -> Evaluation {
        for column in 0..board.columns() {
            for row in 0..board.rows() {
                if let Some(line) = self.run_starting_at(
                    board,
                    CellCoord::new(row, column),
                    Direction::Vertical,
                ) {
                    return Evaluation::Finished(line);
                }
            }
        }

        for row in 0..board.rows() {
            for column in 0..board.columns() {
                if let Some(line) = self.run_starting_at(
                    board,
                    CellCoord::new(row, column),
                    Direction::Horizontal,
                ) {
                    return Evaluation::Finished(line);
                }
            }
        }

        for row in 0..board.rows() {
            for column in 0..board.columns() {
                let coord = CellCoord::new(row, column);
                for direction in
                    [Direction::DiagonalDownRight, Direction::DiagonalDownLeft]
                {
                    if let Some(line) =
                        self.run_starting_at(board, coord, direction)
                    {
                        return Evaluation::Finished(line);
                    }
                }
            }
        }

        Evaluation::NotFinished
    }

    /// Checks only the four runs through `coord`.
    ///
    /// Returns `NotFinished` for an empty or off-board cell.
    pub fn evaluate_from(
        &self,
        board: &BoardState,
        coord: CellCoord,
    ) -> Evaluation {
        Direction::ALL
            .iter()
            .filter_map(|&direction| run_through(board, coord, direction))
            .filter(|line| line.length >= self.win_length)
            .min_by_key(WinLine::scan_rank)
            .map_or(Evaluation::NotFinished, Evaluation::Finished)
    }

    /// `true` iff no cell is empty. Combined with `NotFinished` this is a
    /// draw.
    pub fn is_full(&self, board: &BoardState) -> bool {
        board.is_full()
    }

    /// Returns the run in `direction` that starts at `coord`, if it is long
    /// enough. Cells in the middle of a run are skipped so each run is
    /// measured once.
    fn run_starting_at(
        &self,
        board: &BoardState,
        coord: CellCoord,
        direction: Direction,
    ) -> Option<WinLine> {
        let cell = board.cell(coord)?;
        cell.alliance()?;
        let (dr, dc) = direction.delta();
        if let Some(prev) = offset(coord, -dr, -dc) {
            if board.cell(prev) == Some(cell) {
                return None;
            }
        }
        run_through(board, coord, direction)
            .filter(|line| line.length >= self.win_length)
    }
}

/// Measures the maximal run through `coord` in `direction`, walking both
/// ways from the origin: `1 + steps_forward + steps_backward`.
fn run_through(
    board: &BoardState,
    coord: CellCoord,
    direction: Direction,
) -> Option<WinLine> {
    let cell = board.cell(coord)?;
    let alliance = cell.alliance()?;
    let (dr, dc) = direction.delta();

    let walk = |dr: isize, dc: isize| {
        let mut last = coord;
        let mut steps = 0;
        while let Some(next) = offset(last, dr, dc) {
            if board.cell(next) != Some(cell) {
                break;
            }
            last = next;
            steps += 1;
        }
        (last, steps)
    };

    let (end, forward) = walk(dr, dc);
    let (start, backward) = walk(-dr, -dc);

    Some(WinLine {
        alliance,
        start,
        end,
        length: 1 + forward + backward,
        direction,
    })
}

/// Steps `coord` by `(dr, dc)`. `None` when that leaves the non-negative
/// quadrant; the board rejects coordinates past the far edges.
fn offset(coord: CellCoord, dr: isize, dc: isize) -> Option<CellCoord> {
    let row = coord.row.checked_add_signed(dr)?;
    let column = coord.column.checked_add_signed(dc)?;
    Some(CellCoord::new(row, column))
}
