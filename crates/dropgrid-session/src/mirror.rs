//! A client's read-only copy of the board and turn.
//!
//! The mirror never validates anything. It changes only by applying what
//! the authority broadcast, or by reloading the persisted snapshot.

use dropgrid_board::{
    Alliance, BoardConfig, BoardState, Evaluation, WinDetector, WinLine,
};
use dropgrid_protocol::{ApplyResult, MoveResult};
use dropgrid_replication::ReplicatedSnapshot;
use serde::{Deserialize, Serialize};

use crate::SessionError;

/// Whether the mirrored game is still going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    Won(WinLine),
    Draw,
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        !matches!(self, Self::Playing)
    }
}

/// Local mirror of the authority's board and turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mirror {
    config: BoardConfig,
    starting_alliance: Alliance,
    board: BoardState,
    turn: Alliance,
    status: GameStatus,
    move_number: u32,
}

impl Mirror {
    /// An empty board with `starting_alliance` to move.
    pub fn new(config: BoardConfig, starting_alliance: Alliance) -> Self {
        Self {
            board: BoardState::with_config(&config),
            turn: starting_alliance,
            status: GameStatus::Playing,
            move_number: 0,
            config,
            starting_alliance,
        }
    }

    /// Rebuilds the mirror from the persisted snapshot.
    ///
    /// The game status is not persisted, so it is recovered by scanning
    /// the board.
    pub fn load(&mut self, snapshot: ReplicatedSnapshot) {
        let detector = WinDetector::with_config(&self.config);
        self.status = match detector.evaluate(&snapshot.board) {
            Evaluation::Finished(line) => GameStatus::Won(line),
            Evaluation::NotFinished if detector.is_full(&snapshot.board) => {
                GameStatus::Draw
            }
            Evaluation::NotFinished => GameStatus::Playing,
        };
        self.move_number =
            u32::try_from(snapshot.board.piece_count()).unwrap_or(u32::MAX);
        self.board = snapshot.board;
        self.turn = snapshot.turn;
    }

    /// Applies one broadcast result.
    ///
    /// Returns `Ok(false)` for a result the mirror already holds; replays
    /// after a snapshot load are skipped this way.
    ///
    /// # Errors
    /// - [`SessionError::MissedMoves`] if results were skipped
    /// - [`SessionError::Board`] if the placement is off the grid
    pub fn apply(&mut self, apply: &ApplyResult) -> Result<bool, SessionError> {
        if apply.move_number <= self.move_number {
            return Ok(false);
        }
        if apply.move_number != self.move_number + 1 {
            return Err(SessionError::MissedMoves {
                held: self.move_number,
                received: apply.move_number,
            });
        }

        self.board.apply_placement(apply.placed)?;
        self.move_number = apply.move_number;
        match apply.result {
            MoveResult::Continue { next_turn } => {
                self.turn = next_turn;
                self.status = GameStatus::Playing;
            }
            MoveResult::Win { line } => self.status = GameStatus::Won(line),
            MoveResult::Draw => self.status = GameStatus::Draw,
        }
        Ok(true)
    }

    /// Back to an empty board.
    pub fn reset(&mut self) {
        *self = Self::new(self.config, self.starting_alliance);
    }

    /// Overrides the turn from a `Resync` or a `TURN` property change.
    pub fn set_turn(&mut self, turn: Alliance) {
        self.turn = turn;
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn turn(&self) -> Alliance {
        self.turn
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn move_number(&self) -> u32 {
        self.move_number
    }
}
