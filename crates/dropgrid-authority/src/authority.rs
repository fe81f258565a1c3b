//! The canonical game: board, turn, and move validation.
//!
//! [`TurnAuthority`] is plain synchronous state. The actor in
//! [`actor`](crate::actor) puts a single-consumer queue in front of it so
//! requests are processed strictly one at a time.

use dropgrid_board::{
    Alliance, BoardError, BoardState, Evaluation, Placement, WinDetector,
    WinLine,
};
use dropgrid_protocol::{ApplyResult, MoveRejection, MoveResult};
use dropgrid_replication::ReplicatedSnapshot;
use tokio::time::Instant;

use crate::{AuthorityConfig, AuthorityState, GameResult};

/// What a move request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The piece landed and play goes on.
    Continue {
        placed: Placement,
        next_turn: Alliance,
    },

    /// The piece completed a line.
    Win { placed: Placement, line: WinLine },

    /// The piece filled the board without a line.
    Draw { placed: Placement },

    /// Nothing changed.
    Rejected(MoveRejection),
}

impl MoveOutcome {
    /// The piece placed by an accepted move.
    pub fn placed(&self) -> Option<Placement> {
        match self {
            Self::Continue { placed, .. }
            | Self::Win { placed, .. }
            | Self::Draw { placed } => Some(*placed),
            Self::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<MoveRejection> {
        match self {
            Self::Rejected(rejection) => Some(*rejection),
            _ => None,
        }
    }

    /// The broadcast describing an accepted move, `None` for a rejection.
    pub fn to_apply_result(&self, move_number: u32) -> Option<ApplyResult> {
        let (placed, result) = match *self {
            Self::Continue { placed, next_turn } => {
                (placed, MoveResult::Continue { next_turn })
            }
            Self::Win { placed, line } => (placed, MoveResult::Win { line }),
            Self::Draw { placed } => (placed, MoveResult::Draw),
            Self::Rejected(_) => return None,
        };
        Some(ApplyResult {
            move_number,
            placed,
            result,
        })
    }
}

/// Owns the canonical [`BoardState`] and whose turn it is.
///
/// Only the current authority holder has one. Every rejection leaves the
/// board, the turn and the move counter exactly as they were.
#[derive(Debug, Clone)]
pub struct TurnAuthority {
    config: AuthorityConfig,
    detector: WinDetector,
    board: BoardState,
    state: AuthorityState,
    turn: Alliance,
    move_number: u32,
    ready: bool,
    last_move_at: Option<Instant>,
}

impl TurnAuthority {
    /// A fresh game waiting for its second participant.
    pub fn new(config: AuthorityConfig) -> Self {
        Self {
            detector: WinDetector::with_config(&config.board),
            board: BoardState::with_config(&config.board),
            state: AuthorityState::WaitingForOpponent,
            turn: config.starting_alliance,
            move_number: 0,
            ready: false,
            last_move_at: None,
            config,
        }
    }

    /// Rebuilds the game from a persisted snapshot.
    ///
    /// A game that already ended is recognised by a full-board scan, since
    /// the result itself is never persisted.
    ///
    /// # Errors
    /// [`BoardError::BadLength`] if the snapshot's board does not match the
    /// configured shape.
    pub fn from_snapshot(
        config: AuthorityConfig,
        snapshot: ReplicatedSnapshot,
    ) -> Result<Self, BoardError> {
        let ReplicatedSnapshot { turn, board, ready } = snapshot;
        if board.rows() != config.board.rows
            || board.columns() != config.board.columns
        {
            return Err(BoardError::BadLength {
                expected: config.board.cell_count(),
                actual: board.rows() * board.columns(),
            });
        }

        let mut authority = Self::new(config);
        // The counter only ever grows by one per piece.
        authority.move_number = u32::try_from(board.piece_count())
            .unwrap_or(u32::MAX);
        authority.board = board;
        authority.turn = turn;
        authority.ready = ready;
        authority.state = authority.derive_state();
        Ok(authority)
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn state(&self) -> AuthorityState {
        self.state
    }

    pub fn turn(&self) -> Alliance {
        self.turn
    }

    /// Number of accepted moves since the last reset.
    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn config(&self) -> &AuthorityConfig {
        &self.config
    }

    /// The state as it would be persisted.
    pub fn snapshot(&self) -> ReplicatedSnapshot {
        ReplicatedSnapshot {
            turn: self.turn,
            board: self.board.clone(),
            ready: self.ready,
        }
    }

    /// Updates readiness after a join or leave.
    ///
    /// Losing readiness mid-game parks the game in `WaitingForOpponent`
    /// with the board intact; regaining it resumes with the same turn. A
    /// finished game stays finished.
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
        if !self.state.is_over() {
            self.state = self.derive_state();
        }
    }

    /// Validates and applies one move.
    ///
    /// Checks, in order: the game is not over, both seats are filled, it
    /// is `alliance`'s turn, the column exists, the cooldown has elapsed,
    /// the column has room. The first failing check is the rejection.
    pub fn process_move_request(
        &mut self,
        column: usize,
        alliance: Alliance,
    ) -> MoveOutcome {
        if let Some(rejection) = self.precheck(column, alliance) {
            return MoveOutcome::Rejected(rejection);
        }

        let previous = self.state;
        self.state = AuthorityState::Processing;

        let coord = match self.board.set_piece(column, alliance) {
            Ok(coord) => coord,
            Err(_) => {
                self.state = previous;
                return MoveOutcome::Rejected(MoveRejection::ColumnFull);
            }
        };

        let placed = Placement { coord, alliance };
        self.move_number += 1;
        self.last_move_at = Some(Instant::now());

        match self.detector.evaluate_from(&self.board, coord) {
            Evaluation::Finished(line) => {
                self.state = AuthorityState::GameOver(GameResult::Won(line));
                MoveOutcome::Win { placed, line }
            }
            Evaluation::NotFinished if self.detector.is_full(&self.board) => {
                self.state = AuthorityState::GameOver(GameResult::Draw);
                MoveOutcome::Draw { placed }
            }
            Evaluation::NotFinished => {
                self.turn = alliance.opponent();
                self.state = AuthorityState::AwaitingMove(self.turn);
                MoveOutcome::Continue {
                    placed,
                    next_turn: self.turn,
                }
            }
        }
    }

    /// Starts over: empty board, starting alliance to move, readiness kept.
    pub fn reset(&mut self) {
        self.board = BoardState::with_config(&self.config.board);
        self.turn = self.config.starting_alliance;
        self.move_number = 0;
        self.last_move_at = None;
        self.state = self.derive_state();
    }

    fn precheck(&self, column: usize, alliance: Alliance) -> Option<MoveRejection> {
        if self.state.is_over() {
            return Some(MoveRejection::GameAlreadyOver);
        }
        if !matches!(self.state, AuthorityState::AwaitingMove(_)) || !self.ready {
            return Some(MoveRejection::NotReady);
        }
        if alliance != self.turn {
            return Some(MoveRejection::WrongTurn);
        }
        if column >= self.board.columns() {
            return Some(MoveRejection::InvalidColumn);
        }
        if let Some(last) = self.last_move_at {
            if last.elapsed() < self.config.move_cooldown {
                return Some(MoveRejection::Throttled);
            }
        }
        None
    }

    /// State implied by the board and readiness alone.
    fn derive_state(&self) -> AuthorityState {
        if let Evaluation::Finished(line) = self.detector.evaluate(&self.board) {
            AuthorityState::GameOver(GameResult::Won(line))
        } else if self.detector.is_full(&self.board) {
            AuthorityState::GameOver(GameResult::Draw)
        } else if self.ready {
            AuthorityState::AwaitingMove(self.turn)
        } else {
            AuthorityState::WaitingForOpponent
        }
    }
}
