//! Error types for the client session.
//!
//! The gate errors are the client's own optimistic checks. Passing them
//! does not mean the authority will accept the move.

use dropgrid_board::BoardError;

/// Errors that can occur on the client side of a session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The client has not joined the session.
    #[error("not joined")]
    NotJoined,

    /// The client's previous request has not been answered yet.
    #[error("previous move still pending")]
    AwaitingResult,

    /// The opponent's seat is empty.
    #[error("waiting for opponent")]
    NotReady,

    /// The mirror says it is the other side's turn.
    #[error("not your turn")]
    NotYourTurn,

    /// The mirror says the game has ended.
    #[error("game is over")]
    GameOver,

    /// A broadcast skipped ahead of the mirror. The mirror should be
    /// rebuilt from the persisted snapshot.
    #[error("missed moves: mirror at {held}, received {received}")]
    MissedMoves { held: u32, received: u32 },

    /// A broadcast placement did not fit the mirror's board.
    #[error(transparent)]
    Board(#[from] BoardError),
}
