//! Message types exchanged between participants and the authority.
//!
//! Three kinds of traffic exist:
//!
//! ```text
//! client ──RequestMove──────────────→ authority            (unicast)
//! authority ──ApplyResult───────────→ everyone, buffered   (broadcast)
//! authority ──UnlockRequester───────→ the requester only   (filtered by id)
//! ```
//!
//! plus the session-level `Resync` (after a handover) and `Reset`
//! (after a restart) broadcasts.

use std::fmt;

use dropgrid_board::{Alliance, Placement, WinLine};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A unique identifier for a participant in a session.
///
/// Serialized as a plain number (`PlayerId(42)` → `42`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who a message is for. The substrate resolves these to concrete
/// participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Whoever currently holds authority.
    Authority,

    /// Every participant present now, including the sender.
    All,

    /// Every participant present now, and replayed to anyone who joins
    /// later until the buffer is cleared.
    AllBuffered,

    /// Broadcast, but only the participant with this id acts on it.
    Player(PlayerId),
}

// ---------------------------------------------------------------------------
// Requests and outcomes
// ---------------------------------------------------------------------------

/// A client asking the authority to drop a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub column: usize,
    pub requester: PlayerId,
}

/// Why the authority refused a move.
///
/// Every variant resolves the same way: the board is untouched and the
/// requester is unlocked.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error,
)]
pub enum MoveRejection {
    #[error("column is out of range")]
    InvalidColumn,

    #[error("column is full")]
    ColumnFull,

    #[error("not your turn")]
    WrongTurn,

    #[error("waiting for opponent")]
    NotReady,

    #[error("game is already over")]
    GameAlreadyOver,

    /// A move arrived within the authority's cooldown window.
    #[error("too many moves, slow down")]
    Throttled,

    /// The requester is not seated in this session.
    #[error("requester is not a participant")]
    NotParticipant,
}

/// What an accepted move did to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum MoveResult {
    /// Play goes on with `next_turn` to move.
    Continue { next_turn: Alliance },

    /// The move completed a line.
    Win { line: WinLine },

    /// The move filled the last cell without a line.
    Draw,
}

/// The authority's broadcast after accepting a move.
///
/// Carries everything a mirror needs to update itself without re-running
/// validation. `move_number` counts accepted moves since the last reset,
/// starting at 1, and equals the number of pieces on the board afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyResult {
    pub move_number: u32,
    pub placed: Placement,
    pub result: MoveResult,
}

// ---------------------------------------------------------------------------
// SessionMessage
// ---------------------------------------------------------------------------

/// Every message that travels through the substrate.
///
/// Internally tagged: `{ "type": "Reset" }`,
/// `{ "type": "UnlockRequester", "requester": 3, "rejection": null }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionMessage {
    /// Client → authority.
    RequestMove(MoveRequest),

    /// Authority → all (buffered).
    ApplyResult(ApplyResult),

    /// Authority → the requester. Sent for every request, accepted or
    /// not; `rejection` says why when it was refused.
    UnlockRequester {
        requester: PlayerId,
        rejection: Option<MoveRejection>,
    },

    /// Authority → all, after taking over. Carries the turn and readiness
    /// re-derived from the persisted snapshot and releases every
    /// outstanding lock token.
    Resync { turn: Alliance, ready: bool },

    /// Authority → all. The game restarted from an empty board.
    Reset,
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The unit the substrate carries: a payload stamped with its sender and
/// the sender's own sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Per-sender counter, starting at 1.
    pub seq: u64,

    pub sender: PlayerId,

    pub payload: SessionMessage,
}
