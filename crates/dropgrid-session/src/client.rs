//! One participant's side of the session protocol.
//!
//! [`ClientSession`] holds the mirror, the lock token and the readiness
//! flag, gates move submission, and folds incoming messages into the
//! mirror. It does no I/O: the caller sends the [`MoveRequest`] it hands
//! out and feeds back whatever arrives.

use std::fmt;

use dropgrid_board::{Alliance, BoardConfig};
use dropgrid_protocol::{
    MoveRejection, MoveRequest, MoveResult, PlayerId, SessionMessage,
};
use dropgrid_replication::ReplicatedSnapshot;
use serde::{Deserialize, Serialize};

use crate::{GameStatus, Mirror, RenderEvent, SessionError};

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Whether this participant currently holds authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Authority,
    Replica,
}

impl Role {
    /// The authority holder plays PlayerA, everyone else PlayerB.
    pub fn alliance(self) -> Alliance {
        match self {
            Self::Authority => Alliance::PlayerA,
            Self::Replica => Alliance::PlayerB,
        }
    }
}

// ---------------------------------------------------------------------------
// ClientStatus
// ---------------------------------------------------------------------------

/// What the status line should say.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientStatus {
    Connecting,
    WaitingForOpponent,
    YourTurn,
    OpponentTurn,
    /// `winner` is `None` for a draw.
    GameOver { winner: Option<Alliance> },
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => write!(f, "Connecting..."),
            Self::WaitingForOpponent => write!(f, "Waiting for opponent..."),
            Self::YourTurn => write!(f, "Your turn"),
            Self::OpponentTurn => write!(f, "Opponent's turn"),
            Self::GameOver { winner: Some(alliance) } => {
                write!(f, "{alliance} wins!")
            }
            Self::GameOver { winner: None } => write!(f, "Draw!"),
        }
    }
}

// ---------------------------------------------------------------------------
// ClientSession
// ---------------------------------------------------------------------------

/// Client-side session state for one participant.
#[derive(Debug, Clone)]
pub struct ClientSession {
    player_id: PlayerId,
    role: Role,
    joined: bool,
    ready: bool,
    /// Set while our own request is unanswered.
    locked: bool,
    last_rejection: Option<MoveRejection>,
    mirror: Mirror,
    events: Vec<RenderEvent>,
}

impl ClientSession {
    pub fn new(
        player_id: PlayerId,
        role: Role,
        config: BoardConfig,
        starting_alliance: Alliance,
    ) -> Self {
        Self {
            player_id,
            role,
            joined: false,
            ready: false,
            locked: false,
            last_rejection: None,
            mirror: Mirror::new(config, starting_alliance),
            events: Vec::new(),
        }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn alliance(&self) -> Alliance {
        self.role.alliance()
    }

    pub fn mirror(&self) -> &Mirror {
        &self.mirror
    }

    pub fn is_joined(&self) -> bool {
        self.joined
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// `true` while a request of ours is outstanding.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Why our last request was refused, cleared by the next accepted one.
    pub fn last_rejection(&self) -> Option<MoveRejection> {
        self.last_rejection
    }

    /// Marks the session joined and loads the persisted snapshot.
    ///
    /// With no usable snapshot the mirror starts from an empty board.
    pub fn join(&mut self, snapshot: Option<ReplicatedSnapshot>) {
        self.joined = true;
        self.locked = false;
        match snapshot {
            Some(snapshot) => {
                self.ready = snapshot.ready;
                self.mirror.load(snapshot);
            }
            None => self.mirror.reset(),
        }
        self.events.push(RenderEvent::BoardReset);
        self.push_board_events();
        tracing::debug!(
            player_id = %self.player_id,
            moves = self.mirror.move_number(),
            "joined session"
        );
    }

    /// Leaves the session. Any outstanding request is forgotten.
    pub fn leave(&mut self) {
        self.joined = false;
        self.ready = false;
        self.locked = false;
    }

    /// Reloads the mirror from the snapshot, e.g. after
    /// [`SessionError::MissedMoves`].
    pub fn resync_from(&mut self, snapshot: ReplicatedSnapshot) {
        self.ready = snapshot.ready;
        self.mirror.load(snapshot);
        self.events.push(RenderEvent::BoardReset);
        self.push_board_events();
    }

    /// Changes role after a handover.
    pub fn set_role(&mut self, role: Role) {
        if role != self.role {
            tracing::info!(player_id = %self.player_id, ?role, "role changed");
        }
        self.role = role;
    }

    /// Records a `READY` property change.
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Records a `TURN` property change.
    pub fn set_turn(&mut self, turn: Alliance) {
        self.mirror.set_turn(turn);
    }

    /// Checks whether a move may be sent and, if so, takes the lock token
    /// and returns the request to send.
    ///
    /// # Errors
    /// The first failing gate, in order: [`SessionError::NotJoined`],
    /// [`SessionError::AwaitingResult`], [`SessionError::NotReady`],
    /// [`SessionError::GameOver`], [`SessionError::NotYourTurn`].
    pub fn prepare_move(&mut self, column: usize) -> Result<MoveRequest, SessionError> {
        if !self.joined {
            return Err(SessionError::NotJoined);
        }
        if self.locked {
            return Err(SessionError::AwaitingResult);
        }
        if !self.ready {
            return Err(SessionError::NotReady);
        }
        if self.mirror.status().is_over() {
            return Err(SessionError::GameOver);
        }
        if self.mirror.turn() != self.alliance() {
            return Err(SessionError::NotYourTurn);
        }

        self.locked = true;
        Ok(MoveRequest {
            column,
            requester: self.player_id,
        })
    }

    /// Releases the lock token without an answer, for a request that
    /// could not be sent at all.
    pub fn cancel_pending(&mut self) {
        self.locked = false;
    }

    /// Folds one incoming message into the session.
    ///
    /// # Errors
    /// [`SessionError::MissedMoves`] or [`SessionError::Board`] if an
    /// `ApplyResult` cannot be applied; the caller should reload the
    /// snapshot with [`resync_from`](Self::resync_from).
    pub fn handle_message(&mut self, msg: &SessionMessage) -> Result<(), SessionError> {
        match msg {
            SessionMessage::ApplyResult(apply) => {
                // Any result means the authority is past our request.
                self.locked = false;
                if self.mirror.apply(apply)? {
                    let coord = apply.placed.coord;
                    self.events.push(RenderEvent::PiecePlaced {
                        row: coord.row,
                        column: coord.column,
                        alliance: apply.placed.alliance,
                    });
                    if let MoveResult::Win { line } = apply.result {
                        self.events.push(RenderEvent::WinLine {
                            start: line.start,
                            end: line.end,
                        });
                    }
                }
            }
            SessionMessage::UnlockRequester {
                requester,
                rejection,
            } => {
                if *requester == self.player_id {
                    self.locked = false;
                    self.last_rejection = *rejection;
                    if let Some(rejection) = rejection {
                        tracing::debug!(player_id = %self.player_id, %rejection, "move refused");
                    }
                }
            }
            SessionMessage::Resync { turn, ready } => {
                self.locked = false;
                self.ready = *ready;
                self.mirror.set_turn(*turn);
            }
            SessionMessage::Reset => {
                self.mirror.reset();
                self.locked = false;
                self.last_rejection = None;
                self.events.push(RenderEvent::BoardReset);
            }
            SessionMessage::RequestMove(_) => {}
        }
        Ok(())
    }

    /// Current status line.
    pub fn status(&self) -> ClientStatus {
        if !self.joined {
            return ClientStatus::Connecting;
        }
        match self.mirror.status() {
            GameStatus::Won(line) => ClientStatus::GameOver {
                winner: Some(line.alliance),
            },
            GameStatus::Draw => ClientStatus::GameOver { winner: None },
            GameStatus::Playing if !self.ready => ClientStatus::WaitingForOpponent,
            GameStatus::Playing if self.mirror.turn() == self.alliance() => {
                ClientStatus::YourTurn
            }
            GameStatus::Playing => ClientStatus::OpponentTurn,
        }
    }

    /// Drains the render events produced since the last call.
    pub fn take_render_events(&mut self) -> Vec<RenderEvent> {
        std::mem::take(&mut self.events)
    }

    /// One `PiecePlaced` per occupied cell, plus the win line if any.
    fn push_board_events(&mut self) {
        let board = self.mirror.board();
        for row in (0..board.rows()).rev() {
            for column in 0..board.columns() {
                if let Some(alliance) = board.get(row, column).and_then(|c| c.alliance()) {
                    self.events.push(RenderEvent::PiecePlaced {
                        row,
                        column,
                        alliance,
                    });
                }
            }
        }
        if let GameStatus::Won(line) = self.mirror.status() {
            self.events.push(RenderEvent::WinLine {
                start: line.start,
                end: line.end,
            });
        }
    }
}
