//! Authority actor: a Tokio task that owns the [`TurnAuthority`].
//!
//! Move requests, joins, leaves and restarts all arrive through one mpsc
//! channel and are handled to completion in arrival order, so no two
//! requests ever touch the board at once.

use std::sync::Arc;

use dropgrid_board::{Alliance, BoardState};
use dropgrid_protocol::{
    MoveRejection, MoveRequest, PlayerId, Recipient, SessionMessage, Substrate,
};
use dropgrid_replication::{PropertyStore, Replicator};
use tokio::sync::{mpsc, oneshot};

use crate::{AuthorityError, AuthorityState, MoveOutcome, TurnAuthority};

/// Commands sent to the authority actor through its channel.
pub(crate) enum AuthorityCommand {
    /// Seat a participant.
    Join {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<(), AuthorityError>>,
    },

    /// Unseat a participant.
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<(), AuthorityError>>,
    },

    /// A move request. `reply` is `None` when it came in over the
    /// substrate and nobody waits for the outcome directly.
    RequestMove {
        request: MoveRequest,
        reply: Option<oneshot::Sender<MoveOutcome>>,
    },

    /// Start a new game on an empty board.
    Restart {
        reply: oneshot::Sender<Result<(), AuthorityError>>,
    },

    /// Request a snapshot of the authority's state.
    GetInfo {
        reply: oneshot::Sender<AuthorityInfo>,
    },

    /// Stop the actor.
    Shutdown,
}

/// What the authority currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityInfo {
    /// The participant running this authority.
    pub holder: PlayerId,
    pub state: AuthorityState,
    pub turn: Alliance,
    pub ready: bool,
    /// Seated participants in join order.
    pub participants: Vec<PlayerId>,
    pub move_number: u32,
    pub board: BoardState,
}

/// Handle to a running authority actor.
///
/// Cheap to clone; every clone feeds the same queue.
#[derive(Debug, Clone)]
pub struct AuthorityHandle {
    holder: PlayerId,
    sender: mpsc::Sender<AuthorityCommand>,
}

impl AuthorityHandle {
    /// The participant this authority runs for.
    pub fn holder(&self) -> PlayerId {
        self.holder
    }

    /// Seats a participant and recomputes readiness.
    pub async fn join(&self, player_id: PlayerId) -> Result<(), AuthorityError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(AuthorityCommand::Join {
            player_id,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Unseats a participant and recomputes readiness.
    pub async fn leave(&self, player_id: PlayerId) -> Result<(), AuthorityError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(AuthorityCommand::Leave {
            player_id,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Queues a move request without waiting for its outcome.
    ///
    /// The requester learns the outcome from the `ApplyResult` and
    /// `UnlockRequester` broadcasts.
    pub async fn request_move(&self, request: MoveRequest) -> Result<(), AuthorityError> {
        self.send(AuthorityCommand::RequestMove {
            request,
            reply: None,
        })
        .await
    }

    /// Queues a move request and waits for its outcome.
    ///
    /// The same broadcasts go out as for [`request_move`](Self::request_move).
    pub async fn submit_move(
        &self,
        request: MoveRequest,
    ) -> Result<MoveOutcome, AuthorityError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(AuthorityCommand::RequestMove {
            request,
            reply: Some(reply_tx),
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Restarts the game.
    pub async fn restart(&self) -> Result<(), AuthorityError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(AuthorityCommand::Restart { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Requests the authority's current state.
    pub async fn get_info(&self) -> Result<AuthorityInfo, AuthorityError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(AuthorityCommand::GetInfo { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Tells the actor to stop. Queued commands ahead of this one still run.
    pub async fn shutdown(&self) -> Result<(), AuthorityError> {
        self.send(AuthorityCommand::Shutdown).await
    }

    async fn send(&self, command: AuthorityCommand) -> Result<(), AuthorityError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> AuthorityError {
        AuthorityError::Unavailable(self.holder)
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct AuthorityActor<St: PropertyStore, Su: Substrate> {
    holder: PlayerId,
    authority: TurnAuthority,
    participants: Vec<PlayerId>,
    replicator: Replicator<St>,
    substrate: Arc<Su>,
    receiver: mpsc::Receiver<AuthorityCommand>,
}

impl<St: PropertyStore, Su: Substrate> AuthorityActor<St, Su> {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::info!(holder = %self.holder, state = %self.authority.state(), "authority started");

        while let Some(command) = self.receiver.recv().await {
            match command {
                AuthorityCommand::Join { player_id, reply } => {
                    let result = self.handle_join(player_id).await;
                    let _ = reply.send(result);
                }
                AuthorityCommand::Leave { player_id, reply } => {
                    let result = self.handle_leave(player_id).await;
                    let _ = reply.send(result);
                }
                AuthorityCommand::RequestMove { request, reply } => {
                    let outcome = self.handle_move(request).await;
                    if let Some(reply) = reply {
                        let _ = reply.send(outcome);
                    }
                }
                AuthorityCommand::Restart { reply } => {
                    let result = self.handle_restart().await;
                    let _ = reply.send(result);
                }
                AuthorityCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                AuthorityCommand::Shutdown => break,
            }
        }

        tracing::info!(holder = %self.holder, "authority stopped");
    }

    async fn handle_join(&mut self, player_id: PlayerId) -> Result<(), AuthorityError> {
        if self.participants.contains(&player_id) {
            return Err(AuthorityError::AlreadyJoined(player_id));
        }
        self.participants.push(player_id);
        tracing::info!(
            holder = %self.holder,
            %player_id,
            participants = self.participants.len(),
            "participant joined"
        );
        self.refresh_readiness().await
    }

    async fn handle_leave(&mut self, player_id: PlayerId) -> Result<(), AuthorityError> {
        let Some(index) = self.participants.iter().position(|p| *p == player_id) else {
            return Err(AuthorityError::NotParticipant(player_id));
        };
        self.participants.remove(index);
        tracing::info!(
            holder = %self.holder,
            %player_id,
            participants = self.participants.len(),
            "participant left"
        );
        self.refresh_readiness().await
    }

    async fn refresh_readiness(&mut self) -> Result<(), AuthorityError> {
        let ready = self
            .replicator
            .recompute_readiness(self.participants.len())
            .await?;
        if ready != self.authority.is_ready() {
            tracing::info!(holder = %self.holder, ready, "readiness changed");
        }
        self.authority.set_ready(ready);
        self.replicator
            .persist_snapshot(&self.authority.snapshot())
            .await?;
        Ok(())
    }

    async fn handle_move(&mut self, request: MoveRequest) -> MoveOutcome {
        let MoveRequest { column, requester } = request;
        let outcome = match self.alliance_of(requester) {
            Some(alliance) => self.authority.process_move_request(column, alliance),
            None => MoveOutcome::Rejected(MoveRejection::NotParticipant),
        };

        match outcome {
            MoveOutcome::Rejected(rejection) => {
                tracing::warn!(%requester, column, %rejection, "move rejected");
            }
            _ => {
                tracing::debug!(%requester, column, outcome = ?outcome, "move accepted");
                self.publish(&outcome).await;
            }
        }

        self.broadcast(
            Recipient::Player(requester),
            SessionMessage::UnlockRequester {
                requester,
                rejection: outcome.rejection(),
            },
        )
        .await;
        outcome
    }

    /// Persists the new snapshot, then broadcasts the result.
    async fn publish(&mut self, outcome: &MoveOutcome) {
        if let Err(e) = self
            .replicator
            .persist_snapshot(&self.authority.snapshot())
            .await
        {
            tracing::warn!(error = %e, "failed to persist snapshot");
        }

        if let Some(apply) = outcome.to_apply_result(self.authority.move_number()) {
            self.broadcast(Recipient::AllBuffered, SessionMessage::ApplyResult(apply))
                .await;
        }

        if let AuthorityState::GameOver(result) = self.authority.state() {
            tracing::info!(
                holder = %self.holder,
                %result,
                moves = self.authority.move_number(),
                "game over"
            );
        }
    }

    async fn handle_restart(&mut self) -> Result<(), AuthorityError> {
        self.substrate.clear_buffer().await;
        self.authority.reset();
        self.replicator.reset(self.authority.is_ready()).await?;
        self.broadcast(Recipient::AllBuffered, SessionMessage::Reset).await;
        tracing::info!(holder = %self.holder, "game restarted");
        Ok(())
    }

    /// The holder plays the starting seat; every other participant the
    /// other one.
    fn alliance_of(&self, player_id: PlayerId) -> Option<Alliance> {
        if player_id == self.holder {
            Some(Alliance::PlayerA)
        } else if self.participants.contains(&player_id) {
            Some(Alliance::PlayerB)
        } else {
            None
        }
    }

    async fn broadcast(&self, to: Recipient, msg: SessionMessage) {
        if let Err(e) = self.substrate.deliver(self.holder, to, msg).await {
            tracing::warn!(error = %e, ?to, "delivery failed");
        }
    }

    fn info(&self) -> AuthorityInfo {
        AuthorityInfo {
            holder: self.holder,
            state: self.authority.state(),
            turn: self.authority.turn(),
            ready: self.authority.is_ready(),
            participants: self.participants.clone(),
            move_number: self.authority.move_number(),
            board: self.authority.board().clone(),
        }
    }
}

/// Spawns the authority actor and returns a handle to it.
///
/// `participants` is the roster at spawn time, holder included.
pub(crate) fn spawn_authority<St: PropertyStore, Su: Substrate>(
    holder: PlayerId,
    authority: TurnAuthority,
    participants: Vec<PlayerId>,
    replicator: Replicator<St>,
    substrate: Arc<Su>,
) -> AuthorityHandle {
    let (tx, rx) = mpsc::channel(authority.config().channel_size);

    let actor = AuthorityActor {
        holder,
        authority,
        participants,
        replicator,
        substrate,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    AuthorityHandle { holder, sender: tx }
}
