//! Drives one participant's [`ClientSession`] against a [`LocalSession`].

use std::fmt;

use dropgrid_protocol::{
    Codec, Envelope, JsonCodec, PlayerId, Recipient, SessionMessage, Substrate,
};
use dropgrid_replication::{
    MemoryStore, PropertyChange, READY_KEY, Replicator, TURN_KEY,
};
use dropgrid_session::{
    ClientSession, ClientStatus, RenderEvent, Role, SessionError,
};
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::relay::Inbox;
use crate::{DropgridError, LocalSession};

/// One seated participant.
///
/// Messages and property changes queue up until [`pump`](Self::pump) is
/// called; nothing is applied in the background.
pub struct Participant<C: Codec = JsonCodec> {
    client: ClientSession,
    inbox: Inbox,
    changes: broadcast::Receiver<PropertyChange>,
    replicator: Replicator<MemoryStore>,
    session: LocalSession<C>,
}

impl<C: Codec> fmt::Debug for Participant<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Participant")
            .field("id", &self.id())
            .field("role", &self.role())
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl<C: Codec> Participant<C> {
    pub(crate) fn new(
        client: ClientSession,
        inbox: Inbox,
        changes: broadcast::Receiver<PropertyChange>,
        replicator: Replicator<MemoryStore>,
        session: LocalSession<C>,
    ) -> Self {
        Self {
            client,
            inbox,
            changes,
            replicator,
            session,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.client.player_id()
    }

    pub fn role(&self) -> Role {
        self.client.role()
    }

    pub fn client(&self) -> &ClientSession {
        &self.client
    }

    pub fn status(&self) -> ClientStatus {
        self.client.status()
    }

    /// Render events produced since the last call.
    pub fn render_events(&mut self) -> Vec<RenderEvent> {
        self.client.take_render_events()
    }

    /// Sends a move request for `column` to the authority.
    ///
    /// `READY` and `TURN` are re-read from the store first, so a client
    /// that has not pumped recently still gates on current values.
    ///
    /// # Errors
    /// - [`DropgridError::Session`] if a local gate refuses the move
    /// - [`DropgridError::Protocol`] if the request could not be sent
    pub async fn submit_move(&mut self, column: usize) -> Result<(), DropgridError> {
        self.refresh_from_store().await?;
        let request = self.client.prepare_move(column)?;
        tracing::debug!(player_id = %self.id(), column, "move submitted");

        let sent = self
            .session
            .relay()
            .deliver(self.id(), Recipient::Authority, SessionMessage::RequestMove(request))
            .await;
        if let Err(e) = sent {
            self.client.cancel_pending();
            return Err(e.into());
        }
        Ok(())
    }

    /// Applies every queued property change and message. Returns how many
    /// messages were handled.
    ///
    /// A mirror that falls out of step is rebuilt from the snapshot.
    ///
    /// # Errors
    /// [`DropgridError::Protocol`] if a message cannot be decoded, or
    /// [`DropgridError::Replication`] if the store cannot be read.
    pub async fn pump(&mut self) -> Result<usize, DropgridError> {
        self.drain_property_changes().await?;

        let mut handled = 0;
        while let Ok(bytes) = self.inbox.try_recv() {
            let envelope: Envelope = self.session.relay().codec().decode(&bytes)?;
            self.handle_envelope(envelope).await?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Leaves the session. If this participant held authority, the next
    /// one in join order takes over.
    ///
    /// # Errors
    /// Whatever [`LocalSession::leave`] returns.
    pub async fn leave(mut self) -> Result<(), DropgridError> {
        self.client.leave();
        self.session.leave(self.id()).await
    }

    async fn handle_envelope(&mut self, envelope: Envelope) -> Result<(), DropgridError> {
        let Envelope { sender, payload, .. } = envelope;

        // Only the authority sends these; the sender tells us who it is.
        if let SessionMessage::Resync { .. } = payload {
            let role = if sender == self.id() {
                Role::Authority
            } else {
                Role::Replica
            };
            self.client.set_role(role);
        }

        match self.client.handle_message(&payload) {
            Ok(()) => Ok(()),
            Err(e @ (SessionError::MissedMoves { .. } | SessionError::Board(_))) => {
                tracing::warn!(player_id = %self.id(), error = %e, "mirror out of step, reloading snapshot");
                self.reload().await;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn drain_property_changes(&mut self) -> Result<(), DropgridError> {
        let mut stale = false;
        loop {
            match self.changes.try_recv() {
                Ok(PropertyChange { key, .. }) => {
                    stale |= key == READY_KEY || key == TURN_KEY;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::debug!(player_id = %self.id(), skipped, "property changes lagged");
                    stale = true;
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        if stale {
            self.refresh_from_store().await?;
        }
        Ok(())
    }

    async fn refresh_from_store(&mut self) -> Result<(), DropgridError> {
        let ready = self.replicator.read_ready().await?;
        self.client.set_ready(ready);
        if let Some(turn) = self.replicator.read_turn().await? {
            self.client.set_turn(turn);
        }
        Ok(())
    }

    async fn reload(&mut self) {
        match self.replicator.load_snapshot().await {
            Some(snapshot) => self.client.resync_from(snapshot),
            None => self.client.join(None),
        }
    }
}
