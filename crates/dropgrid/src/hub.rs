//! In-process session hub: roster, seats and authority election.
//!
//! [`LocalSession`] plays the part a hosted session service would: it
//! tracks who is in the room, starts an authority for the first
//! participant, and moves authority to the next participant in join
//! order when the holder leaves.

use std::sync::Arc;

use dropgrid_authority::{AuthorityHandle, AuthorityInfo, take_over};
use dropgrid_protocol::{Codec, JsonCodec, PlayerId};
use dropgrid_replication::{MemoryStore, PropertyStore, Replicator};
use dropgrid_session::{ClientSession, Role};
use tokio::sync::Mutex;

use crate::{DropgridError, LocalRelay, MatchConfig, Participant};

/// An in-process session shared by every participant.
///
/// Cheap to clone; every clone is the same session.
pub struct LocalSession<C: Codec = JsonCodec> {
    config: MatchConfig,
    store: MemoryStore,
    relay: LocalRelay<C>,
    hub: Arc<Mutex<HubState>>,
}

#[derive(Default)]
struct HubState {
    /// Participants in join order.
    roster: Vec<PlayerId>,
    authority: Option<AuthorityHandle>,
}

impl<C: Codec> Clone for LocalSession<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config,
            store: self.store.clone(),
            relay: self.relay.clone(),
            hub: Arc::clone(&self.hub),
        }
    }
}

impl LocalSession<JsonCodec> {
    /// Creates an empty session using JSON on the relay.
    ///
    /// # Errors
    /// [`DropgridError::Board`] if the config is unusable.
    pub fn new(config: MatchConfig) -> Result<Self, DropgridError> {
        Self::with_codec(config, JsonCodec)
    }
}

impl<C: Codec> LocalSession<C> {
    /// Creates an empty session whose relay encodes with `codec`.
    ///
    /// # Errors
    /// [`DropgridError::Board`] if the config is unusable.
    pub fn with_codec(config: MatchConfig, codec: C) -> Result<Self, DropgridError> {
        Ok(Self {
            config: config.validated()?,
            store: MemoryStore::new(),
            relay: LocalRelay::new(codec),
            hub: Arc::new(Mutex::new(HubState::default())),
        })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// The shared property store.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn relay(&self) -> &LocalRelay<C> {
        &self.relay
    }

    /// A replicator over the shared store with this session's board shape.
    pub fn replicator(&self) -> Replicator<MemoryStore> {
        Replicator::new(
            self.store.clone(),
            self.config.authority.board,
            self.config.authority.starting_alliance,
        )
    }

    /// Participants in join order.
    pub async fn roster(&self) -> Vec<PlayerId> {
        self.hub.lock().await.roster.clone()
    }

    /// Who holds authority right now.
    pub async fn authority_holder(&self) -> Option<PlayerId> {
        self.hub
            .lock()
            .await
            .authority
            .as_ref()
            .map(AuthorityHandle::holder)
    }

    /// A handle to the current authority.
    pub async fn authority(&self) -> Option<AuthorityHandle> {
        self.hub.lock().await.authority.clone()
    }

    /// Adds `player_id` and returns the participant driving it.
    ///
    /// The first participant becomes the authority.
    ///
    /// # Errors
    /// - [`DropgridError::AlreadyJoined`] if `player_id` is present
    /// - [`DropgridError::SessionFull`] if every seat is taken
    /// - [`DropgridError::Authority`] / [`DropgridError::Replication`] if
    ///   starting or updating the authority fails
    pub async fn join(&self, player_id: PlayerId) -> Result<Participant<C>, DropgridError> {
        let mut hub = self.hub.lock().await;
        if hub.roster.contains(&player_id) {
            return Err(DropgridError::AlreadyJoined(player_id));
        }
        if hub.roster.len() >= self.config.max_participants {
            return Err(DropgridError::SessionFull(self.config.max_participants));
        }

        // Subscribe before anything is written so no change is missed.
        let changes = self.store.subscribe();
        let inbox = self.relay.connect(player_id).await;
        hub.roster.push(player_id);

        let seated = match hub.authority.clone() {
            Some(authority) => authority
                .join(player_id)
                .await
                .map(|()| Role::Replica)
                .map_err(DropgridError::from),
            None => self
                .start_authority(player_id, hub.roster.clone())
                .await
                .map(|authority| {
                    hub.authority = Some(authority);
                    Role::Authority
                }),
        };
        let role = match seated {
            Ok(role) => role,
            Err(e) => {
                hub.roster.retain(|p| *p != player_id);
                self.relay.disconnect(player_id).await;
                return Err(e);
            }
        };
        tracing::info!(%player_id, ?role, participants = hub.roster.len(), "joined session");
        drop(hub);

        let replicator = self.replicator();
        let mut client = ClientSession::new(
            player_id,
            role,
            self.config.authority.board,
            self.config.authority.starting_alliance,
        );
        client.join(replicator.load_snapshot().await);

        Ok(Participant::new(client, inbox, changes, replicator, self.clone()))
    }

    /// Removes `player_id`.
    ///
    /// When the holder leaves, the first remaining participant in join
    /// order takes over. When the last participant leaves, the session
    /// has no authority until someone joins.
    ///
    /// # Errors
    /// - [`DropgridError::NotJoined`] if `player_id` is not present
    /// - [`DropgridError::Authority`] / [`DropgridError::Replication`] if
    ///   the handover fails
    pub async fn leave(&self, player_id: PlayerId) -> Result<(), DropgridError> {
        let mut hub = self.hub.lock().await;
        let Some(index) = hub.roster.iter().position(|p| *p == player_id) else {
            return Err(DropgridError::NotJoined(player_id));
        };
        hub.roster.remove(index);
        self.relay.disconnect(player_id).await;
        tracing::info!(%player_id, participants = hub.roster.len(), "left session");

        let Some(authority) = hub.authority.clone() else {
            return Ok(());
        };
        if authority.holder() != player_id {
            authority.leave(player_id).await?;
            return Ok(());
        }

        self.stop_authority(&authority).await;
        hub.authority = None;
        if let Some(&next) = hub.roster.first() {
            let authority = self.start_authority(next, hub.roster.clone()).await?;
            hub.authority = Some(authority);
        } else {
            // Nobody is left to be ready.
            self.replicator().recompute_readiness(0).await?;
        }
        Ok(())
    }

    /// Moves authority to `player_id` while everyone stays seated.
    ///
    /// # Errors
    /// - [`DropgridError::NotJoined`] if `player_id` is not present
    /// - [`DropgridError::Authority`] / [`DropgridError::Replication`] if
    ///   the handover fails
    pub async fn transfer_authority(&self, player_id: PlayerId) -> Result<(), DropgridError> {
        let mut hub = self.hub.lock().await;
        if !hub.roster.contains(&player_id) {
            return Err(DropgridError::NotJoined(player_id));
        }
        if let Some(authority) = hub.authority.take() {
            if authority.holder() == player_id {
                hub.authority = Some(authority);
                return Ok(());
            }
            self.stop_authority(&authority).await;
        }
        let authority = self.start_authority(player_id, hub.roster.clone()).await?;
        hub.authority = Some(authority);
        Ok(())
    }

    /// Restarts the game on the current authority. Does nothing when
    /// nobody holds authority.
    ///
    /// # Errors
    /// [`DropgridError::Authority`] if the authority fails to restart.
    pub async fn restart(&self) -> Result<(), DropgridError> {
        match self.authority().await {
            Some(authority) => Ok(authority.restart().await?),
            None => Ok(()),
        }
    }

    /// Waits until the authority has handled everything queued so far and
    /// returns its state.
    ///
    /// Broadcasts go out before the actor picks up its next command, so
    /// after this returns every result is in the inboxes.
    pub async fn settle(&self) -> Result<Option<AuthorityInfo>, DropgridError> {
        match self.authority().await {
            Some(authority) => Ok(Some(authority.get_info().await?)),
            None => Ok(None),
        }
    }

    async fn start_authority(
        &self,
        holder: PlayerId,
        roster: Vec<PlayerId>,
    ) -> Result<AuthorityHandle, DropgridError> {
        let authority = take_over(
            holder,
            roster,
            self.config.authority,
            self.replicator(),
            Arc::new(self.relay.clone()),
        )
        .await?;
        self.relay.set_authority(Some(authority.clone())).await;
        Ok(authority)
    }

    /// Cuts the authority off from new requests, lets it finish what it
    /// already queued, then stops it.
    async fn stop_authority(&self, authority: &AuthorityHandle) {
        self.relay.set_authority(None).await;
        let _ = authority.get_info().await;
        let _ = authority.shutdown().await;
        tracing::info!(holder = %authority.holder(), "authority released");
    }
}
