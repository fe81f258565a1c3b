//! Becoming the authority: at session start and whenever it moves.
//!
//! A participant that takes over may never have been the authority before
//! and may hold a stale or empty local board, so everything is re-derived
//! from the persisted snapshot.

use std::sync::Arc;

use dropgrid_protocol::{PlayerId, Recipient, SessionMessage, Substrate};
use dropgrid_replication::{PropertyStore, Replicator};

use crate::actor::spawn_authority;
use crate::{AuthorityConfig, AuthorityError, AuthorityHandle, TurnAuthority};

/// Starts an authority for `holder`.
///
/// 1. Writes defaults for any missing `TURN`/`BOARD`/`READY` key.
/// 2. Recomputes readiness from `participants`.
/// 3. Loads the snapshot. An unusable one is replaced by a fresh board,
///    the substrate's buffer is cleared and `Reset` is broadcast.
/// 4. Spawns the actor.
/// 5. Broadcasts `Resync` so every client drops its lock token and picks up
///    the persisted turn.
///
/// `participants` is the current roster in join order, `holder` included.
///
/// # Errors
/// - [`AuthorityError::InvalidConfig`] for an unusable config
/// - [`AuthorityError::Replication`] if the store cannot be read or written
pub async fn take_over<St: PropertyStore, Su: Substrate>(
    holder: PlayerId,
    participants: Vec<PlayerId>,
    config: AuthorityConfig,
    replicator: Replicator<St>,
    substrate: Arc<Su>,
) -> Result<AuthorityHandle, AuthorityError> {
    let config = config.validated()?;

    replicator.ensure_properties_exist().await?;
    let ready = replicator.recompute_readiness(participants.len()).await?;

    let snapshot = match replicator.load_snapshot().await {
        Some(mut snapshot) => {
            snapshot.ready = ready;
            snapshot
        }
        None => {
            // Overwrite whatever unusable board is stored. Mirrors and the
            // replay buffer still hold the old game, so both are reset too.
            let fresh = replicator.reset(ready).await?;
            substrate.clear_buffer().await;
            if let Err(e) = substrate
                .deliver(holder, Recipient::AllBuffered, SessionMessage::Reset)
                .await
            {
                tracing::warn!(error = %e, "reset broadcast failed");
            }
            tracing::warn!(%holder, "stored snapshot unusable, started a fresh game");
            fresh
        }
    };
    let turn = snapshot.turn;

    let authority = TurnAuthority::from_snapshot(config, snapshot)?;
    tracing::info!(
        %holder,
        %turn,
        ready,
        state = %authority.state(),
        moves = authority.move_number(),
        "authority taken over"
    );

    let handle =
        spawn_authority(holder, authority, participants, replicator, substrate.clone());

    if let Err(e) = substrate
        .deliver(holder, Recipient::All, SessionMessage::Resync { turn, ready })
        .await
    {
        tracing::warn!(error = %e, "resync broadcast failed");
    }

    Ok(handle)
}
