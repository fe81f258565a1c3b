//! Error types for the authority layer.
//!
//! Move rejections are not errors: they come back as
//! [`MoveOutcome::Rejected`](crate::MoveOutcome::Rejected). An
//! `AuthorityError` means a command could not be carried out at all.

use dropgrid_board::BoardError;
use dropgrid_protocol::PlayerId;
use dropgrid_replication::ReplicationError;

/// Errors that can occur during authority operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthorityError {
    /// The participant is already seated.
    #[error("player {0} already joined")]
    AlreadyJoined(PlayerId),

    /// The participant is not seated.
    #[error("player {0} is not a participant")]
    NotParticipant(PlayerId),

    /// The configuration cannot describe a playable game.
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] BoardError),

    /// The property store failed while taking over or restarting.
    #[error(transparent)]
    Replication(#[from] ReplicationError),

    /// The authority actor's command channel is closed.
    #[error("authority {0} is unavailable")]
    Unavailable(PlayerId),
}
