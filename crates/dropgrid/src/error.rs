//! Unified error type for dropgrid.

use dropgrid_authority::AuthorityError;
use dropgrid_board::BoardError;
use dropgrid_protocol::{PlayerId, ProtocolError};
use dropgrid_replication::ReplicationError;
use dropgrid_session::SessionError;

/// Top-level error that wraps every crate-specific error.
///
/// Each sub-crate error converts with `?`; the remaining variants belong
/// to the in-process session hub.
#[derive(Debug, thiserror::Error)]
pub enum DropgridError {
    /// Bad board shape or config.
    #[error(transparent)]
    Board(#[from] BoardError),

    /// A message could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The property store failed.
    #[error(transparent)]
    Replication(#[from] ReplicationError),

    /// The authority could not carry out a command.
    #[error(transparent)]
    Authority(#[from] AuthorityError),

    /// A client-side gate refused the move.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Every seat is taken.
    #[error("session is full ({0} participants)")]
    SessionFull(usize),

    /// The participant is already in the session.
    #[error("player {0} already joined")]
    AlreadyJoined(PlayerId),

    /// The participant is not in the session.
    #[error("player {0} is not in the session")]
    NotJoined(PlayerId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_board_error() {
        let err = BoardError::ColumnFull(3);
        let dropgrid_err: DropgridError = err.into();
        assert!(matches!(dropgrid_err, DropgridError::Board(_)));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let dropgrid_err: DropgridError = err.into();
        assert!(matches!(dropgrid_err, DropgridError::Protocol(_)));
        assert!(dropgrid_err.to_string().contains("bad"));
    }

    #[test]
    fn test_from_replication_error() {
        let dropgrid_err: DropgridError = ReplicationError::Absent.into();
        assert!(matches!(dropgrid_err, DropgridError::Replication(_)));
    }

    #[test]
    fn test_from_authority_error() {
        let err = AuthorityError::Unavailable(PlayerId(4));
        let dropgrid_err: DropgridError = err.into();
        assert!(matches!(dropgrid_err, DropgridError::Authority(_)));
        assert!(dropgrid_err.to_string().contains("P-4"));
    }

    #[test]
    fn test_from_session_error() {
        let dropgrid_err: DropgridError = SessionError::NotYourTurn.into();
        assert!(matches!(dropgrid_err, DropgridError::Session(_)));
        assert_eq!(dropgrid_err.to_string(), "not your turn");
    }
}
