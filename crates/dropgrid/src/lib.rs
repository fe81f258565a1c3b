//! # Dropgrid
//!
//! Authoritative connect-N engine with replicated state and authority
//! handover.
//!
//! One participant holds authority and is the only writer of the board,
//! the turn and the readiness flag. Everyone else keeps a mirror that is
//! driven by the authority's broadcasts and by the shared property store.
//! When the holder leaves, the next participant in join order rebuilds
//! the authority from the stored snapshot and play continues.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dropgrid::prelude::*;
//!
//! # async fn run() -> Result<(), DropgridError> {
//! let session = LocalSession::new(MatchConfig::default())?;
//! let mut host = session.join(PlayerId(1)).await?;
//! let mut guest = session.join(PlayerId(2)).await?;
//!
//! host.submit_move(3).await?;
//! session.settle().await?;
//! host.pump().await?;
//! guest.pump().await?;
//! assert_eq!(guest.status(), ClientStatus::YourTurn);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod hub;
pub mod logging;
mod participant;
mod relay;

pub use config::MatchConfig;
pub use error::DropgridError;
pub use hub::LocalSession;
pub use participant::Participant;
pub use relay::{Inbox, LocalRelay};

pub use dropgrid_authority as authority;
pub use dropgrid_board as board;
pub use dropgrid_protocol as protocol;
pub use dropgrid_replication as replication;
pub use dropgrid_session as session;

pub mod prelude {
    pub use crate::{DropgridError, LocalRelay, LocalSession, MatchConfig, Participant};
    pub use dropgrid_authority::{
        AuthorityConfig, AuthorityHandle, AuthorityInfo, AuthorityState, GameResult,
        MoveOutcome,
    };
    pub use dropgrid_board::{
        Alliance, BoardConfig, BoardState, Cell, CellCoord, WinDetector, WinLine,
    };
    pub use dropgrid_protocol::{
        Codec, JsonCodec, MoveRejection, PlayerId, Recipient, SessionMessage, Substrate,
    };
    pub use dropgrid_replication::{MemoryStore, PropertyStore, ReplicatedSnapshot, Replicator};
    pub use dropgrid_session::{ClientSession, ClientStatus, RenderEvent, Role};
}
