//! Authoritative game state for dropgrid.
//!
//! Exactly one participant runs an authority at a time. It owns the
//! canonical board, validates every move request, persists the result and
//! broadcasts it.
//!
//! # Key types
//!
//! - [`TurnAuthority`]: the synchronous state machine behind validation
//! - [`AuthorityHandle`]: send commands to a running authority actor
//! - [`take_over`]: start an authority from the persisted snapshot
//! - [`AuthorityState`]: lifecycle state machine
//! - [`AuthorityConfig`]: board shape, starting alliance, queue size, cooldown

mod actor;
mod authority;
mod config;
mod error;
mod handover;

pub use actor::{AuthorityHandle, AuthorityInfo};
pub use authority::{MoveOutcome, TurnAuthority};
pub use config::{AuthorityConfig, AuthorityState, GameResult};
pub use error::AuthorityError;
pub use handover::take_over;
