//! Replicated session properties for dropgrid.
//!
//! The authority mirrors `{turn, board, ready}` into an external key/value
//! store; anyone who was not around when state changed (late joiners,
//! reconnecting clients, a new authority) rebuilds from it.
//!
//! - **Store** ([`PropertyStore`], [`MemoryStore`], [`PropertyValue`]):
//!   the untyped key/value boundary.
//! - **Snapshot** ([`ReplicatedSnapshot`]): the typed triple and its
//!   mapping onto the `TURN`/`BOARD`/`READY` keys.
//! - **Replicator** ([`Replicator`]): persist, load, readiness.
//!
//! ```text
//! Authority ──persist──→ PropertyStore ──load──→ late joiner / new authority
//! ```

mod error;
mod replicator;
mod snapshot;
mod store;

pub use error::ReplicationError;
pub use replicator::{MIN_PARTICIPANTS, Replicator};
pub use snapshot::{BOARD_KEY, READY_KEY, ReplicatedSnapshot, TURN_KEY};
pub use store::{MemoryStore, PropertyChange, PropertyStore, PropertyValue};
