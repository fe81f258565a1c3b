//! Client side of the dropgrid session protocol.
//!
//! Every participant, the authority holder included, keeps a
//! [`ClientSession`]: a read-only [`Mirror`] of the board, the lock token
//! that stops it from flooding requests, and the checks it runs before
//! sending one. The authority re-validates everything regardless.
//!
//! ```text
//! input ──prepare_move──→ MoveRequest ──→ authority
//! authority ──ApplyResult / UnlockRequester / Resync / Reset──→ handle_message
//! handle_message ──→ Mirror + RenderEvents + ClientStatus
//! ```

mod client;
mod error;
mod mirror;
mod render;

pub use client::{ClientSession, ClientStatus, Role};
pub use error::SessionError;
pub use mirror::{GameStatus, Mirror};
pub use render::RenderEvent;
