//! Wire protocol for dropgrid.
//!
//! This crate defines what participants and the authority say to each
//! other:
//!
//! - **Types** ([`SessionMessage`], [`MoveRequest`], [`ApplyResult`],
//!   [`Envelope`], etc.): the messages themselves.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages become
//!   bytes.
//! - **Substrate** ([`Substrate`]): the delivery primitives the engine
//!   consumes but does not own.
//!
//! ```text
//! Substrate (bytes) → Protocol (Envelope) → Authority / Session
//! ```

mod codec;
mod error;
mod substrate;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use substrate::Substrate;
pub use types::{
    ApplyResult, Envelope, MoveRejection, MoveRequest, MoveResult, PlayerId,
    Recipient, SessionMessage,
};
