//! The delivery substrate the engine sends its messages through.
//!
//! dropgrid does not own a network. Whatever carries messages between
//! participants (a relay server, a peer mesh, or the in-process
//! `LocalRelay` in the `dropgrid` crate) implements [`Substrate`], and the
//! authority and clients only ever talk to that trait.
//!
//! The engine assumes, and does not itself implement:
//! - reliable delivery,
//! - in-order delivery per sender,
//! - replay of [`Recipient::AllBuffered`](crate::Recipient::AllBuffered)
//!   messages to participants who join later.

use std::future::Future;

use crate::{PlayerId, ProtocolError, Recipient, SessionMessage};

/// Reliable, per-sender ordered delivery of [`SessionMessage`]s.
///
/// ## Recipients
///
/// - [`Recipient::Authority`](crate::Recipient::Authority): only move
///   requests go here. The substrate forwards them to whoever holds
///   authority right now, which may change between two requests.
/// - [`Recipient::All`](crate::Recipient::All): every connected
///   participant, the sender included.
/// - [`Recipient::AllBuffered`](crate::Recipient::AllBuffered): like
///   `All`, and also kept for replay to anyone who connects later. Move
///   results and resets go this way so a late joiner can catch up.
/// - [`Recipient::Player`](crate::Recipient::Player): a broadcast that
///   only the named participant acts on. Unlock notices use it.
///
/// ## Ordering
///
/// Messages from one sender must arrive in the order they were sent.
/// Mirrors number move results and treat a gap as a reason to reload the
/// snapshot, so a substrate that reorders forces needless reloads.
///
/// ## Trait bounds
///
/// `Send + Sync + 'static` for the same reason as
/// [`Codec`](crate::Codec): the authority actor keeps the substrate in an
/// `Arc` for as long as it runs, on whatever thread Tokio picks.
///
/// ```rust
/// use dropgrid_protocol::{
///     PlayerId, ProtocolError, Recipient, SessionMessage, Substrate,
/// };
///
/// /// Drops everything. Handy when only the authority's state matters.
/// struct Discard;
///
/// impl Substrate for Discard {
///     async fn deliver(
///         &self,
///         _from: PlayerId,
///         _to: Recipient,
///         _msg: SessionMessage,
///     ) -> Result<(), ProtocolError> {
///         Ok(())
///     }
///
///     async fn clear_buffer(&self) {}
/// }
/// ```
pub trait Substrate: Send + Sync + 'static {
    /// Sends `msg` from `from` to whoever `to` resolves to.
    ///
    /// # Errors
    /// Returns `ProtocolError` if the message could not be encoded.
    /// Undeliverable recipients (nobody holds authority, the target left)
    /// are not errors; the message is dropped.
    fn deliver(
        &self,
        from: PlayerId,
        to: Recipient,
        msg: SessionMessage,
    ) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    /// Forgets every buffered message so later joiners do not replay a
    /// game that was restarted.
    fn clear_buffer(&self) -> impl Future<Output = ()> + Send;
}
