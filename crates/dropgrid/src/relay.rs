//! In-process delivery substrate.
//!
//! [`LocalRelay`] stands in for a relay server: it hands move requests to
//! whoever holds authority, fans broadcasts out to every connected
//! participant as codec-encoded [`Envelope`]s, and keeps buffered
//! broadcasts so late joiners can replay them.

use std::collections::HashMap;
use std::sync::Arc;

use dropgrid_authority::AuthorityHandle;
use dropgrid_protocol::{
    Codec, Envelope, JsonCodec, PlayerId, ProtocolError, Recipient,
    SessionMessage, Substrate,
};
use tokio::sync::{Mutex, mpsc};

/// Receiving end of a participant's inbox. Each item is one encoded
/// [`Envelope`].
pub type Inbox = mpsc::UnboundedReceiver<Vec<u8>>;

/// A [`Substrate`] that delivers within the current process.
///
/// Cheap to clone; every clone is the same relay.
pub struct LocalRelay<C: Codec = JsonCodec> {
    inner: Arc<RelayInner<C>>,
}

struct RelayInner<C> {
    codec: C,
    state: Mutex<RelayState>,
}

#[derive(Default)]
struct RelayState {
    /// Connected participants in connection order.
    inboxes: Vec<(PlayerId, mpsc::UnboundedSender<Vec<u8>>)>,
    authority: Option<AuthorityHandle>,
    /// Encoded `AllBuffered` envelopes, oldest first.
    buffered: Vec<Vec<u8>>,
    /// Last sequence number used per sender.
    seqs: HashMap<PlayerId, u64>,
}

impl<C: Codec> Clone for LocalRelay<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Default for LocalRelay<JsonCodec> {
    fn default() -> Self {
        Self::new(JsonCodec)
    }
}

impl<C: Codec> LocalRelay<C> {
    pub fn new(codec: C) -> Self {
        Self {
            inner: Arc::new(RelayInner {
                codec,
                state: Mutex::new(RelayState::default()),
            }),
        }
    }

    /// The codec envelopes are encoded with.
    pub fn codec(&self) -> &C {
        &self.inner.codec
    }

    /// Opens an inbox for `player_id`, pre-filled with every buffered
    /// broadcast. A second connect replaces the first inbox.
    pub async fn connect(&self, player_id: PlayerId) -> Inbox {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.inner.state.lock().await;
        for bytes in &state.buffered {
            let _ = tx.send(bytes.clone());
        }
        tracing::debug!(%player_id, replayed = state.buffered.len(), "inbox connected");
        state.inboxes.retain(|(id, _)| *id != player_id);
        state.inboxes.push((player_id, tx));
        rx
    }

    /// Closes `player_id`'s inbox.
    pub async fn disconnect(&self, player_id: PlayerId) {
        let mut state = self.inner.state.lock().await;
        state.inboxes.retain(|(id, _)| *id != player_id);
    }

    /// Points unicast-to-authority traffic at `authority`. With `None`,
    /// requests are dropped until a new authority is set.
    pub async fn set_authority(&self, authority: Option<AuthorityHandle>) {
        self.inner.state.lock().await.authority = authority;
    }

    /// Number of broadcasts a new joiner would replay.
    pub async fn buffered_len(&self) -> usize {
        self.inner.state.lock().await.buffered.len()
    }
}

impl<C: Codec> Substrate for LocalRelay<C> {
    async fn deliver(
        &self,
        from: PlayerId,
        to: Recipient,
        msg: SessionMessage,
    ) -> Result<(), ProtocolError> {
        if to == Recipient::Authority {
            let SessionMessage::RequestMove(request) = msg else {
                return Err(ProtocolError::InvalidMessage(
                    "only move requests go to the authority".into(),
                ));
            };
            // Clone the handle out so the lock is not held across the send.
            let authority = self.inner.state.lock().await.authority.clone();
            match authority {
                Some(handle) => {
                    if let Err(e) = handle.request_move(request).await {
                        tracing::warn!(%from, error = %e, "request lost in handover");
                    }
                }
                None => tracing::warn!(%from, "no authority, request dropped"),
            }
            return Ok(());
        }

        let mut state = self.inner.state.lock().await;
        let seq = {
            let seq = state.seqs.entry(from).or_insert(0);
            *seq += 1;
            *seq
        };
        let envelope = Envelope {
            seq,
            sender: from,
            payload: msg,
        };
        let bytes = self.inner.codec.encode(&envelope)?;

        if to == Recipient::AllBuffered {
            state.buffered.push(bytes.clone());
        }
        // `Player` is a broadcast the recipient filters by id.
        for (_, inbox) in &state.inboxes {
            let _ = inbox.send(bytes.clone());
        }
        Ok(())
    }

    async fn clear_buffer(&self) {
        let mut state = self.inner.state.lock().await;
        tracing::debug!(dropped = state.buffered.len(), "broadcast buffer cleared");
        state.buffered.clear();
    }
}
