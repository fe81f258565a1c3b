//! The external key/value property store and an in-memory implementation.
//!
//! The store's interface stays deliberately untyped (named keys holding
//! ints or strings) so it can sit on top of any session service's room
//! properties. Typed access lives in [`ReplicatedSnapshot`](crate::ReplicatedSnapshot)
//! and [`Replicator`](crate::Replicator).

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};

use crate::ReplicationError;

/// Capacity of the change-notification channel. Slow subscribers that fall
/// further behind than this see `RecvError::Lagged` and should re-read.
const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// A single property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Int(i64),
    Str(String),
}

/// Notification that a key changed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChange {
    pub key: String,
    pub value: PropertyValue,
}

/// A shared, session-scoped key/value map with change notification.
///
/// Every participant sees the same map. Writes propagate at least once
/// to every subscriber.
///
/// ## Who writes what
///
/// Only the authority writes `TURN`, `BOARD` and `READY`. Everyone else
/// reads them: once when joining (to load the snapshot) and again
/// whenever a [`PropertyChange`] arrives. A store backed by a hosted
/// session service would map these calls onto its room properties.
///
/// ## Trait bounds
///
/// - `Send + Sync`: the authority actor and every participant hold the
///   same store and may call it from any Tokio worker thread.
/// - `'static`: the store lives inside long-running tasks, so it cannot
///   borrow anything shorter-lived.
///
/// ## Why `impl Future` instead of `async fn`?
///
/// Writing the return type out lets the trait promise the future is
/// `Send`, which `tokio::spawn` requires. Implementations still just
/// write `async fn`, as [`MemoryStore`] does.
///
/// ## Notifications
///
/// `subscribe` hands out a `tokio::sync::broadcast` receiver. A subscriber
/// that falls too far behind gets `Lagged` instead of the missed changes,
/// and should re-read the keys it cares about rather than trust its copy.
pub trait PropertyStore: Send + Sync + 'static {
    /// Reads the current value of `key`, `None` if it was never set.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<PropertyValue>, ReplicationError>> + Send;

    /// Writes `value` under `key`.
    fn set(
        &self,
        key: &str,
        value: PropertyValue,
    ) -> impl Future<Output = Result<(), ReplicationError>> + Send;

    /// Subscribes to changes made after this call.
    fn subscribe(&self) -> broadcast::Receiver<PropertyChange>;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// An in-process [`PropertyStore`].
///
/// Cloning is cheap and every clone shares the same map, so one store can
/// be handed to the authority and to every participant.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    properties: Arc<RwLock<HashMap<String, PropertyValue>>>,
    changes: broadcast::Sender<PropertyChange>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            properties: Arc::new(RwLock::new(HashMap::new())),
            changes,
        }
    }

    /// Deletes `key`. Returns the previous value, if any.
    ///
    /// Not part of [`PropertyStore`]; used to simulate missing keys.
    /// Subscribers are not notified: a [`PropertyChange`] always carries a
    /// value, and a participant only notices the gap on its next read.
    pub async fn remove(&self, key: &str) -> Option<PropertyValue> {
        self.properties.write().await.remove(key)
    }

    /// Returns a copy of every property.
    pub async fn entries(&self) -> HashMap<String, PropertyValue> {
        self.properties.read().await.clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyStore for MemoryStore {
    async fn get(
        &self,
        key: &str,
    ) -> Result<Option<PropertyValue>, ReplicationError> {
        Ok(self.properties.read().await.get(key).cloned())
    }

    async fn set(
        &self,
        key: &str,
        value: PropertyValue,
    ) -> Result<(), ReplicationError> {
        let changed = {
            let mut properties = self.properties.write().await;
            let previous = properties.insert(key.to_owned(), value.clone());
            previous.as_ref() != Some(&value)
        };

        if changed {
            // No subscribers is fine.
            let _ = self.changes.send(PropertyChange {
                key: key.to_owned(),
                value,
            });
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<PropertyChange> {
        self.changes.subscribe()
    }
}
