//! Error types for the replication layer.

/// Errors that can occur while reading or writing replicated properties.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplicationError {
    /// Nothing has been persisted yet (no `BOARD` key).
    #[error("no snapshot persisted")]
    Absent,

    /// A snapshot exists but cannot be trusted: wrong length, unknown
    /// symbols, floating pieces, or a value of the wrong type.
    #[error("stale snapshot: {0}")]
    StaleSnapshot(String),

    /// The property store itself failed.
    #[error("property store unavailable: {0}")]
    Store(String),
}
