//! Typed reads and writes of the replicated snapshot.

use dropgrid_board::{Alliance, BoardConfig, BoardState};

use crate::snapshot::{parse_ready, parse_turn};
use crate::{
    BOARD_KEY, PropertyStore, PropertyValue, READY_KEY, ReplicatedSnapshot,
    ReplicationError, TURN_KEY,
};

/// Participants needed before a game can start.
pub const MIN_PARTICIPANTS: usize = 2;

/// Mirrors game state into a [`PropertyStore`] and rebuilds it from there.
///
/// Holds the board shape so every decoded board has the right dimensions,
/// and the starting alliance used whenever no `TURN` has been written yet.
#[derive(Debug, Clone)]
pub struct Replicator<S: PropertyStore> {
    store: S,
    config: BoardConfig,
    starting_alliance: Alliance,
}

impl<S: PropertyStore> Replicator<S> {
    pub fn new(store: S, config: BoardConfig, starting_alliance: Alliance) -> Self {
        Self {
            store,
            config,
            starting_alliance,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn starting_alliance(&self) -> Alliance {
        self.starting_alliance
    }

    /// Writes `TURN`, `BOARD` and `READY`.
    ///
    /// Called by the authority after every accepted move and after a
    /// restart.
    pub async fn persist_snapshot(
        &self,
        snapshot: &ReplicatedSnapshot,
    ) -> Result<(), ReplicationError> {
        for (key, value) in snapshot.to_properties() {
            self.store.set(key, value).await?;
        }
        tracing::debug!(
            turn = %snapshot.turn,
            ready = snapshot.ready,
            pieces = snapshot.board.piece_count(),
            "snapshot persisted"
        );
        Ok(())
    }

    /// Reads the snapshot, reporting why it is unusable.
    ///
    /// # Errors
    /// - [`ReplicationError::Absent`] if no board was ever written
    /// - [`ReplicationError::StaleSnapshot`] if what was written is corrupt
    /// - [`ReplicationError::Store`] if the store could not be read
    pub async fn try_load(&self) -> Result<ReplicatedSnapshot, ReplicationError> {
        let turn = self.store.get(TURN_KEY).await?;
        let board = self.store.get(BOARD_KEY).await?;
        let ready = self.store.get(READY_KEY).await?;
        ReplicatedSnapshot::from_properties(
            turn.as_ref(),
            board.as_ref(),
            ready.as_ref(),
            &self.config,
            self.starting_alliance,
        )
    }

    /// Reads the snapshot for a join, reconnect or handover.
    ///
    /// Anything unusable comes back as `None` so the caller keeps a fresh
    /// board instead of failing.
    pub async fn load_snapshot(&self) -> Option<ReplicatedSnapshot> {
        match self.try_load().await {
            Ok(snapshot) => Some(snapshot),
            Err(ReplicationError::Absent) => {
                tracing::debug!("no snapshot persisted, starting fresh");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unusable snapshot");
                None
            }
        }
    }

    /// Sets `READY` from the participant count and returns it.
    ///
    /// When the game is ready and no `TURN` exists yet, `TURN` is
    /// initialised to the starting alliance. `BOARD` is never touched.
    pub async fn recompute_readiness(
        &self,
        participant_count: usize,
    ) -> Result<bool, ReplicationError> {
        let ready = participant_count >= MIN_PARTICIPANTS;
        self.store
            .set(READY_KEY, PropertyValue::Int(i64::from(ready)))
            .await?;

        if ready && self.store.get(TURN_KEY).await?.is_none() {
            self.store
                .set(
                    TURN_KEY,
                    PropertyValue::Int(i64::from(self.starting_alliance.turn_bit())),
                )
                .await?;
            tracing::debug!(turn = %self.starting_alliance, "turn initialised");
        }

        tracing::debug!(participant_count, ready, "readiness recomputed");
        Ok(ready)
    }

    /// Writes defaults for whichever of the three keys is missing.
    ///
    /// Run by a new authority so later reads never see a partial map.
    pub async fn ensure_properties_exist(&self) -> Result<(), ReplicationError> {
        let defaults = ReplicatedSnapshot::fresh(
            &self.config,
            self.starting_alliance,
            false,
        );
        for (key, value) in defaults.to_properties() {
            if self.store.get(key).await?.is_none() {
                self.store.set(key, value).await?;
                tracing::debug!(key, "property initialised");
            }
        }
        Ok(())
    }

    /// Persists an empty board with the starting alliance to move and
    /// returns it.
    pub async fn reset(
        &self,
        ready: bool,
    ) -> Result<ReplicatedSnapshot, ReplicationError> {
        let snapshot =
            ReplicatedSnapshot::fresh(&self.config, self.starting_alliance, ready);
        self.persist_snapshot(&snapshot).await?;
        Ok(snapshot)
    }

    /// Current `READY` flag; missing reads as `false`.
    pub async fn read_ready(&self) -> Result<bool, ReplicationError> {
        match self.store.get(READY_KEY).await? {
            Some(value) => parse_ready(&value),
            None => Ok(false),
        }
    }

    /// Current `TURN`, if one was ever written.
    pub async fn read_turn(&self) -> Result<Option<Alliance>, ReplicationError> {
        match self.store.get(TURN_KEY).await? {
            Some(value) => parse_turn(&value).map(Some),
            None => Ok(None),
        }
    }

    /// Current board, or a fresh one if none (or a corrupt one) is stored.
    pub async fn read_board(&self) -> BoardState {
        self.load_snapshot()
            .await
            .map(|snapshot| snapshot.board)
            .unwrap_or_else(|| BoardState::with_config(&self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    fn replicator() -> Replicator<MemoryStore> {
        Replicator::new(
            MemoryStore::new(),
            BoardConfig::default(),
            Alliance::PlayerA,
        )
    }

    #[tokio::test]
    async fn test_persist_then_load() {
        let replicator = replicator();
        let mut snapshot = ReplicatedSnapshot::fresh(
            replicator.config(),
            Alliance::PlayerB,
            true,
        );
        snapshot.board.set_piece(4, Alliance::PlayerA).unwrap();

        replicator.persist_snapshot(&snapshot).await.unwrap();
        assert_eq!(replicator.load_snapshot().await, Some(snapshot));
    }

    #[tokio::test]
    async fn test_load_on_empty_store_is_none() {
        let replicator = replicator();
        assert_eq!(replicator.try_load().await, Err(ReplicationError::Absent));
        assert_eq!(replicator.load_snapshot().await, None);
    }

    #[tokio::test]
    async fn test_load_with_short_board_is_none() {
        let replicator = replicator();
        replicator
            .store()
            .set(BOARD_KEY, PropertyValue::Str("000".into()))
            .await
            .unwrap();
        assert!(matches!(
            replicator.try_load().await,
            Err(ReplicationError::StaleSnapshot(_))
        ));
        assert_eq!(replicator.load_snapshot().await, None);
        assert_eq!(
            replicator.read_board().await,
            BoardState::with_config(replicator.config())
        );
    }

    #[tokio::test]
    async fn test_ensure_properties_exist_keeps_existing_values() {
        let replicator = replicator();
        replicator
            .store()
            .set(TURN_KEY, PropertyValue::Int(1))
            .await
            .unwrap();

        replicator.ensure_properties_exist().await.unwrap();

        assert_eq!(replicator.read_turn().await, Ok(Some(Alliance::PlayerB)));
        assert_eq!(replicator.read_ready().await, Ok(false));
        let snapshot = replicator.try_load().await.unwrap();
        assert_eq!(snapshot.board.piece_count(), 0);
    }

    #[tokio::test]
    async fn test_reset_writes_fresh_board_and_starting_turn() {
        let replicator = replicator();
        let mut snapshot = ReplicatedSnapshot::fresh(
            replicator.config(),
            Alliance::PlayerB,
            true,
        );
        snapshot.board.set_piece(0, Alliance::PlayerA).unwrap();
        replicator.persist_snapshot(&snapshot).await.unwrap();

        let fresh = replicator.reset(true).await.unwrap();

        assert_eq!(fresh.turn, Alliance::PlayerA);
        assert_eq!(fresh.board.piece_count(), 0);
        assert_eq!(replicator.load_snapshot().await, Some(fresh));
    }
}
