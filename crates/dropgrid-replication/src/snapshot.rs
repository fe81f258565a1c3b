//! The typed snapshot and its mapping onto store properties.

use dropgrid_board::{Alliance, BoardConfig, BoardState};

use crate::{PropertyValue, ReplicationError};

/// Property key holding whose turn it is: `0` PlayerA, `1` PlayerB.
pub const TURN_KEY: &str = "TURN";

/// Property key holding the encoded board (`rows * columns` digits).
pub const BOARD_KEY: &str = "BOARD";

/// Property key holding the readiness flag: `1` when both seats are filled.
pub const READY_KEY: &str = "READY";

/// The persisted `{turn, board, ready}` triple.
///
/// Whoever was not present when state changed rebuilds from this, and on
/// join, reconnect or handover it wins over any in-memory state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicatedSnapshot {
    pub turn: Alliance,
    pub board: BoardState,
    pub ready: bool,
}

impl ReplicatedSnapshot {
    /// An empty board with `turn` to move.
    pub fn fresh(config: &BoardConfig, turn: Alliance, ready: bool) -> Self {
        Self {
            turn,
            board: BoardState::with_config(config),
            ready,
        }
    }

    /// The store entries that represent this snapshot.
    pub fn to_properties(&self) -> [(&'static str, PropertyValue); 3] {
        [
            (TURN_KEY, PropertyValue::Int(i64::from(self.turn.turn_bit()))),
            (BOARD_KEY, PropertyValue::Str(self.board.serialize())),
            (READY_KEY, PropertyValue::Int(i64::from(self.ready))),
        ]
    }

    /// Rebuilds a snapshot from raw store values.
    ///
    /// A missing `TURN` falls back to `fallback_turn` and a missing `READY`
    /// reads as not ready.
    ///
    /// # Errors
    /// - [`ReplicationError::Absent`] if there is no board
    /// - [`ReplicationError::StaleSnapshot`] if any value is malformed or
    ///   the board has floating pieces
    pub fn from_properties(
        turn: Option<&PropertyValue>,
        board: Option<&PropertyValue>,
        ready: Option<&PropertyValue>,
        config: &BoardConfig,
        fallback_turn: Alliance,
    ) -> Result<Self, ReplicationError> {
        let encoded = match board {
            None => return Err(ReplicationError::Absent),
            Some(PropertyValue::Str(encoded)) => encoded,
            Some(other) => {
                return Err(ReplicationError::StaleSnapshot(format!(
                    "{BOARD_KEY} is not a string: {other:?}"
                )));
            }
        };

        let board =
            BoardState::deserialize(encoded, config.rows, config.columns)
                .map_err(|e| ReplicationError::StaleSnapshot(e.to_string()))?;
        if let Some(coord) = board.find_gravity_violation() {
            return Err(ReplicationError::StaleSnapshot(format!(
                "floating piece at {coord}"
            )));
        }

        let turn = match turn {
            Some(value) => parse_turn(value)?,
            None => fallback_turn,
        };
        let ready = match ready {
            Some(value) => parse_ready(value)?,
            None => false,
        };

        Ok(Self { turn, board, ready })
    }
}

pub(crate) fn parse_turn(value: &PropertyValue) -> Result<Alliance, ReplicationError> {
    match value {
        PropertyValue::Int(bit) => Alliance::from_turn_bit(*bit).ok_or_else(|| {
            ReplicationError::StaleSnapshot(format!("{TURN_KEY} out of range: {bit}"))
        }),
        other => Err(ReplicationError::StaleSnapshot(format!(
            "{TURN_KEY} is not an int: {other:?}"
        ))),
    }
}

pub(crate) fn parse_ready(value: &PropertyValue) -> Result<bool, ReplicationError> {
    match value {
        PropertyValue::Int(flag) => Ok(*flag != 0),
        other => Err(ReplicationError::StaleSnapshot(format!(
            "{READY_KEY} is not an int: {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> BoardConfig {
        BoardConfig {
            rows: 2,
            columns: 3,
            win_length: 2,
        }
    }

    #[test]
    fn test_to_properties_encodes_turn_board_ready() {
        let mut snapshot =
            ReplicatedSnapshot::fresh(&small(), Alliance::PlayerB, true);
        snapshot.board.set_piece(1, Alliance::PlayerA).unwrap();

        let [turn, board, ready] = snapshot.to_properties();
        assert_eq!(turn, (TURN_KEY, PropertyValue::Int(1)));
        assert_eq!(board, (BOARD_KEY, PropertyValue::Str("000010".into())));
        assert_eq!(ready, (READY_KEY, PropertyValue::Int(1)));
    }

    #[test]
    fn test_from_properties_without_board_is_absent() {
        let result = ReplicatedSnapshot::from_properties(
            Some(&PropertyValue::Int(0)),
            None,
            Some(&PropertyValue::Int(1)),
            &small(),
            Alliance::PlayerA,
        );
        assert_eq!(result, Err(ReplicationError::Absent));
    }

    #[test]
    fn test_from_properties_wrong_length_is_stale() {
        let board = PropertyValue::Str("0000".into());
        let result = ReplicatedSnapshot::from_properties(
            None,
            Some(&board),
            None,
            &small(),
            Alliance::PlayerA,
        );
        assert!(matches!(result, Err(ReplicationError::StaleSnapshot(_))));
    }

    #[test]
    fn test_from_properties_floating_piece_is_stale() {
        // Top row occupied over an empty bottom cell.
        let board = PropertyValue::Str("100000".into());
        let result = ReplicatedSnapshot::from_properties(
            None,
            Some(&board),
            None,
            &small(),
            Alliance::PlayerA,
        );
        assert!(matches!(result, Err(ReplicationError::StaleSnapshot(_))));
    }

    #[test]
    fn test_from_properties_defaults_missing_turn_and_ready() {
        let board = PropertyValue::Str("000000".into());
        let snapshot = ReplicatedSnapshot::from_properties(
            None,
            Some(&board),
            None,
            &small(),
            Alliance::PlayerB,
        )
        .unwrap();
        assert_eq!(snapshot.turn, Alliance::PlayerB);
        assert!(!snapshot.ready);
    }

    #[test]
    fn test_parse_turn_rejects_out_of_range() {
        assert!(parse_turn(&PropertyValue::Int(2)).is_err());
        assert!(parse_turn(&PropertyValue::Str("0".into())).is_err());
        assert_eq!(parse_turn(&PropertyValue::Int(0)), Ok(Alliance::PlayerA));
    }
}
