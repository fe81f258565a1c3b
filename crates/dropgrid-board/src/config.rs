//! Board dimensions and win threshold.

use serde::{Deserialize, Serialize};

use crate::BoardError;

/// Shape of the grid and the run length that wins.
///
/// The defaults describe the reference game: 8 rows, 9 columns, five in a
/// row. Override individual fields with struct update syntax:
///
/// ```rust
/// use dropgrid_board::BoardConfig;
///
/// let classic = BoardConfig { rows: 6, columns: 7, win_length: 4 };
/// let tall = BoardConfig { rows: 12, ..BoardConfig::default() };
/// assert!(classic.validated().is_ok());
/// assert_eq!(tall.columns, 9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Number of rows. Row `rows - 1` is the bottom.
    pub rows: usize,

    /// Number of columns a move may target.
    pub columns: usize,

    /// Minimum run length that ends the game.
    pub win_length: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            rows: 8,
            columns: 9,
            win_length: 5,
        }
    }
}

impl BoardConfig {
    /// Total number of cells, which is also the encoded board length.
    pub fn cell_count(&self) -> usize {
        self.rows * self.columns
    }

    /// Checks that the config describes a playable grid.
    ///
    /// # Errors
    /// [`BoardError::InvalidConfig`] if a dimension is zero or the win
    /// length could never fit on the grid.
    pub fn validated(self) -> Result<Self, BoardError> {
        if self.rows == 0 || self.columns == 0 {
            return Err(BoardError::InvalidConfig(format!(
                "grid must be at least 1x1, got {}x{}",
                self.rows, self.columns
            )));
        }
        if self.win_length < 2 {
            return Err(BoardError::InvalidConfig(format!(
                "win length must be at least 2, got {}",
                self.win_length
            )));
        }
        if self.win_length > self.rows.max(self.columns) {
            return Err(BoardError::InvalidConfig(format!(
                "win length {} does not fit a {}x{} grid",
                self.win_length, self.rows, self.columns
            )));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_reference_game() {
        let config = BoardConfig::default();
        assert_eq!(config.rows, 8);
        assert_eq!(config.columns, 9);
        assert_eq!(config.win_length, 5);
        assert_eq!(config.cell_count(), 72);
    }

    #[test]
    fn test_validated_rejects_zero_dimension() {
        let config = BoardConfig { rows: 0, ..BoardConfig::default() };
        assert!(matches!(
            config.validated(),
            Err(BoardError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validated_rejects_unreachable_win_length() {
        let config = BoardConfig { rows: 3, columns: 3, win_length: 4 };
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_validated_rejects_trivial_win_length() {
        let config = BoardConfig { win_length: 1, ..BoardConfig::default() };
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = BoardConfig { rows: 6, columns: 7, win_length: 4 };
        let json = serde_json::to_string(&config).unwrap();
        let back: BoardConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
