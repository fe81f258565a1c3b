//! Authority configuration and state machine.

use std::fmt;
use std::time::Duration;

use dropgrid_board::{Alliance, BoardConfig, BoardError, WinLine};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// AuthorityConfig
// ---------------------------------------------------------------------------

/// Configuration for an authority instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityConfig {
    /// Board shape and win threshold.
    pub board: BoardConfig,

    /// Who moves first after a fresh start or a restart.
    pub starting_alliance: Alliance,

    /// Capacity of the request queue in front of the authority.
    pub channel_size: usize,

    /// Minimum time between two accepted moves. Requests inside the window
    /// are rejected as `Throttled`. `Duration::ZERO` disables it.
    pub move_cooldown: Duration,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            starting_alliance: Alliance::PlayerA,
            channel_size: 64,
            move_cooldown: Duration::from_millis(150),
        }
    }
}

impl AuthorityConfig {
    /// Checks the board shape and the queue size.
    ///
    /// # Errors
    /// [`BoardError::InvalidConfig`] if either is unusable.
    pub fn validated(self) -> Result<Self, BoardError> {
        self.board.validated()?;
        if self.channel_size == 0 {
            return Err(BoardError::InvalidConfig(
                "channel size must be at least 1".into(),
            ));
        }
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// GameResult
// ---------------------------------------------------------------------------

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Won(WinLine),
    Draw,
}

impl GameResult {
    /// The winning alliance, `None` for a draw.
    pub fn winner(&self) -> Option<Alliance> {
        match self {
            Self::Won(line) => Some(line.alliance),
            Self::Draw => None,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Won(line) => write!(f, "{} wins", line.alliance),
            Self::Draw => write!(f, "draw"),
        }
    }
}

// ---------------------------------------------------------------------------
// AuthorityState
// ---------------------------------------------------------------------------

/// The lifecycle state of the authoritative game.
///
/// ```text
/// WaitingForOpponent ⇄ AwaitingMove(turn) → Processing → AwaitingMove(next)
///                                                      ↘ GameOver(result)
/// ```
///
/// - **WaitingForOpponent**: fewer than two participants. Also re-entered
///   mid-game when a participant leaves; the board is kept.
/// - **AwaitingMove**: ready, waiting for `turn` to move.
/// - **Processing**: one request is being validated and applied. Requests
///   are handled one at a time, so nothing outside ever observes it.
/// - **GameOver**: terminal until a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorityState {
    WaitingForOpponent,
    AwaitingMove(Alliance),
    Processing,
    GameOver(GameResult),
}

impl AuthorityState {
    /// Returns `true` once the game has ended.
    pub fn is_over(&self) -> bool {
        matches!(self, Self::GameOver(_))
    }
}

impl fmt::Display for AuthorityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WaitingForOpponent => write!(f, "WaitingForOpponent"),
            Self::AwaitingMove(turn) => write!(f, "AwaitingMove({turn})"),
            Self::Processing => write!(f, "Processing"),
            Self::GameOver(result) => write!(f, "GameOver({result})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dropgrid_board::{CellCoord, Direction};

    #[test]
    fn test_authority_config_default() {
        let config = AuthorityConfig::default();
        assert_eq!(config.board, BoardConfig::default());
        assert_eq!(config.starting_alliance, Alliance::PlayerA);
        assert_eq!(config.channel_size, 64);
        assert_eq!(config.move_cooldown, Duration::from_millis(150));
    }

    #[test]
    fn test_authority_config_rejects_zero_channel() {
        let config = AuthorityConfig {
            channel_size: 0,
            ..AuthorityConfig::default()
        };
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_authority_state_display() {
        let line = WinLine {
            alliance: Alliance::PlayerB,
            start: CellCoord::new(3, 2),
            end: CellCoord::new(7, 2),
            length: 5,
            direction: Direction::Vertical,
        };
        assert_eq!(
            AuthorityState::AwaitingMove(Alliance::PlayerA).to_string(),
            "AwaitingMove(PlayerA)"
        );
        assert_eq!(
            AuthorityState::GameOver(GameResult::Won(line)).to_string(),
            "GameOver(PlayerB wins)"
        );
        assert_eq!(
            AuthorityState::GameOver(GameResult::Draw).to_string(),
            "GameOver(draw)"
        );
    }

    #[test]
    fn test_game_result_winner() {
        assert_eq!(GameResult::Draw.winner(), None);
    }

    #[test]
    fn test_authority_state_is_over() {
        assert!(!AuthorityState::WaitingForOpponent.is_over());
        assert!(AuthorityState::GameOver(GameResult::Draw).is_over());
    }
}
