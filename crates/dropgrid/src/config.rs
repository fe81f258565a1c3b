//! Configuration for an in-process match.

use dropgrid_authority::AuthorityConfig;
use dropgrid_board::BoardError;
use serde::{Deserialize, Serialize};

/// Settings for a [`LocalSession`](crate::LocalSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Passed to every authority the session starts.
    pub authority: AuthorityConfig,

    /// Joins beyond this many participants fail.
    pub max_participants: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            authority: AuthorityConfig::default(),
            max_participants: 2,
        }
    }
}

impl MatchConfig {
    /// Checks the authority config and the seat count.
    ///
    /// # Errors
    /// [`BoardError::InvalidConfig`] if either is unusable.
    pub fn validated(self) -> Result<Self, BoardError> {
        self.authority.validated()?;
        if self.max_participants < 2 {
            return Err(BoardError::InvalidConfig(format!(
                "a match needs at least 2 seats, got {}",
                self.max_participants
            )));
        }
        Ok(self)
    }
}
