//! Fixed governance parameters: voting window length and quorum.

use crate::error::GovernanceError;
use serde::{Deserialize, Serialize};

/// Default voting window length in ticks.
pub const DEFAULT_VOTING_PERIOD: u64 = 50_400;

/// Default quorum, as a percentage of registered voters.
pub const DEFAULT_QUORUM_PCT: u8 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceParams {
    /// Ticks between a proposal's creation and the end of its window.
    pub voting_period: u64,
    /// Percentage (0..=100) of registered voters that must cast a ballot.
    pub quorum_pct: u8,
}

impl GovernanceParams {
    pub fn validate(&self) -> Result<(), GovernanceError> {
        if self.voting_period == 0 {
            return Err(GovernanceError::Config(
                "voting_period must be at least one tick".into(),
            ));
        }
        if self.quorum_pct > 100 {
            return Err(GovernanceError::Config(format!(
                "quorum_pct must be within 0..=100, got {}",
                self.quorum_pct
            )));
        }
        Ok(())
    }

    /// Minimum ballots for a proposal to be eligible to succeed.
    ///
    /// `floor(voters * quorum_pct / 100)`: truncation is intentional and
    /// slightly relaxes the threshold compared to rounding.
    pub fn quorum_required(&self, voter_count: u64) -> u64 {
        voter_count.saturating_mul(self.quorum_pct as u64) / 100
    }
}

impl Default for GovernanceParams {
    fn default() -> Self {
        Self {
            voting_period: DEFAULT_VOTING_PERIOD,
            quorum_pct: DEFAULT_QUORUM_PCT,
        }
    }
}
