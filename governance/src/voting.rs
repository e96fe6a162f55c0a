//! Ballot casting: one unit-weight vote per (proposal, voter).

use crate::capability::Capability;
use crate::engine::GovernanceEngine;
use crate::error::GovernanceError;
use crate::event::GovernanceEvent;
use crate::proposal::{ProposalState, VoteChoice, VoteReceipt};
use scholar_types::{Address, ProposalId, Tick};

/// Every ballot counts exactly once.
pub const VOTE_WEIGHT: u64 = 1;

impl GovernanceEngine {
    /// Cast `choice` on proposal `id` at tick `now`.
    ///
    /// The receipt write and the tally increment happen together after all
    /// checks pass; no caller can observe one without the other.
    pub fn cast_vote(
        &mut self,
        caller: &Address,
        id: ProposalId,
        choice: VoteChoice,
        now: Tick,
    ) -> Result<(), GovernanceError> {
        self.require(caller, Capability::Voter)?;

        let proposal = self.get_proposal(id)?;
        if proposal.state != ProposalState::Active {
            return Err(GovernanceError::NotActive {
                id,
                state: proposal.state,
            });
        }
        if !now.within(proposal.start, proposal.end) {
            return Err(GovernanceError::OutsideVotingWindow {
                id,
                now,
                start: proposal.start,
                end: proposal.end,
            });
        }
        if self.has_voted(id, caller) {
            return Err(GovernanceError::AlreadyVoted { id, voter: *caller });
        }

        let receipt = VoteReceipt {
            choice,
            weight: VOTE_WEIGHT,
            cast_at: now,
        };
        self.proposal_mut(id)?.tally.record(choice, VOTE_WEIGHT);
        self.state.receipts.insert((id, *caller), receipt);

        tracing::info!(proposal = %id, voter = %caller, %choice, "vote cast");
        self.emit(GovernanceEvent::VoteCast {
            id,
            voter: *caller,
            choice,
            weight: VOTE_WEIGHT,
        });
        Ok(())
    }

    /// Boundary form of [`Self::cast_vote`] taking the wire encoding of the
    /// choice (0 = against, 1 = for, 2 = abstain).
    pub fn cast_vote_raw(
        &mut self,
        caller: &Address,
        id: ProposalId,
        raw_choice: u8,
        now: Tick,
    ) -> Result<(), GovernanceError> {
        let choice = VoteChoice::try_from(raw_choice)?;
        self.cast_vote(caller, id, choice, now)
    }
}
