//! One-shot lifecycle transitions: finalization, execution, cancellation.

use crate::capability::Capability;
use crate::engine::GovernanceEngine;
use crate::error::GovernanceError;
use crate::event::GovernanceEvent;
use crate::proposal::{ProposalState, Tally};
use scholar_types::{Address, ProposalId, Tick};

/// Outcome of counting a closed proposal.
pub fn outcome(tally: &Tally, quorum_required: u64) -> ProposalState {
    if tally.total() >= quorum_required && tally.for_votes > tally.against_votes {
        ProposalState::Succeeded
    } else {
        ProposalState::Defeated
    }
}

impl GovernanceEngine {
    /// Close voting on `id` and settle it as succeeded or defeated.
    ///
    /// Anyone may call this once the window has ended. Quorum is taken
    /// against the voter count at the moment of finalization, not at
    /// creation, so registry changes during the window shift it.
    pub fn finalize(
        &mut self,
        id: ProposalId,
        now: Tick,
    ) -> Result<ProposalState, GovernanceError> {
        let quorum_required = self.quorum_required();
        let proposal = self.proposal_mut(id)?;
        let tally = proposal.tally;
        let state = outcome(&tally, quorum_required);
        if !proposal.state.can_transition_to(state) {
            return Err(GovernanceError::NotActive {
                id,
                state: proposal.state,
            });
        }
        if !proposal.window_closed_at(now) {
            return Err(GovernanceError::VotingNotClosed {
                id,
                end: proposal.end,
            });
        }

        proposal.state = state;

        tracing::info!(
            proposal = %id,
            %state,
            for_votes = tally.for_votes,
            against_votes = tally.against_votes,
            abstain_votes = tally.abstain_votes,
            quorum = quorum_required,
            "proposal finalized"
        );
        self.emit(GovernanceEvent::ProposalFinalized {
            id,
            state,
            for_votes: tally.for_votes,
            against_votes: tally.against_votes,
            abstain_votes: tally.abstain_votes,
            quorum_required,
        });
        Ok(state)
    }

    /// Mark a succeeded proposal executed. Validators only; fires once.
    pub fn execute(&mut self, caller: &Address, id: ProposalId) -> Result<(), GovernanceError> {
        self.require(caller, Capability::Validator)?;
        let proposal = self.proposal_mut(id)?;
        if !proposal.state.can_transition_to(ProposalState::Executed) {
            return Err(GovernanceError::NotSucceeded {
                id,
                state: proposal.state,
            });
        }
        if proposal.executed {
            return Err(GovernanceError::AlreadyExecuted(id));
        }

        proposal.executed = true;
        proposal.state = ProposalState::Executed;

        tracing::info!(proposal = %id, validator = %caller, "proposal executed");
        self.emit(GovernanceEvent::ProposalExecuted { id });
        Ok(())
    }

    /// Divert a pending or active proposal to `Cancelled`. Only its author
    /// or an admin may do so.
    pub fn cancel(&mut self, caller: &Address, id: ProposalId) -> Result<(), GovernanceError> {
        let author = self.get_proposal(id)?.author;
        if *caller != author && !self.permits(caller, Capability::Admin) {
            return Err(GovernanceError::NotAuthorOrAdmin { who: *caller, id });
        }
        let proposal = self.proposal_mut(id)?;
        if !proposal.state.can_transition_to(ProposalState::Cancelled) {
            return Err(GovernanceError::NotCancellable {
                id,
                state: proposal.state,
            });
        }

        proposal.state = ProposalState::Cancelled;

        tracing::info!(proposal = %id, by = %caller, "proposal cancelled");
        self.emit(GovernanceEvent::ProposalCancelled { id });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::GovernanceParams;
    use crate::proposal::{ProposalDraft, ProposalKind, VoteChoice};

    const PERIOD: u64 = 10;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    /// Admin `1`, voters `2..=4` (four voters in total), validator `5`,
    /// proposer `6`, and one proposal by `6` opened at tick 0.
    fn setup() -> (GovernanceEngine, ProposalId) {
        let params = GovernanceParams {
            voting_period: PERIOD,
            quorum_pct: 30,
        };
        let admin = addr(1);
        let mut engine = GovernanceEngine::new(admin, params).unwrap();
        for n in 2..=4 {
            engine.register_voter(&admin, addr(n)).unwrap();
        }
        engine.grant(&admin, addr(5), Capability::Validator).unwrap();
        engine.grant(&admin, addr(6), Capability::Proposer).unwrap();
        let id = engine
            .create_proposal(
                &addr(6),
                ProposalDraft::new(ProposalKind::CurriculumUpdate, "Update", "New modules", "ref"),
                Tick::new(0),
            )
            .unwrap();
        (engine, id)
    }

    #[test]
    fn outcome_needs_quorum_and_strict_majority() {
        let tally = |f, a, x| Tally {
            for_votes: f,
            against_votes: a,
            abstain_votes: x,
        };
        assert_eq!(outcome(&tally(2, 0, 0), 1), ProposalState::Succeeded);
        assert_eq!(outcome(&tally(1, 1, 0), 1), ProposalState::Defeated);
        assert_eq!(outcome(&tally(1, 0, 0), 2), ProposalState::Defeated);
        // Abstentions count towards quorum but not majority.
        assert_eq!(outcome(&tally(1, 0, 2), 3), ProposalState::Succeeded);
        // Zero quorum still needs more for than against.
        assert_eq!(outcome(&tally(0, 0, 0), 0), ProposalState::Defeated);
    }

    #[test]
    fn success_then_execute_exactly_once() {
        let (mut engine, id) = setup();
        engine.cast_vote(&addr(2), id, VoteChoice::For, Tick::new(1)).unwrap();
        engine.cast_vote(&addr(3), id, VoteChoice::For, Tick::new(2)).unwrap();

        assert_eq!(engine.quorum_required(), 1);
        assert_eq!(engine.finalize(id, Tick::new(PERIOD)).unwrap(), ProposalState::Succeeded);

        engine.execute(&addr(5), id).unwrap();
        let p = engine.get_proposal(id).unwrap();
        assert_eq!(p.state, ProposalState::Executed);
        assert!(p.executed);

        let err = engine.execute(&addr(5), id).unwrap_err();
        assert!(matches!(err, GovernanceError::NotSucceeded { .. }));
        assert!(engine.get_proposal(id).unwrap().executed);
        let executions = engine
            .events()
            .iter()
            .filter(|e| matches!(e, GovernanceEvent::ProposalExecuted { .. }))
            .count();
        assert_eq!(executions, 1);
    }

    #[test]
    fn against_majority_is_defeated_and_cannot_execute() {
        let (mut engine, id) = setup();
        engine.cast_vote(&addr(2), id, VoteChoice::Against, Tick::new(1)).unwrap();
        engine.cast_vote(&addr(3), id, VoteChoice::Against, Tick::new(1)).unwrap();
        assert_eq!(engine.finalize(id, Tick::new(PERIOD + 5)).unwrap(), ProposalState::Defeated);

        let err = engine.execute(&addr(5), id).unwrap_err();
        assert!(matches!(err, GovernanceError::NotSucceeded { .. }));
        assert_eq!(err.kind(), crate::ErrorKind::State);
    }

    #[test]
    fn finalize_waits_for_window_end_and_runs_once() {
        let (mut engine, id) = setup();
        let err = engine.finalize(id, Tick::new(PERIOD - 1)).unwrap_err();
        assert!(matches!(err, GovernanceError::VotingNotClosed { .. }));
        assert_eq!(engine.get_proposal_state(id).unwrap(), ProposalState::Active);

        engine.finalize(id, Tick::new(PERIOD)).unwrap();
        let err = engine.finalize(id, Tick::new(PERIOD + 1)).unwrap_err();
        assert!(matches!(err, GovernanceError::NotActive { .. }));
    }

    #[test]
    fn vote_after_window_fails_even_with_history() {
        let (mut engine, id) = setup();
        engine.cast_vote(&addr(2), id, VoteChoice::For, Tick::new(3)).unwrap();
        for voter in [addr(2), addr(3)] {
            let err = engine
                .cast_vote(&voter, id, VoteChoice::For, Tick::new(PERIOD))
                .unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::State);
        }
    }

    #[test]
    fn no_votes_is_defeated() {
        let (mut engine, id) = setup();
        assert_eq!(engine.finalize(id, Tick::new(PERIOD)).unwrap(), ProposalState::Defeated);
    }

    #[test]
    fn quorum_tracks_voter_count_at_finalization() {
        // Intentional: quorum is read when finalizing, so a registry that
        // grows during the window raises the bar for ballots already cast.
        let (mut engine, id) = setup();
        engine.cast_vote(&addr(2), id, VoteChoice::For, Tick::new(1)).unwrap();
        for n in 10..16 {
            engine.register_voter(&addr(1), addr(n)).unwrap();
        }
        // 10 voters * 30% = 3 > 1 ballot.
        assert_eq!(engine.quorum_required(), 3);
        assert_eq!(engine.finalize(id, Tick::new(PERIOD)).unwrap(), ProposalState::Defeated);
    }

    #[test]
    fn quorum_can_shrink_after_votes_are_cast() {
        let params = GovernanceParams {
            voting_period: PERIOD,
            quorum_pct: 50,
        };
        let admin = addr(1);
        let mut engine = GovernanceEngine::new(admin, params).unwrap();
        for n in 2..=6 {
            engine.register_voter(&admin, addr(n)).unwrap();
        }
        let id = engine
            .create_proposal(
                &admin,
                ProposalDraft::new(ProposalKind::QualityReview, "Review", "Audit", ""),
                Tick::new(0),
            )
            .unwrap();
        engine.cast_vote(&addr(2), id, VoteChoice::For, Tick::new(1)).unwrap();
        engine.cast_vote(&addr(3), id, VoteChoice::For, Tick::new(1)).unwrap();
        // 6 voters at 50% need 3; dropping to 4 voters needs only 2.
        for n in 4..=5 {
            engine.remove_voter(&admin, addr(n)).unwrap();
        }
        assert_eq!(engine.finalize(id, Tick::new(PERIOD)).unwrap(), ProposalState::Succeeded);
    }

    #[test]
    fn execute_requires_validator() {
        let (mut engine, id) = setup();
        engine.cast_vote(&addr(2), id, VoteChoice::For, Tick::new(1)).unwrap();
        engine.finalize(id, Tick::new(PERIOD)).unwrap();
        let err = engine.execute(&addr(2), id).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Authorization);
        assert_eq!(engine.get_proposal_state(id).unwrap(), ProposalState::Succeeded);
    }

    #[test]
    fn author_or_admin_may_cancel_active() {
        let (mut engine, id) = setup();
        let err = engine.cancel(&addr(2), id).unwrap_err();
        assert!(matches!(err, GovernanceError::NotAuthorOrAdmin { .. }));

        engine.cancel(&addr(6), id).unwrap();
        assert_eq!(engine.get_proposal_state(id).unwrap(), ProposalState::Cancelled);
        assert_eq!(
            engine.events().last(),
            Some(&GovernanceEvent::ProposalCancelled { id })
        );

        let err = engine.cancel(&addr(1), id).unwrap_err();
        assert!(matches!(err, GovernanceError::NotCancellable { .. }));
    }

    #[test]
    fn admin_cancels_after_window_but_before_finalize() {
        let (mut engine, id) = setup();
        engine.cancel(&addr(1), id).unwrap();
        assert!(engine.finalize(id, Tick::new(PERIOD)).is_err());
        assert!(engine
            .cast_vote(&addr(2), id, VoteChoice::For, Tick::new(1))
            .is_err());
    }

    #[test]
    fn closed_proposals_cannot_be_cancelled() {
        let (mut engine, id) = setup();
        engine.cast_vote(&addr(2), id, VoteChoice::For, Tick::new(1)).unwrap();
        engine.finalize(id, Tick::new(PERIOD)).unwrap();
        let err = engine.cancel(&addr(6), id).unwrap_err();
        assert!(matches!(err, GovernanceError::NotCancellable { .. }));
        engine.execute(&addr(5), id).unwrap();
        assert!(engine.cancel(&addr(1), id).is_err());
    }
}
