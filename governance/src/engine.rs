//! Core governance engine: the only mutator of [`GovernanceState`].
//!
//! Every operation follows the same discipline: check the caller through
//! the injected [`CapabilityPolicy`], validate every input and the current
//! state, and only then mutate and record a notification. An `Err` return
//! therefore always leaves the state exactly as it was.
//!
//! The engine itself is a plain `&mut self` state machine. Serialising
//! concurrent callers is the job of [`crate::GovernanceLedger`].

use crate::capability::{Capability, CapabilityPolicy, RegistryPolicy};
use crate::error::GovernanceError;
use crate::event::GovernanceEvent;
use crate::params::GovernanceParams;
use crate::proposal::{Proposal, ProposalDraft, ProposalState, Tally, VoteReceipt};
use crate::state::GovernanceState;
use scholar_types::{Address, ProposalId, Tick};

pub struct GovernanceEngine {
    pub(crate) state: GovernanceState,
    pub(crate) params: GovernanceParams,
    policy: Box<dyn CapabilityPolicy>,
}

impl GovernanceEngine {
    /// Start a fresh engine administered by `admin`, gated by the registry.
    pub fn new(admin: Address, params: GovernanceParams) -> Result<Self, GovernanceError> {
        Self::from_state(GovernanceState::new(admin)?, params, Box::new(RegistryPolicy))
    }

    /// Resume from a previously captured state.
    pub fn from_state(
        state: GovernanceState,
        params: GovernanceParams,
        policy: Box<dyn CapabilityPolicy>,
    ) -> Result<Self, GovernanceError> {
        params.validate()?;
        Ok(Self {
            state,
            params,
            policy,
        })
    }

    /// Replace the eligibility policy.
    pub fn with_policy(mut self, policy: Box<dyn CapabilityPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> &GovernanceState {
        &self.state
    }

    pub fn into_state(self) -> GovernanceState {
        self.state
    }

    pub fn params(&self) -> &GovernanceParams {
        &self.params
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn get_proposal(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        self.state
            .proposal(id)
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    pub fn get_proposal_state(&self, id: ProposalId) -> Result<ProposalState, GovernanceError> {
        self.get_proposal(id).map(|p| p.state)
    }

    pub fn get_receipt(&self, id: ProposalId, voter: &Address) -> Option<VoteReceipt> {
        self.state.receipt(id, voter).copied()
    }

    pub fn has_voted(&self, id: ProposalId, voter: &Address) -> bool {
        self.state.receipt(id, voter).is_some()
    }

    /// Whether a ballot cast at `now` would pass the state and window checks.
    pub fn is_voting_active(&self, id: ProposalId, now: Tick) -> Result<bool, GovernanceError> {
        self.get_proposal(id).map(|p| p.accepts_votes_at(now))
    }

    pub fn proposal_count(&self) -> u64 {
        self.state.proposal_count()
    }

    /// Quorum a proposal finalized right now would have to meet.
    pub fn quorum_required(&self) -> u64 {
        self.params.quorum_required(self.state.registry.voter_count())
    }

    /// Whether the active policy lets `who` exercise `capability`.
    pub fn permits(&self, who: &Address, capability: Capability) -> bool {
        self.policy.permits(&self.state.registry, who, capability)
    }

    pub fn events(&self) -> &[GovernanceEvent] {
        self.state.events()
    }

    // ── Membership ──────────────────────────────────────────────────────

    pub fn register_voter(
        &mut self,
        caller: &Address,
        voter: Address,
    ) -> Result<(), GovernanceError> {
        self.require(caller, Capability::Admin)?;
        self.state.registry.register_voter(voter)?;
        tracing::info!(
            %voter,
            voters = self.state.registry.voter_count(),
            "voter registered"
        );
        self.emit(GovernanceEvent::VoterRegistered { voter });
        Ok(())
    }

    pub fn remove_voter(
        &mut self,
        caller: &Address,
        voter: Address,
    ) -> Result<(), GovernanceError> {
        self.require(caller, Capability::Admin)?;
        self.state.registry.remove_voter(voter)?;
        tracing::info!(
            %voter,
            voters = self.state.registry.voter_count(),
            "voter removed"
        );
        self.emit(GovernanceEvent::VoterRemoved { voter });
        Ok(())
    }

    /// Grant a capability. Voter grants behave exactly like
    /// [`Self::register_voter`], notification included.
    pub fn grant(
        &mut self,
        caller: &Address,
        holder: Address,
        capability: Capability,
    ) -> Result<(), GovernanceError> {
        if capability == Capability::Voter {
            return self.register_voter(caller, holder);
        }
        self.require(caller, Capability::Admin)?;
        self.state.registry.grant(holder, capability)?;
        tracing::info!(%holder, %capability, "capability granted");
        self.emit(GovernanceEvent::CapabilityGranted { holder, capability });
        Ok(())
    }

    /// Revoke a capability. Voter revocations behave exactly like
    /// [`Self::remove_voter`].
    pub fn revoke(
        &mut self,
        caller: &Address,
        holder: Address,
        capability: Capability,
    ) -> Result<(), GovernanceError> {
        if capability == Capability::Voter {
            return self.remove_voter(caller, holder);
        }
        self.require(caller, Capability::Admin)?;
        self.state.registry.revoke(holder, capability)?;
        tracing::info!(%holder, %capability, "capability revoked");
        self.emit(GovernanceEvent::CapabilityRevoked { holder, capability });
        Ok(())
    }

    // ── Proposal store ──────────────────────────────────────────────────

    /// Create a proposal whose voting window is `[now, now + voting_period)`.
    ///
    /// Nothing is allocated when validation fails.
    pub fn create_proposal(
        &mut self,
        caller: &Address,
        draft: ProposalDraft,
        now: Tick,
    ) -> Result<ProposalId, GovernanceError> {
        self.require(caller, Capability::Proposer)?;
        draft.validate()?;

        let id = self.state.next_id;
        let end = now.saturating_add(self.params.voting_period);
        let proposal = Proposal {
            id,
            author: *caller,
            kind: draft.kind,
            title: draft.title,
            description: draft.description,
            content_ref: draft.content_ref,
            start: now,
            end,
            tally: Tally::default(),
            state: ProposalState::Active,
            executed: false,
        };
        let event = GovernanceEvent::ProposalCreated {
            id,
            proposer: *caller,
            kind: proposal.kind,
            title: proposal.title.clone(),
            start: now,
            end,
        };

        self.state.proposals.insert(id, proposal);
        self.state.next_id = id.next();
        tracing::info!(proposal = %id, author = %caller, start = %now, %end, "proposal created");
        self.emit(event);
        Ok(id)
    }

    // ── Internals ───────────────────────────────────────────────────────

    pub(crate) fn require(
        &self,
        who: &Address,
        capability: Capability,
    ) -> Result<(), GovernanceError> {
        if self.permits(who, capability) {
            Ok(())
        } else {
            Err(GovernanceError::MissingCapability {
                who: *who,
                capability,
            })
        }
    }

    pub(crate) fn proposal_mut(
        &mut self,
        id: ProposalId,
    ) -> Result<&mut Proposal, GovernanceError> {
        self.state
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    pub(crate) fn emit(&mut self, event: GovernanceEvent) {
        self.state.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::ProposalKind;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    fn draft(title: &str) -> ProposalDraft {
        ProposalDraft::new(
            ProposalKind::CourseApproval,
            title,
            "Approve the intro course",
            "ipfs://course-101",
        )
    }

    fn engine() -> GovernanceEngine {
        GovernanceEngine::new(addr(1), GovernanceParams::default()).unwrap()
    }

    #[test]
    fn identifiers_start_at_one_and_increase() {
        let mut engine = engine();
        let a = engine.create_proposal(&addr(1), draft("a"), Tick::new(10)).unwrap();
        let b = engine.create_proposal(&addr(1), draft("b"), Tick::new(11)).unwrap();
        assert_eq!(a, ProposalId::FIRST);
        assert_eq!(b, ProposalId::new(2));
        assert_eq!(engine.proposal_count(), 2);
    }

    #[test]
    fn create_stamps_window_and_starts_active() {
        let mut engine = engine();
        let id = engine.create_proposal(&addr(1), draft("a"), Tick::new(100)).unwrap();
        let p = engine.get_proposal(id).unwrap();
        assert_eq!(p.start, Tick::new(100));
        assert_eq!(p.end, Tick::new(100 + crate::params::DEFAULT_VOTING_PERIOD));
        assert_eq!(p.state, ProposalState::Active);
        assert_eq!(p.tally, Tally::default());
        assert!(!p.executed);
        assert_eq!(p.author, addr(1));
        assert_eq!(p.content_ref, "ipfs://course-101");
    }

    #[test]
    fn empty_title_allocates_nothing() {
        let mut engine = engine();
        let err = engine
            .create_proposal(&addr(1), draft(""), Tick::new(1))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::EmptyTitle));
        assert_eq!(engine.proposal_count(), 0);
        assert!(engine.events().is_empty());

        let id = engine.create_proposal(&addr(1), draft("ok"), Tick::new(1)).unwrap();
        assert_eq!(id, ProposalId::FIRST);
    }

    #[test]
    fn create_requires_proposer() {
        let mut engine = engine();
        engine.register_voter(&addr(1), addr(2)).unwrap();
        let err = engine
            .create_proposal(&addr(2), draft("a"), Tick::new(1))
            .unwrap_err();
        assert!(matches!(
            err,
            GovernanceError::MissingCapability {
                capability: Capability::Proposer,
                ..
            }
        ));
    }

    #[test]
    fn membership_changes_are_admin_only() {
        let mut engine = engine();
        let err = engine.register_voter(&addr(2), addr(3)).unwrap_err();
        assert!(matches!(
            err,
            GovernanceError::MissingCapability {
                capability: Capability::Admin,
                ..
            }
        ));
        assert_eq!(engine.state().registry().voter_count(), 1);

        engine.grant(&addr(1), addr(2), Capability::Proposer).unwrap();
        assert!(engine.permits(&addr(2), Capability::Proposer));
        assert!(engine.revoke(&addr(2), addr(1), Capability::Validator).is_err());
    }

    #[test]
    fn membership_notifications_are_recorded() {
        let mut engine = engine();
        engine.register_voter(&addr(1), addr(2)).unwrap();
        engine.grant(&addr(1), addr(2), Capability::Validator).unwrap();
        engine.grant(&addr(1), addr(3), Capability::Voter).unwrap();
        engine.remove_voter(&addr(1), addr(2)).unwrap();
        assert_eq!(
            engine.events(),
            &[
                GovernanceEvent::VoterRegistered { voter: addr(2) },
                GovernanceEvent::CapabilityGranted {
                    holder: addr(2),
                    capability: Capability::Validator
                },
                GovernanceEvent::VoterRegistered { voter: addr(3) },
                GovernanceEvent::VoterRemoved { voter: addr(2) },
            ]
        );
    }

    #[test]
    fn unknown_proposal_is_not_found() {
        let engine = engine();
        assert!(matches!(
            engine.get_proposal_state(ProposalId::new(9)),
            Err(GovernanceError::ProposalNotFound(_))
        ));
        assert!(engine.is_voting_active(ProposalId::new(9), Tick::ZERO).is_err());
    }
}
