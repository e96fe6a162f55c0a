//! Serialized ledger front-end for concurrent callers.
//!
//! All mutating calls funnel through one writer lock: the tick is read, the
//! engine validates and mutates, and the resulting notifications are folded
//! into the committed view and fanned out, all inside a single critical
//! section. That gives one global commit order and one identifier sequence.
//!
//! Read queries never touch the writer lock. They are answered from a
//! [`CommittedView`] that is patched after every commit with only the
//! entities the commit touched.

use crate::capability::Capability;
use crate::engine::GovernanceEngine;
use crate::error::GovernanceError;
use crate::event::{EventBus, GovernanceEvent};
use crate::membership::MembershipRegistry;
use crate::params::GovernanceParams;
use crate::proposal::{Proposal, ProposalDraft, ProposalState, VoteChoice, VoteReceipt};
use scholar_types::{Address, ProposalId, Tick, TickSource};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// Read projection of the most recently committed state.
pub struct CommittedView {
    proposals: HashMap<ProposalId, Arc<Proposal>>,
    receipts: HashMap<(ProposalId, Address), VoteReceipt>,
    members: MembershipRegistry,
    proposal_count: u64,
}

impl CommittedView {
    fn capture(engine: &GovernanceEngine) -> Self {
        let state = engine.state();
        Self {
            proposals: state
                .proposals()
                .map(|p| (p.id, Arc::new(p.clone())))
                .collect(),
            receipts: state.receipts.clone(),
            members: state.registry().clone(),
            proposal_count: state.proposal_count(),
        }
    }

    /// Copy over whatever `event` changed in `engine`.
    fn absorb(&mut self, engine: &GovernanceEngine, event: &GovernanceEvent) {
        let state = engine.state();
        if let Some(id) = event.proposal() {
            if let Some(proposal) = state.proposal(id) {
                self.proposals.insert(id, Arc::new(proposal.clone()));
            }
            self.proposal_count = state.proposal_count();
        }
        if let GovernanceEvent::VoteCast { id, voter, .. } = event {
            if let Some(receipt) = state.receipt(*id, voter) {
                self.receipts.insert((*id, *voter), *receipt);
            }
        }
        if let Some(member) = event.member() {
            self.members.mirror_member(state.registry(), &member);
        }
    }
}

pub struct GovernanceLedger {
    writer: Mutex<GovernanceEngine>,
    view: RwLock<CommittedView>,
    params: GovernanceParams,
    ticks: Arc<dyn TickSource>,
    bus: EventBus,
}

impl GovernanceLedger {
    pub fn new(engine: GovernanceEngine, ticks: Arc<dyn TickSource>) -> Self {
        let view = CommittedView::capture(&engine);
        let params = *engine.params();
        Self {
            writer: Mutex::new(engine),
            view: RwLock::new(view),
            params,
            ticks,
            bus: EventBus::new(),
        }
    }

    /// Register a listener for notifications committed from now on.
    ///
    /// Listeners run on the committing thread while the writer lock is
    /// held. A listener must not call back into this ledger's mutating
    /// methods or [`Self::with_engine`]: the lock is not re-entrant and
    /// the call deadlocks. Read queries are fine. Hand events off to a
    /// channel if follow-up writes are needed.
    pub fn subscribe(&mut self, listener: Box<dyn Fn(&GovernanceEvent) + Send + Sync>) {
        self.bus.subscribe(listener);
    }

    /// Current tick according to the injected source.
    pub fn now(&self) -> Tick {
        self.ticks.current()
    }

    // ── Mutations ───────────────────────────────────────────────────────

    pub fn register_voter(&self, caller: &Address, voter: Address) -> Result<(), GovernanceError> {
        self.commit("register_voter", |engine, _| engine.register_voter(caller, voter))
    }

    pub fn remove_voter(&self, caller: &Address, voter: Address) -> Result<(), GovernanceError> {
        self.commit("remove_voter", |engine, _| engine.remove_voter(caller, voter))
    }

    pub fn grant(
        &self,
        caller: &Address,
        holder: Address,
        capability: Capability,
    ) -> Result<(), GovernanceError> {
        self.commit("grant", |engine, _| engine.grant(caller, holder, capability))
    }

    pub fn revoke(
        &self,
        caller: &Address,
        holder: Address,
        capability: Capability,
    ) -> Result<(), GovernanceError> {
        self.commit("revoke", |engine, _| engine.revoke(caller, holder, capability))
    }

    pub fn create_proposal(
        &self,
        caller: &Address,
        draft: ProposalDraft,
    ) -> Result<ProposalId, GovernanceError> {
        self.commit("create_proposal", |engine, now| {
            engine.create_proposal(caller, draft, now)
        })
    }

    pub fn cast_vote(
        &self,
        caller: &Address,
        id: ProposalId,
        choice: VoteChoice,
    ) -> Result<(), GovernanceError> {
        self.commit("cast_vote", |engine, now| engine.cast_vote(caller, id, choice, now))
    }

    pub fn finalize(&self, id: ProposalId) -> Result<ProposalState, GovernanceError> {
        self.commit("finalize", |engine, now| engine.finalize(id, now))
    }

    pub fn execute(&self, caller: &Address, id: ProposalId) -> Result<(), GovernanceError> {
        self.commit("execute", |engine, _| engine.execute(caller, id))
    }

    pub fn cancel(&self, caller: &Address, id: ProposalId) -> Result<(), GovernanceError> {
        self.commit("cancel", |engine, _| engine.cancel(caller, id))
    }

    // ── Queries (committed view) ────────────────────────────────────────

    pub fn get_proposal(&self, id: ProposalId) -> Result<Arc<Proposal>, GovernanceError> {
        self.read_view(|view| view.proposals.get(&id).cloned())
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    pub fn get_proposal_state(&self, id: ProposalId) -> Result<ProposalState, GovernanceError> {
        self.get_proposal(id).map(|p| p.state)
    }

    pub fn get_receipt(&self, id: ProposalId, voter: &Address) -> Option<VoteReceipt> {
        self.read_view(|view| view.receipts.get(&(id, *voter)).copied())
    }

    pub fn has_voted(&self, id: ProposalId, voter: &Address) -> bool {
        self.get_receipt(id, voter).is_some()
    }

    pub fn is_voting_active(&self, id: ProposalId) -> Result<bool, GovernanceError> {
        let now = self.now();
        self.get_proposal(id).map(|p| p.accepts_votes_at(now))
    }

    pub fn proposal_count(&self) -> u64 {
        self.read_view(|view| view.proposal_count)
    }

    pub fn voter_count(&self) -> u64 {
        self.read_view(|view| view.members.voter_count())
    }

    /// Registry membership as of the last commit. Policy-derived
    /// capabilities (e.g. certificate holders) are not reflected here.
    pub fn holds(&self, who: &Address, capability: Capability) -> bool {
        self.read_view(|view| view.members.has(who, capability))
    }

    pub fn quorum_required(&self) -> u64 {
        self.params.quorum_required(self.voter_count())
    }

    /// Run `f` against the engine under the writer lock. Mainly for
    /// snapshotting; mutations should go through the typed methods.
    pub fn with_engine<T>(&self, f: impl FnOnce(&GovernanceEngine) -> T) -> T {
        let engine = self.writer.lock().unwrap();
        f(&*engine)
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn commit<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut GovernanceEngine, Tick) -> Result<T, GovernanceError>,
    ) -> Result<T, GovernanceError> {
        let mut engine = self.writer.lock().unwrap();
        let now = self.ticks.current();
        let seen = engine.events().len();

        let value = f(&mut *engine, now).map_err(|e| {
            tracing::debug!(op, %now, kind = ?e.kind(), error = %e, "call rejected");
            e
        })?;

        let committed = &engine.events()[seen..];
        {
            let mut view = self.view.write().unwrap();
            for event in committed {
                view.absorb(&*engine, event);
            }
        }
        for event in committed {
            self.bus.emit(event);
        }
        Ok(value)
    }

    fn read_view<T>(&self, f: impl FnOnce(&CommittedView) -> T) -> T {
        let view = self.view.read().unwrap();
        f(&view)
    }
}
