//! The explicitly owned governance state object.
//!
//! Everything the engine remembers lives here and nowhere else: the
//! membership registry, proposals, vote receipts, the identifier sequence
//! and the notification log. It is created once at system initialisation,
//! mutated only through [`crate::GovernanceEngine`], and never torn down.
//! Snapshots round-trip through `bincode`.

use crate::error::GovernanceError;
use crate::event::GovernanceEvent;
use crate::membership::MembershipRegistry;
use crate::proposal::{Proposal, VoteReceipt};
use scholar_types::{Address, ProposalId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GovernanceState {
    pub(crate) registry: MembershipRegistry,
    pub(crate) proposals: BTreeMap<ProposalId, Proposal>,
    pub(crate) receipts: HashMap<(ProposalId, Address), VoteReceipt>,
    pub(crate) next_id: ProposalId,
    pub(crate) events: Vec<GovernanceEvent>,
}

impl GovernanceState {
    pub fn new(admin: Address) -> Result<Self, GovernanceError> {
        Ok(Self {
            registry: MembershipRegistry::with_admin(admin)?,
            proposals: BTreeMap::new(),
            receipts: HashMap::new(),
            next_id: ProposalId::FIRST,
            events: Vec::new(),
        })
    }

    pub fn registry(&self) -> &MembershipRegistry {
        &self.registry
    }

    pub fn proposal(&self, id: ProposalId) -> Option<&Proposal> {
        self.proposals.get(&id)
    }

    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.values()
    }

    pub fn receipt(&self, id: ProposalId, voter: &Address) -> Option<&VoteReceipt> {
        self.receipts.get(&(id, *voter))
    }

    /// Number of proposals ever created.
    pub fn proposal_count(&self) -> u64 {
        self.next_id
            .get()
            .checked_sub(ProposalId::FIRST.get())
            .unwrap_or_default()
    }

    /// The notification log, oldest first.
    pub fn events(&self) -> &[GovernanceEvent] {
        &self.events
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, GovernanceError> {
        bincode::serialize(self).map_err(|e| GovernanceError::Snapshot(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GovernanceError> {
        let state: Self =
            bincode::deserialize(bytes).map_err(|e| GovernanceError::Snapshot(e.to_string()))?;
        if state.next_id < ProposalId::FIRST {
            return Err(GovernanceError::Snapshot(format!(
                "next id {} precedes the first identifier",
                state.next_id
            )));
        }
        if state.proposal_count() != state.proposals.len() as u64 {
            return Err(GovernanceError::Snapshot(format!(
                "next id {} does not follow {} stored proposals",
                state.next_id,
                state.proposals.len()
            )));
        }
        state
            .registry
            .check_invariants()
            .map_err(GovernanceError::Snapshot)?;
        Ok(state)
    }
}
