//! Notifications emitted by committed governance calls.

use crate::capability::Capability;
use crate::proposal::{ProposalKind, ProposalState, VoteChoice};
use scholar_types::{Address, ProposalId, Tick};
use serde::{Deserialize, Serialize};

/// An append-only notification. One is recorded for every committed
/// mutation; rejected calls record nothing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GovernanceEvent {
    ProposalCreated {
        id: ProposalId,
        proposer: Address,
        kind: ProposalKind,
        title: String,
        start: Tick,
        end: Tick,
    },
    VoteCast {
        id: ProposalId,
        voter: Address,
        choice: VoteChoice,
        weight: u64,
    },
    ProposalFinalized {
        id: ProposalId,
        state: ProposalState,
        for_votes: u64,
        against_votes: u64,
        abstain_votes: u64,
        quorum_required: u64,
    },
    ProposalExecuted {
        id: ProposalId,
    },
    ProposalCancelled {
        id: ProposalId,
    },
    VoterRegistered {
        voter: Address,
    },
    VoterRemoved {
        voter: Address,
    },
    CapabilityGranted {
        holder: Address,
        capability: Capability,
    },
    CapabilityRevoked {
        holder: Address,
        capability: Capability,
    },
}

impl GovernanceEvent {
    /// The proposal this event touched, if any.
    pub fn proposal(&self) -> Option<ProposalId> {
        match self {
            Self::ProposalCreated { id, .. }
            | Self::VoteCast { id, .. }
            | Self::ProposalFinalized { id, .. }
            | Self::ProposalExecuted { id }
            | Self::ProposalCancelled { id } => Some(*id),
            _ => None,
        }
    }

    /// The member whose capabilities this event changed, if any.
    pub fn member(&self) -> Option<Address> {
        match self {
            Self::VoterRegistered { voter } | Self::VoterRemoved { voter } => Some(*voter),
            Self::CapabilityGranted { holder, .. } | Self::CapabilityRevoked { holder, .. } => {
                Some(*holder)
            }
            _ => None,
        }
    }
}

/// Synchronous fan-out bus for governance events.
///
/// Listeners run inline on the committing thread, inside the ledger's write
/// section, so they observe events in commit order. They block every other
/// writer while they run and must not re-enter the ledger's mutating calls.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&GovernanceEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&GovernanceEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &GovernanceEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
