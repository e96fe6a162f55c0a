//! Membership-gated governance engine.
//!
//! Proposals move through a fixed lifecycle on a strictly serialized ledger:
//! a proposer opens a proposal with a timed voting window, registered voters
//! cast one unit-weight ballot each, anyone finalizes once the window closes
//! (quorum by floor division, strict for/against majority), and a validator
//! executes a succeeded proposal exactly once. Authors and admins may cancel
//! before closure.
//!
//! - [`GovernanceEngine`] is the single-threaded state machine over an
//!   explicitly owned [`GovernanceState`].
//! - [`GovernanceLedger`] serialises concurrent callers onto one engine and
//!   serves reads from the last committed view.
//! - [`CapabilityPolicy`] decides who may do what; swap it to change the
//!   eligibility rules without touching lifecycle logic.

pub mod capability;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod ledger;
pub mod lifecycle;
pub mod membership;
pub mod params;
pub mod proposal;
pub mod state;
pub mod voting;

pub use capability::{
    Capability, CapabilityPolicy, CertificateLevels, CertifiedVoterPolicy, RegistryPolicy,
};
pub use config::GovernanceConfig;
pub use engine::GovernanceEngine;
pub use error::{ErrorKind, GovernanceError};
pub use event::{EventBus, GovernanceEvent};
pub use ledger::{CommittedView, GovernanceLedger};
pub use membership::MembershipRegistry;
pub use params::GovernanceParams;
pub use proposal::{
    Proposal, ProposalDraft, ProposalKind, ProposalState, Tally, VoteChoice, VoteReceipt,
};
pub use state::GovernanceState;
pub use voting::VOTE_WEIGHT;
