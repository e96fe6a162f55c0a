use crate::capability::Capability;
use crate::proposal::ProposalState;
use scholar_types::{Address, ProposalId, Tick, TypesError};
use thiserror::Error;

/// Coarse class of a [`GovernanceError`].
///
/// Callers branch on this rather than on individual variants when all they
/// need to know is whether to fix credentials, inputs, references or timing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller lacks a required capability.
    Authorization,
    /// Malformed input.
    Validation,
    /// A referenced proposal or member does not exist.
    NotFound,
    /// Not legal in the current lifecycle state or voting window.
    State,
    /// Would break a registry invariant.
    Invariant,
}

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("{who} lacks the {capability} capability")]
    MissingCapability { who: Address, capability: Capability },

    #[error("{who} is neither the author of proposal {id} nor an admin")]
    NotAuthorOrAdmin { who: Address, id: ProposalId },

    #[error("proposal title must not be empty")]
    EmptyTitle,

    #[error("proposal description must not be empty")]
    EmptyDescription,

    #[error("the zero address cannot hold capabilities")]
    ZeroAddress,

    #[error("vote choice {0} is not one of against(0), for(1), abstain(2)")]
    InvalidChoice(u8),

    #[error("proposal type {0} is out of range")]
    InvalidKind(u8),

    #[error("capability {0} is out of range")]
    InvalidCapability(u8),

    #[error(transparent)]
    InvalidAddress(#[from] TypesError),

    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("proposal {id} is {state}, not active")]
    NotActive { id: ProposalId, state: ProposalState },

    #[error("tick {now} is outside the voting window [{start}, {end}) of proposal {id}")]
    OutsideVotingWindow {
        id: ProposalId,
        now: Tick,
        start: Tick,
        end: Tick,
    },

    #[error("{voter} has already voted on proposal {id}")]
    AlreadyVoted { id: ProposalId, voter: Address },

    #[error("voting on proposal {id} stays open until {end}")]
    VotingNotClosed { id: ProposalId, end: Tick },

    #[error("proposal {id} is {state}, not succeeded")]
    NotSucceeded { id: ProposalId, state: ProposalState },

    #[error("proposal {0} has already been executed")]
    AlreadyExecuted(ProposalId),

    #[error("proposal {id} is {state} and can no longer be cancelled")]
    NotCancellable { id: ProposalId, state: ProposalState },

    #[error("{who} already holds the {capability} capability")]
    AlreadyRegistered { who: Address, capability: Capability },

    #[error("{who} does not hold the {capability} capability")]
    NotRegistered { who: Address, capability: Capability },

    #[error("cannot remove the last registered voter")]
    LastVoter,

    #[error("cannot revoke the last admin")]
    LastAdmin,

    #[error("config error: {0}")]
    Config(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl GovernanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCapability { .. } | Self::NotAuthorOrAdmin { .. } => {
                ErrorKind::Authorization
            }
            Self::EmptyTitle
            | Self::EmptyDescription
            | Self::ZeroAddress
            | Self::InvalidChoice(_)
            | Self::InvalidKind(_)
            | Self::InvalidCapability(_)
            | Self::InvalidAddress(_)
            | Self::Config(_)
            | Self::Snapshot(_) => ErrorKind::Validation,
            Self::ProposalNotFound(_) | Self::NotRegistered { .. } => ErrorKind::NotFound,
            Self::NotActive { .. }
            | Self::OutsideVotingWindow { .. }
            | Self::AlreadyVoted { .. }
            | Self::VotingNotClosed { .. }
            | Self::NotSucceeded { .. }
            | Self::AlreadyExecuted(_)
            | Self::NotCancellable { .. } => ErrorKind::State,
            Self::AlreadyRegistered { .. } | Self::LastVoter | Self::LastAdmin => {
                ErrorKind::Invariant
            }
        }
    }
}
