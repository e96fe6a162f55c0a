//! Governance proposals, their lifecycle states, and vote receipts.

use crate::error::GovernanceError;
use scholar_types::{Address, ProposalId, Tick};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a proposal is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalKind {
    CourseApproval,
    ContentUpdate,
    QualityReview,
    LanguageAddition,
    GovernanceChange,
    ValidatorAddition,
    CurriculumUpdate,
}

impl ProposalKind {
    pub const ALL: [ProposalKind; 7] = [
        ProposalKind::CourseApproval,
        ProposalKind::ContentUpdate,
        ProposalKind::QualityReview,
        ProposalKind::LanguageAddition,
        ProposalKind::GovernanceChange,
        ProposalKind::ValidatorAddition,
        ProposalKind::CurriculumUpdate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::CourseApproval => "course_approval",
            Self::ContentUpdate => "content_update",
            Self::QualityReview => "quality_review",
            Self::LanguageAddition => "language_addition",
            Self::GovernanceChange => "governance_change",
            Self::ValidatorAddition => "validator_addition",
            Self::CurriculumUpdate => "curriculum_update",
        }
    }
}

impl fmt::Display for ProposalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for ProposalKind {
    type Error = GovernanceError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(raw as usize)
            .copied()
            .ok_or(GovernanceError::InvalidKind(raw))
    }
}

/// Lifecycle state of a proposal.
///
/// ```text
/// Active ──► Succeeded ──► Executed
///   │  └───► Defeated
///   └──────► Cancelled   (also from Pending)
/// ```
///
/// `Pending` is part of the state space but never entered: creation goes
/// straight to `Active`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalState {
    Pending,
    Active,
    Succeeded,
    Defeated,
    Executed,
    Cancelled,
}

impl ProposalState {
    /// Whether the lifecycle permits moving from `self` to `next`. Every
    /// lifecycle call in the engine is gated on this table.
    pub fn can_transition_to(&self, next: ProposalState) -> bool {
        use ProposalState::*;
        matches!(
            (self, next),
            (Active, Succeeded)
                | (Active, Defeated)
                | (Succeeded, Executed)
                | (Pending, Cancelled)
                | (Active, Cancelled)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Succeeded => "succeeded",
            Self::Defeated => "defeated",
            Self::Executed => "executed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A ballot choice. Discriminants match the wire encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteChoice {
    Against = 0,
    For = 1,
    Abstain = 2,
}

impl VoteChoice {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Against => "against",
            Self::For => "for",
            Self::Abstain => "abstain",
        }
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for VoteChoice {
    type Error = GovernanceError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::Against),
            1 => Ok(Self::For),
            2 => Ok(Self::Abstain),
            other => Err(GovernanceError::InvalidChoice(other)),
        }
    }
}

/// Running vote counters of a proposal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub for_votes: u64,
    pub against_votes: u64,
    pub abstain_votes: u64,
}

impl Tally {
    pub fn record(&mut self, choice: VoteChoice, weight: u64) {
        match choice {
            VoteChoice::For => self.for_votes += weight,
            VoteChoice::Against => self.against_votes += weight,
            VoteChoice::Abstain => self.abstain_votes += weight,
        }
    }

    /// Votes cast in any direction.
    pub fn total(&self) -> u64 {
        self.for_votes + self.against_votes + self.abstain_votes
    }
}

/// Everything the author supplies when creating a proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalDraft {
    pub kind: ProposalKind,
    pub title: String,
    pub description: String,
    /// Opaque reference to the proposal's content, stored verbatim.
    pub content_ref: String,
}

impl ProposalDraft {
    pub fn new(
        kind: ProposalKind,
        title: impl Into<String>,
        description: impl Into<String>,
        content_ref: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
            content_ref: content_ref.into(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), GovernanceError> {
        if self.title.is_empty() {
            return Err(GovernanceError::EmptyTitle);
        }
        if self.description.is_empty() {
            return Err(GovernanceError::EmptyDescription);
        }
        Ok(())
    }
}

/// A governance proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub author: Address,
    pub kind: ProposalKind,
    pub title: String,
    pub description: String,
    pub content_ref: String,
    /// First tick at which votes are accepted.
    pub start: Tick,
    /// First tick at which votes are no longer accepted.
    pub end: Tick,
    pub tally: Tally,
    pub state: ProposalState,
    pub executed: bool,
}

impl Proposal {
    /// Whether a ballot cast at `now` would be admitted by state and window.
    pub fn accepts_votes_at(&self, now: Tick) -> bool {
        self.state == ProposalState::Active && now.within(self.start, self.end)
    }

    /// The voting window has ended as of `now`.
    pub fn window_closed_at(&self, now: Tick) -> bool {
        now >= self.end
    }
}

/// Record of one voter's ballot on one proposal. Never altered once written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub choice: VoteChoice,
    /// Always 1; there is no weighting or delegation.
    pub weight: u64,
    pub cast_at: Tick,
}
