//! JSON replay scripts.
//!
//! A script is a JSON array of steps, each tagged by `op`:
//!
//! ```json
//! [
//!   { "op": "register_voter", "caller": "0x…01", "voter": "0x…02" },
//!   { "op": "create", "caller": "0x…01", "kind": "course_approval",
//!     "title": "Intro", "description": "Approve intro" },
//!   { "op": "vote", "caller": "0x…02", "id": 1, "choice": 1 },
//!   { "op": "advance", "ticks": 50400 },
//!   { "op": "finalize", "id": 1 }
//! ]
//! ```
//!
//! Ticks start at zero and only move on `advance`.

use scholar_governance::{
    Capability, GovernanceError, GovernanceLedger, GovernanceState, ProposalDraft, ProposalKind,
    VoteChoice,
};
use scholar_nullables::NullTicker;
use scholar_types::{Address, ProposalId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    Advance {
        ticks: u64,
    },
    RegisterVoter {
        caller: Address,
        voter: Address,
    },
    RemoveVoter {
        caller: Address,
        voter: Address,
    },
    Grant {
        caller: Address,
        holder: Address,
        capability: Capability,
    },
    Revoke {
        caller: Address,
        holder: Address,
        capability: Capability,
    },
    Create {
        caller: Address,
        kind: ProposalKind,
        title: String,
        description: String,
        #[serde(default)]
        content_ref: String,
    },
    /// `choice` uses the wire encoding: 0 against, 1 for, 2 abstain.
    Vote {
        caller: Address,
        id: ProposalId,
        choice: u8,
    },
    Finalize {
        id: ProposalId,
    },
    Execute {
        caller: Address,
        id: ProposalId,
    },
    Cancel {
        caller: Address,
        id: ProposalId,
    },
}

impl ScriptStep {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Advance { .. } => "advance",
            Self::RegisterVoter { .. } => "register_voter",
            Self::RemoveVoter { .. } => "remove_voter",
            Self::Grant { .. } => "grant",
            Self::Revoke { .. } => "revoke",
            Self::Create { .. } => "create",
            Self::Vote { .. } => "vote",
            Self::Finalize { .. } => "finalize",
            Self::Execute { .. } => "execute",
            Self::Cancel { .. } => "cancel",
        }
    }
}

/// A step the ledger refused.
#[derive(Clone, Debug, Serialize)]
pub struct Rejection {
    pub step: usize,
    pub op: &'static str,
    pub kind: String,
    pub error: String,
}

#[derive(Debug, Default, Serialize)]
pub struct ReplayReport {
    pub applied: usize,
    pub rejected: Vec<Rejection>,
}

/// Apply `steps` in order. Rejected steps are recorded and skipped; they
/// never abort the replay.
pub fn replay(
    ledger: &GovernanceLedger,
    ticker: &NullTicker,
    steps: &[ScriptStep],
) -> ReplayReport {
    let mut report = ReplayReport::default();
    for (index, step) in steps.iter().enumerate() {
        match apply(ledger, ticker, step) {
            Ok(()) => report.applied += 1,
            Err(e) => {
                tracing::warn!(step = index, op = step.name(), error = %e, "step rejected");
                report.rejected.push(Rejection {
                    step: index,
                    op: step.name(),
                    kind: format!("{:?}", e.kind()),
                    error: e.to_string(),
                });
            }
        }
    }
    report
}

fn apply(
    ledger: &GovernanceLedger,
    ticker: &NullTicker,
    step: &ScriptStep,
) -> Result<(), GovernanceError> {
    match step.clone() {
        ScriptStep::Advance { ticks } => {
            ticker.advance(ticks);
            Ok(())
        }
        ScriptStep::RegisterVoter { caller, voter } => ledger.register_voter(&caller, voter),
        ScriptStep::RemoveVoter { caller, voter } => ledger.remove_voter(&caller, voter),
        ScriptStep::Grant {
            caller,
            holder,
            capability,
        } => ledger.grant(&caller, holder, capability),
        ScriptStep::Revoke {
            caller,
            holder,
            capability,
        } => ledger.revoke(&caller, holder, capability),
        ScriptStep::Create {
            caller,
            kind,
            title,
            description,
            content_ref,
        } => ledger
            .create_proposal(&caller, ProposalDraft::new(kind, title, description, content_ref))
            .map(|_| ()),
        ScriptStep::Vote { caller, id, choice } => {
            let choice = VoteChoice::try_from(choice)?;
            ledger.cast_vote(&caller, id, choice)
        }
        ScriptStep::Finalize { id } => ledger.finalize(id).map(|_| ()),
        ScriptStep::Execute { caller, id } => ledger.execute(&caller, id),
        ScriptStep::Cancel { caller, id } => ledger.cancel(&caller, id),
    }
}

/// Capture the ledger's state for `--snapshot-out`.
pub fn snapshot(ledger: &GovernanceLedger) -> Result<Vec<u8>, GovernanceError> {
    ledger.with_engine(|engine| engine.state().to_bytes())
}

/// Decode a snapshot written by [`snapshot`].
pub fn restore(bytes: &[u8]) -> Result<GovernanceState, GovernanceError> {
    GovernanceState::from_bytes(bytes)
}
