//! Membership registry: which addresses hold which capability.
//!
//! Three independent role sets (voter, proposer, validator) plus the admin
//! set, and a running voter count that always equals the size of the voter
//! set and never drops to zero once the registry exists.
//!
//! The registry enforces its own invariants only. Deciding *who may call*
//! a mutation is the engine's job (see [`crate::CapabilityPolicy`]).

use crate::capability::Capability;
use crate::error::GovernanceError;
use scholar_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MembershipRegistry {
    admins: BTreeSet<Address>,
    voters: BTreeSet<Address>,
    proposers: BTreeSet<Address>,
    validators: BTreeSet<Address>,
    voter_count: u64,
}

impl MembershipRegistry {
    /// Bootstrap a registry whose only member is `admin`, holding every
    /// capability. The voter count starts at one.
    pub fn with_admin(admin: Address) -> Result<Self, GovernanceError> {
        if admin.is_zero() {
            return Err(GovernanceError::ZeroAddress);
        }
        let one = BTreeSet::from([admin]);
        Ok(Self {
            admins: one.clone(),
            voters: one.clone(),
            proposers: one.clone(),
            validators: one,
            voter_count: 1,
        })
    }

    pub fn has(&self, who: &Address, capability: Capability) -> bool {
        self.set(capability).contains(who)
    }

    pub fn voter_count(&self) -> u64 {
        self.voter_count
    }

    /// Holders of `capability`, in address order.
    pub fn holders(&self, capability: Capability) -> Vec<Address> {
        self.set(capability).iter().copied().collect()
    }

    pub fn register_voter(&mut self, who: Address) -> Result<(), GovernanceError> {
        if who.is_zero() {
            return Err(GovernanceError::ZeroAddress);
        }
        if self.voters.contains(&who) {
            return Err(GovernanceError::AlreadyRegistered {
                who,
                capability: Capability::Voter,
            });
        }
        self.voters.insert(who);
        self.voter_count += 1;
        debug_assert_eq!(self.voter_count, self.voters.len() as u64);
        Ok(())
    }

    pub fn remove_voter(&mut self, who: Address) -> Result<(), GovernanceError> {
        if !self.voters.contains(&who) {
            return Err(GovernanceError::NotRegistered {
                who,
                capability: Capability::Voter,
            });
        }
        if self.voter_count <= 1 {
            return Err(GovernanceError::LastVoter);
        }
        self.voters.remove(&who);
        self.voter_count -= 1;
        debug_assert_eq!(self.voter_count, self.voters.len() as u64);
        Ok(())
    }

    /// Grant any capability. Voter grants go through [`Self::register_voter`].
    pub fn grant(&mut self, who: Address, capability: Capability) -> Result<(), GovernanceError> {
        if capability == Capability::Voter {
            return self.register_voter(who);
        }
        if who.is_zero() {
            return Err(GovernanceError::ZeroAddress);
        }
        if !self.set_mut(capability).insert(who) {
            return Err(GovernanceError::AlreadyRegistered { who, capability });
        }
        Ok(())
    }

    /// Revoke any capability. Voter revocations go through
    /// [`Self::remove_voter`]; the last admin cannot be revoked.
    pub fn revoke(&mut self, who: Address, capability: Capability) -> Result<(), GovernanceError> {
        if capability == Capability::Voter {
            return self.remove_voter(who);
        }
        if !self.has(&who, capability) {
            return Err(GovernanceError::NotRegistered { who, capability });
        }
        if capability == Capability::Admin && self.admins.len() == 1 {
            return Err(GovernanceError::LastAdmin);
        }
        self.set_mut(capability).remove(&who);
        Ok(())
    }

    /// Check what every mutation preserves: the voter count matches the
    /// voter set, at least one voter and one admin exist, and the zero
    /// address holds nothing. Used when loading untrusted state.
    pub(crate) fn check_invariants(&self) -> Result<(), String> {
        if self.voter_count != self.voters.len() as u64 {
            return Err(format!(
                "voter count {} does not match {} registered voters",
                self.voter_count,
                self.voters.len()
            ));
        }
        if self.voters.is_empty() {
            return Err("registry has no voters".into());
        }
        if self.admins.is_empty() {
            return Err("registry has no admins".into());
        }
        if Capability::ALL
            .iter()
            .any(|c| self.set(*c).contains(&Address::ZERO))
        {
            return Err("zero address holds a capability".into());
        }
        Ok(())
    }

    /// Copy every capability `who` holds in `source` into `self`, and the
    /// voter count along with it.
    pub(crate) fn mirror_member(&mut self, source: &MembershipRegistry, who: &Address) {
        for capability in Capability::ALL {
            if source.has(who, capability) {
                self.set_mut(capability).insert(*who);
            } else {
                self.set_mut(capability).remove(who);
            }
        }
        self.voter_count = source.voter_count;
    }

    fn set(&self, capability: Capability) -> &BTreeSet<Address> {
        match capability {
            Capability::Admin => &self.admins,
            Capability::Voter => &self.voters,
            Capability::Proposer => &self.proposers,
            Capability::Validator => &self.validators,
        }
    }

    fn set_mut(&mut self, capability: Capability) -> &mut BTreeSet<Address> {
        match capability {
            Capability::Admin => &mut self.admins,
            Capability::Voter => &mut self.voters,
            Capability::Proposer => &mut self.proposers,
            Capability::Validator => &mut self.validators,
        }
    }
}
