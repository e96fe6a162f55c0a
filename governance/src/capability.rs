//! Named capabilities and the policies that decide who holds them.
//!
//! The engine never inspects role sets directly when gating a call; it asks
//! a [`CapabilityPolicy`]. The default [`RegistryPolicy`] answers from the
//! [`MembershipRegistry`], and [`CertifiedVoterPolicy`] additionally admits
//! certificate holders as voters.

use crate::error::GovernanceError;
use crate::membership::MembershipRegistry;
use scholar_types::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A named permission checked before a mutating call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Admin,
    Voter,
    Proposer,
    Validator,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::Admin,
        Capability::Voter,
        Capability::Proposer,
        Capability::Validator,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Voter => "voter",
            Self::Proposer => "proposer",
            Self::Validator => "validator",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for Capability {
    type Error = GovernanceError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(raw as usize)
            .copied()
            .ok_or(GovernanceError::InvalidCapability(raw))
    }
}

/// Decides whether an address may exercise a capability.
pub trait CapabilityPolicy: Send + Sync {
    fn permits(&self, registry: &MembershipRegistry, who: &Address, capability: Capability)
        -> bool;
}

/// Answers straight from the membership registry.
#[derive(Clone, Copy, Debug, Default)]
pub struct RegistryPolicy;

impl CapabilityPolicy for RegistryPolicy {
    fn permits(
        &self,
        registry: &MembershipRegistry,
        who: &Address,
        capability: Capability,
    ) -> bool {
        registry.has(who, capability)
    }
}

/// Read-only view of the certificate-issuance collaborator.
pub trait CertificateLevels: Send + Sync {
    /// Achievement level certified for `holder`; `0` when it holds none.
    fn holder_level(&self, holder: &Address) -> u8;
}

impl<C: CertificateLevels + ?Sized> CertificateLevels for Arc<C> {
    fn holder_level(&self, holder: &Address) -> u8 {
        (**self).holder_level(holder)
    }
}

/// Admits registry voters plus any certificate holder at or above
/// `min_level` as a voter. Every other capability defers to the registry.
///
/// Quorum is still computed from the registry's voter count.
pub struct CertifiedVoterPolicy<C> {
    certificates: C,
    min_level: u8,
}

impl<C: CertificateLevels> CertifiedVoterPolicy<C> {
    pub fn new(certificates: C, min_level: u8) -> Self {
        Self {
            certificates,
            min_level,
        }
    }
}

impl<C: CertificateLevels> CapabilityPolicy for CertifiedVoterPolicy<C> {
    fn permits(
        &self,
        registry: &MembershipRegistry,
        who: &Address,
        capability: Capability,
    ) -> bool {
        if registry.has(who, capability) {
            return true;
        }
        capability == Capability::Voter
            && !who.is_zero()
            && self.min_level > 0
            && self.certificates.holder_level(who) >= self.min_level
    }
}
