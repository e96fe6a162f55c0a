//! Fundamental types for the scholar governance engine.
//!
//! This crate defines the primitives shared across every other crate in the
//! workspace: account addresses, ledger ticks, and proposal identifiers.

pub mod address;
pub mod error;
pub mod id;
pub mod time;

pub use address::Address;
pub use error::TypesError;
pub use id::ProposalId;
pub use time::{Tick, TickSource};
