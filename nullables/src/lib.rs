//! Nullable infrastructure for deterministic testing.
//!
//! Everything the governance engine consumes from outside (the ledger tick
//! counter, the certificate registry) is abstracted behind a trait. This
//! crate provides implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: hand these to the engine or ledger in place of real collaborators.

pub mod certificates;
pub mod ticker;

pub use certificates::NullCertificates;
pub use ticker::NullTicker;
