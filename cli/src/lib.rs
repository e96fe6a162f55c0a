//! Scripted replays against a governance ledger.

pub mod script;

pub use script::{replay, ReplayReport, ScriptStep};
