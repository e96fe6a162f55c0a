//! Shared utilities for the scholar governance crates.

pub mod logging;

pub use logging::{init_logging, LogFormat, UnknownLogFormat};
