//! Vertcut Common Utilities
//!
//! Shared infrastructure for all vertcut crates:
//! - Error taxonomy and result alias
//! - Tracing/logging initialization
//! - Application configuration loading

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
