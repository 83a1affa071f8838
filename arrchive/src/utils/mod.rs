//! Utility modules for arrchive.

pub mod errors;
pub mod format;
pub mod logger;

pub use errors::{ArrchiveError, Result};
