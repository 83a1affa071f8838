//! Arrchive
//!
//! Syncs backup archives of *arr applications to a Google Drive folder,
//! keeps a bounded number per application, and reports each upload and
//! deletion to Discord.

pub mod backup;
pub mod collect;
pub mod config;
pub mod drive;
pub mod notify;
pub mod reconcile;
pub mod run;
pub mod shutdown;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use utils::errors::ArrchiveError;
pub type Result<T> = std::result::Result<T, ArrchiveError>;
