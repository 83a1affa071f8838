//! Backup identity: sources, records and the remote catalog.

pub mod catalog;
pub mod record;
pub mod source;

pub use catalog::Catalog;
pub use record::{backup_term, sort_backups, Backup, ARCHIVE_EXTENSION};
pub use source::{Action, Source};
