//! Building backup records from the local filesystem and remote storage.

pub mod local;
pub mod remote;

pub use local::collect_local;
pub use remote::collect_remote;
