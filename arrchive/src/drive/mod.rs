//! Remote storage for backup archives.
//!
//! The reconciler only talks to [`StorageClient`]; [`client::GoogleDrive`]
//! is the production implementation.

pub mod auth;
pub mod client;

use std::path::Path;

use async_trait::async_trait;

use crate::Result;

pub use auth::{Authenticator, ServiceAccount};
pub use client::GoogleDrive;

/// A file listed from the remote backup folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub id: String,
    pub title: String,
    /// Browser link to the file, when the provider returns one
    pub alternate_link: Option<String>,
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub id: String,
    pub alternate_link: Option<String>,
}

/// Operations the reconciler needs from remote storage.
///
/// Each call is a single remote request from the caller's point of view: it
/// either takes effect completely or not at all.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// List every non-trashed file directly under `folder_id`
    async fn list(&self, folder_id: &str) -> Result<Vec<RemoteFile>>;

    /// Upload the file at `path` into `folder_id` under the name `title`
    async fn upload(&self, path: &Path, title: &str, folder_id: &str) -> Result<UploadedFile>;

    /// Permanently delete the file with this id
    async fn delete(&self, id: &str) -> Result<()>;
}
