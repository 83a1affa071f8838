//! Discovery of backup archives in the remote folder.

use tracing::{debug, error, info, trace};

use crate::backup::{backup_term, Backup, Catalog, Source};
use crate::drive::StorageClient;
use crate::utils::format::thousands;

/// List `folder_id` and group every recognised backup by source.
///
/// A listing failure is logged and treated as an empty folder. Titles that
/// match no source prefix are ignored.
pub async fn collect_remote(storage: &dyn StorageClient, folder_id: &str) -> Catalog {
    let mut catalog = Catalog::new();

    let files = match storage.list(folder_id).await {
        Ok(files) => files,
        Err(e) => {
            error!("Failed to collect backups from Google Drive folder {}: {}", folder_id, e);
            Vec::new()
        }
    };

    trace!(?files, "Remote listing");

    for file in files {
        let Some(source) = Source::ALL.into_iter().find(|s| s.matches(&file.title)) else {
            continue;
        };

        match Backup::create(
            source,
            &file.title,
            None,
            file.alternate_link.clone(),
            Some(file.id.clone()),
        ) {
            Some(backup) => catalog.insert(backup),
            None => debug!("Skipping {:?}, backup object is null", file),
        }
    }

    info!(
        "Collected {} Google Drive {}",
        thousands(catalog.count()),
        backup_term(catalog.count())
    );

    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::{RemoteFile, UploadedFile};
    use crate::utils::errors::{ArrchiveError, Result};
    use async_trait::async_trait;
    use std::path::Path;

    struct Listing(Option<Vec<RemoteFile>>);

    #[async_trait]
    impl StorageClient for Listing {
        async fn list(&self, _folder_id: &str) -> Result<Vec<RemoteFile>> {
            self.0
                .clone()
                .ok_or_else(|| ArrchiveError::Storage("quota exceeded".into()))
        }

        async fn upload(
            &self,
            _path: &Path,
            _title: &str,
            _folder_id: &str,
        ) -> Result<UploadedFile> {
            unreachable!("listing only")
        }

        async fn delete(&self, _id: &str) -> Result<()> {
            unreachable!("listing only")
        }
    }

    fn file(id: &str, title: &str) -> RemoteFile {
        RemoteFile {
            id: id.to_string(),
            title: title.to_string(),
            alternate_link: Some(format!("https://drive.google.com/file/d/{}/view", id)),
        }
    }

    #[tokio::test]
    async fn test_groups_by_source() {
        let storage = Listing(Some(vec![
            file("1", "radarr_backup_v5.20.2.9777_2025.03.24_06.06.08.zip"),
            file("2", "Sonarr_backup_v4.0.14_2025.03.24_06.06.08.zip"),
            file("3", "profilarr_backup_2025_03_22_152542.zip"),
            file("4", "holiday-photos.zip"),
            file("5", "radarr_backup_broken.zip"),
        ]));

        let catalog = collect_remote(&storage, "folder").await;

        assert_eq!(catalog.count(), 3);
        assert_eq!(catalog.get(Source::Radarr).len(), 1);
        assert_eq!(catalog.get(Source::Sonarr).len(), 1);
        assert_eq!(catalog.get(Source::Profilarr).len(), 1);

        let radarr = &catalog.get(Source::Radarr)[0];
        assert_eq!(radarr.remote_id.as_deref(), Some("1"));
        assert!(radarr.remote_url.is_some());
        assert!(radarr.local_path.is_none());
    }

    #[tokio::test]
    async fn test_listing_failure_is_empty() {
        let catalog = collect_remote(&Listing(None), "folder").await;

        assert_eq!(catalog.count(), 0);
    }
}
