//! Upload and retention passes over local and remote backups.
//!
//! Sources are processed one after another. Every upload or delete is a
//! single remote call; a failure is logged and the pass moves on to the next
//! backup without retrying or undoing earlier work.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, error, info, trace, warn};

use crate::backup::{backup_term, sort_backups, Action, Backup, Catalog, Source};
use crate::drive::StorageClient;
use crate::notify::Notifier;
use crate::utils::format::thousands;

/// Local backups awaiting upload, per source
pub type LocalBackups = BTreeMap<Source, Vec<Backup>>;

/// Counts reported at the end of a run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub uploaded: usize,
    pub deleted: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.uploaded + self.deleted
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed {} {} ({} uploaded / {} deleted)",
            thousands(self.total()),
            backup_term(self.total()),
            thousands(self.uploaded),
            thousands(self.deleted)
        )
    }
}

/// Upload local backups that are missing remotely, newest first.
///
/// With a retention limit, at most `retain_limit` backups are uploaded per
/// source, and once any remote backup of a source is at least as new as a
/// candidate, no further backups of that source are uploaded.
///
/// Returns the number of successful uploads.
pub async fn upload_pass(
    storage: &dyn StorageClient,
    local: &mut LocalBackups,
    remote: &Catalog,
    retain_limit: Option<usize>,
    folder_id: &str,
    notifier: Option<&Notifier>,
) -> usize {
    let mut uploaded_total = 0;

    for (&source, backups) in local.iter_mut() {
        sort_backups(backups);

        let remote_backups = remote.get(source);
        let mut uploaded_source = 0;
        let mut remote_is_newer = false;

        for backup in backups.iter_mut() {
            if retain_limit.is_some_and(|limit| uploaded_source >= limit) {
                debug!(
                    "Skipped {} backup {}, retention limit reached",
                    source, backup.timestamp_formatted
                );
                continue;
            }

            let Some(local_path) = backup.local_path.clone() else {
                debug!(
                    "Skipped {} backup {}, does not exist locally",
                    source, backup.timestamp_formatted
                );
                continue;
            };

            if backup.remote_url.is_some() || remote.contains(source, &backup.file_name) {
                debug!(
                    "Skipped {} backup {}, already exists in Google Drive",
                    source, backup.timestamp_formatted
                );
                continue;
            }

            // Sticky for the rest of this source.
            if retain_limit.is_some()
                && remote_backups.iter().any(|r| backup.timestamp <= r.timestamp)
            {
                remote_is_newer = true;
            }

            if remote_is_newer {
                debug!(
                    "Skipped {} backup {}, retention limit reached and a newer backup exists in Google Drive",
                    source, backup.timestamp_formatted
                );
                continue;
            }

            match storage.upload(&local_path, &backup.file_name, folder_id).await {
                Ok(file) => {
                    backup.remote_url = file.alternate_link;
                    backup.remote_id = Some(file.id);
                    uploaded_total += 1;
                    uploaded_source += 1;
                }
                Err(e) => {
                    error!(
                        "Failed to upload {} backup {} to Google Drive: {}",
                        source, backup.timestamp_formatted, e
                    );
                    continue;
                }
            }

            info!(
                "Uploaded {} backup {} to Google Drive",
                source, backup.timestamp_formatted
            );
            debug!(remote_url = ?backup.remote_url, "Upload recorded");

            if let Some(notifier) = notifier {
                notifier.notify(backup, Action::Uploaded).await;
            }
        }
    }

    uploaded_total
}

/// Delete remote backups beyond the newest `retain_limit` of each source.
///
/// Returns the number of successful deletions.
pub async fn delete_pass(
    storage: &dyn StorageClient,
    remote: &mut Catalog,
    retain_limit: usize,
    notifier: Option<&Notifier>,
) -> usize {
    let mut deleted = 0;

    for source in Source::ALL {
        let backups = remote.get_mut(source);
        if backups.len() <= retain_limit {
            continue;
        }

        sort_backups(backups);

        for backup in &backups[retain_limit..] {
            let Some(remote_id) = backup.remote_id.as_deref() else {
                warn!(
                    "Attempted to delete Google Drive {} backup {}, but it has no remote id",
                    source, backup.timestamp_formatted
                );
                debug!(?backup, "Delete skipped");
                continue;
            };

            if let Err(e) = storage.delete(remote_id).await {
                error!(
                    "Failed to delete {} backup {} from Google Drive: {}",
                    source, backup.timestamp_formatted, e
                );
                continue;
            }

            deleted += 1;

            info!(
                "Deleted Google Drive {} backup {}",
                source, backup.timestamp_formatted
            );
            trace!(remote_url = ?backup.remote_url, "Delete recorded");

            if let Some(notifier) = notifier {
                notifier.notify(backup, Action::Deleted).await;
            }
        }
    }

    deleted
}
