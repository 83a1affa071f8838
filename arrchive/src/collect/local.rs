//! Discovery of backup archives in a source's local backup directory.

use std::path::Path;

use tracing::{debug, error, info, trace, warn};
use walkdir::WalkDir;

use crate::backup::{backup_term, Backup, Catalog, Source, ARCHIVE_EXTENSION};
use crate::utils::format::thousands;

/// Collect the local backups of `source` under `directory` that are not yet in `remote`.
///
/// The directory is searched recursively for `*.zip` files. A missing or
/// non-directory path is logged and yields no backups. When `retain_limit`
/// is set and more candidates than the limit remain, the `retain_limit`
/// oldest are discarded.
pub fn collect_local(
    source: Source,
    directory: &Path,
    remote: &Catalog,
    retain_limit: Option<usize>,
) -> Vec<Backup> {
    let mut backups = Vec::new();

    if directory.is_dir() {
        let walker = WalkDir::new(directory)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    warn!("Cannot access {:?}: {}", err.path(), err);
                    continue;
                }
            };

            let Some(file_name) = entry.file_name().to_str() else {
                debug!("Skipped {}, file name is not valid UTF-8", entry.path().display());
                continue;
            };
            if !file_name.ends_with(ARCHIVE_EXTENSION) {
                continue;
            }

            trace!("Found {}", entry.path().display());

            if entry.file_type().is_dir() {
                debug!("Skipped {} for {}, is a directory", file_name, source);
                continue;
            }

            let local_path = std::fs::canonicalize(entry.path())
                .unwrap_or_else(|_| entry.path().to_path_buf());

            let Some(backup) = Backup::create(source, file_name, Some(local_path), None, None)
            else {
                debug!("Skipping {}, backup object is null", entry.path().display());
                continue;
            };

            if remote.contains(source, &backup.file_name) {
                debug!("Skipping {}, backup already exists in Google Drive", backup.file_name);
                continue;
            }

            backups.push(backup);
        }
    } else {
        error!("{} is not a valid local {} backup path", directory.display(), source);
    }

    if let Some(limit) = retain_limit {
        let count = backups.len();
        if count > limit {
            // Oldest first, so the slice drops the oldest archives.
            backups.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
            backups.drain(..limit);

            debug!(
                "Discarded {} {} {} due to retention limit",
                thousands(limit),
                source,
                backup_term(limit)
            );
        }
    }

    info!(
        "Collected {} local {} {}",
        thousands(backups.len()),
        source,
        backup_term(backups.len())
    );
    trace!(?backups, "Local backups");

    backups
}
