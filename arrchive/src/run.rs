//! One full synchronization run.

use tracing::info;

use crate::backup::Catalog;
use crate::collect::{collect_local, collect_remote};
use crate::config::Config;
use crate::drive::StorageClient;
use crate::notify::Notifier;
use crate::reconcile::{delete_pass, upload_pass, LocalBackups, RunSummary};

async fn remote_catalog(storage: &dyn StorageClient, folder_id: Option<&str>) -> Catalog {
    match folder_id {
        Some(folder_id) => collect_remote(storage, folder_id).await,
        None => Catalog::new(),
    }
}

/// Collect, upload, then enforce retention, as enabled by `config`.
///
/// - local collection runs for each source with a configured backup path
/// - uploads need a remote folder id
/// - deletions need a retention limit and run against a fresh listing
pub async fn run(
    config: &Config,
    storage: &dyn StorageClient,
    notifier: Option<&Notifier>,
) -> RunSummary {
    let folder_id = config.drive.folder_id.as_deref();
    let mut remote = remote_catalog(storage, folder_id).await;

    let mut local = LocalBackups::new();
    for (&source, path) in &config.backup_paths {
        local.insert(source, collect_local(source, path, &remote, config.retain_limit));
    }

    let mut summary = RunSummary::default();

    if let Some(folder_id) = folder_id {
        summary.uploaded = upload_pass(
            storage,
            &mut local,
            &remote,
            config.retain_limit,
            folder_id,
            notifier,
        )
        .await;
    }

    if let Some(limit) = config.retain_limit {
        // Pick up what the upload pass just added.
        remote = remote_catalog(storage, folder_id).await;
        summary.deleted = delete_pass(storage, &mut remote, limit, notifier).await;
    }

    info!("{}", summary);

    summary
}
