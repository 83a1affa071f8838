//! Configuration for a single arrchive run.
//!
//! Loaded once from the environment (optionally seeded from a dotenv file)
//! and passed explicitly to every component. Empty variables count as unset.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::backup::Source;
use crate::drive::ServiceAccount;
use crate::utils::errors::{ArrchiveError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Default log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Local backup directory per source; only configured sources are collected
    pub backup_paths: BTreeMap<Source, PathBuf>,

    /// Backups to keep per source; `None` disables retention entirely
    pub retain_limit: Option<usize>,

    pub drive: DriveConfig,

    /// Discord webhook for upload/delete notifications
    pub discord_webhook_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DriveConfig {
    /// Remote folder; without it nothing is listed or uploaded
    pub folder_id: Option<String>,

    /// Service account credentials, if all of them are present
    pub service_account: Option<ServiceAccount>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Variables from `env_file` (or `.env` in the working directory when
    /// `None`) are loaded first without overriding ones already set.
    pub fn from_env(env_file: Option<&Path>) -> Result<Self> {
        match env_file {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| {
                    ArrchiveError::Config(format!("cannot load {}: {}", path.display(), e))
                })?;
            }
            None => {
                let _ = dotenvy::dotenv();
            }
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backup_paths = Source::ALL
            .into_iter()
            .filter_map(|source| get(&source.env_key()).map(|path| (source, PathBuf::from(path))))
            .collect();

        let retain_limit = match get("BACKUP_RETAIN_LIMIT") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(0) => {
                    return Err(ArrchiveError::Config(
                        "BACKUP_RETAIN_LIMIT must be at least 1".to_string(),
                    ))
                }
                Ok(limit) => Some(limit),
                Err(e) => {
                    return Err(ArrchiveError::Config(format!(
                        "BACKUP_RETAIN_LIMIT {:?} is not a number: {}",
                        raw, e
                    )))
                }
            },
            None => None,
        };

        let service_account = match (
            get("GOOGLE_SERVICE_EMAIL"),
            get("GOOGLE_SERVICE_PRIVATE_KEY_ID"),
            get("GOOGLE_SERVICE_PRIVATE_KEY"),
        ) {
            (Some(client_email), Some(private_key_id), Some(private_key)) => {
                Some(ServiceAccount {
                    client_email,
                    private_key_id,
                    // Keys pasted into env files usually carry escaped newlines.
                    private_key: private_key.replace("\\n", "\n"),
                })
            }
            _ => None,
        };

        Ok(Config {
            log_level: get("LOG_LEVEL").unwrap_or_else(default_log_level),
            backup_paths,
            retain_limit,
            drive: DriveConfig {
                folder_id: get("GOOGLE_DRIVE_FOLDER_ID"),
                service_account,
            },
            discord_webhook_url: get("DISCORD_WEBHOOK_URL"),
        })
    }
}
