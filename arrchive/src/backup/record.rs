//! Backup records parsed from archive filenames.
//!
//! Two naming schemes are understood:
//! - `<source>_backup_<version>_<YYYY.MM.DD_HH.MM.SS>.zip` (Bazarr, Prowlarr, Radarr, Sonarr)
//! - `backup_<YYYY_MM_DD_HHMMSS>.zip` (Profilarr, which omits its own name and version)
//!
//! Profilarr archives are renamed to `profilarr_backup_<...>.zip` so every
//! record in remote storage carries its source prefix.

use std::path::PathBuf;

use chrono::{Local, NaiveDateTime, TimeZone};
use tracing::{error, trace, warn};

use super::source::Source;
use crate::utils::errors::{ArrchiveError, Result};

/// Extension every backup archive must carry
pub const ARCHIVE_EXTENSION: &str = ".zip";

const VERSIONED_TIMESTAMP_FORMAT: &str = "%Y.%m.%d_%H.%M.%S";
const PROFILARR_TIMESTAMP_FORMAT: &str = "%Y_%m_%d_%H%M%S";
const HUMAN_TIMESTAMP_FORMAT: &str = "%A, %B %-d, %Y %I:%M %p";

/// A single backup archive, discovered locally, remotely, or both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    pub source: Source,

    /// Version of the producing application, when the filename encodes one
    pub source_version: Option<String>,

    /// Creation time parsed from the filename; the only ordering key
    pub timestamp: NaiveDateTime,

    /// `timestamp` rendered once for log lines and notifications
    pub timestamp_formatted: String,

    /// Canonical filename, as stored remotely
    pub file_name: String,

    /// Present iff the archive was discovered on the local filesystem
    pub local_path: Option<PathBuf>,

    /// Present iff the archive is confirmed to exist in remote storage
    pub remote_url: Option<String>,

    /// Remote file id, required to delete the archive
    pub remote_id: Option<String>,
}

impl Backup {
    /// Build a record from a filename, logging and returning `None` when the
    /// filename is not a valid backup for `source`.
    pub fn create(
        source: Source,
        file_name: &str,
        local_path: Option<PathBuf>,
        remote_url: Option<String>,
        remote_id: Option<String>,
    ) -> Option<Self> {
        if !file_name.ends_with(ARCHIVE_EXTENSION) {
            warn!("File {} is not a valid {} backup", file_name, source);
            return None;
        }

        match Self::parse(source, file_name) {
            Ok((source_version, timestamp, canonical)) => {
                let backup = Self {
                    source,
                    source_version,
                    timestamp,
                    timestamp_formatted: timestamp.format(HUMAN_TIMESTAMP_FORMAT).to_string(),
                    file_name: canonical,
                    local_path,
                    remote_url,
                    remote_id,
                };
                trace!(?backup, "Created backup record");
                Some(backup)
            }
            Err(e) => {
                error!(
                    "Failed to create {} backup object from file {}: {}",
                    source, file_name, e
                );
                None
            }
        }
    }

    /// Split a filename into `(version, timestamp, canonical filename)`.
    fn parse(source: Source, file_name: &str) -> Result<(Option<String>, NaiveDateTime, String)> {
        let stem = file_name.strip_suffix(ARCHIVE_EXTENSION).ok_or_else(|| {
            ArrchiveError::InvalidBackup(format!("{} is not a zip archive", file_name))
        })?;

        match source {
            Source::Profilarr => {
                // Remote copies already carry the `profilarr_` prefix we add below.
                let own_prefix = format!("{}_", source.name().to_lowercase());
                let raw = match stem.get(..own_prefix.len()) {
                    Some(head) if head.eq_ignore_ascii_case(&own_prefix) => {
                        &file_name[own_prefix.len()..]
                    }
                    _ => file_name,
                };

                let timestamp = raw
                    .strip_prefix("backup_")
                    .and_then(|rest| rest.strip_suffix(ARCHIVE_EXTENSION))
                    .ok_or_else(|| {
                        ArrchiveError::InvalidBackup(format!(
                            "{} does not start with backup_",
                            file_name
                        ))
                    })?;
                let timestamp =
                    NaiveDateTime::parse_from_str(timestamp, PROFILARR_TIMESTAMP_FORMAT)
                        .map_err(|e| bad_timestamp(timestamp, e))?;

                Ok((None, timestamp, format!("{}{}", own_prefix, raw)))
            }
            _ => {
                let pieces: Vec<&str> = file_name.splitn(4, '_').collect();
                if pieces.len() != 4 {
                    return Err(ArrchiveError::InvalidBackup(format!(
                        "expected 4 underscore-delimited segments, found {}",
                        pieces.len()
                    )));
                }

                if !source.matches(file_name) {
                    return Err(ArrchiveError::InvalidBackup(format!(
                        "{} does not start with {}",
                        file_name,
                        source.prefix()
                    )));
                }

                let timestamp = pieces[3]
                    .rsplit_once('.')
                    .map(|(head, _)| head)
                    .unwrap_or(pieces[3]);
                let timestamp =
                    NaiveDateTime::parse_from_str(timestamp, VERSIONED_TIMESTAMP_FORMAT)
                        .map_err(|e| bad_timestamp(timestamp, e))?;

                Ok((Some(pieces[2].to_string()), timestamp, file_name.to_string()))
            }
        }
    }

    /// Unix seconds of `timestamp`, read as local time.
    pub fn unix_timestamp(&self) -> i64 {
        Local
            .from_local_datetime(&self.timestamp)
            .earliest()
            .map(|dt| dt.timestamp())
            .unwrap_or_else(|| self.timestamp.and_utc().timestamp())
    }
}

fn bad_timestamp(raw: &str, e: chrono::ParseError) -> ArrchiveError {
    ArrchiveError::InvalidBackup(format!("bad timestamp {:?}: {}", raw, e))
}

/// Sort backups newest-first. Stable for equal timestamps.
pub fn sort_backups(backups: &mut [Backup]) {
    backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// "backup" or "backups", depending on `count`
pub fn backup_term(count: usize) -> &'static str {
    if count == 1 {
        "backup"
    } else {
        "backups"
    }
}
