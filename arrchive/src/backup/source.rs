//! Registry of the applications whose backups arrchive manages.

use std::fmt;

/// A backup-producing application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Source {
    Bazarr,
    Profilarr,
    Prowlarr,
    Radarr,
    Sonarr,
}

impl Source {
    /// Every known source, in processing order.
    pub const ALL: [Source; 5] = [
        Source::Bazarr,
        Source::Profilarr,
        Source::Prowlarr,
        Source::Radarr,
        Source::Sonarr,
    ];

    /// Display name, also used (lowercased) as the backup filename prefix
    pub fn name(&self) -> &'static str {
        match self {
            Source::Bazarr => "Bazarr",
            Source::Profilarr => "Profilarr",
            Source::Prowlarr => "Prowlarr",
            Source::Radarr => "Radarr",
            Source::Sonarr => "Sonarr",
        }
    }

    /// Brand color as a hexadecimal RGB string
    pub fn color(&self) -> &'static str {
        match self {
            Source::Bazarr => "BE4BDB",
            Source::Profilarr => "C39766",
            Source::Prowlarr => "E66001",
            Source::Radarr => "FFC12F",
            Source::Sonarr => "00CCFF",
        }
    }

    /// Brand color as the integer form notification embeds expect
    pub fn color_value(&self) -> u32 {
        // Every registry color is a valid 6-digit hex literal.
        u32::from_str_radix(self.color(), 16).unwrap_or_default()
    }

    /// Brand icon URL
    pub fn icon(&self) -> &'static str {
        match self {
            Source::Bazarr => "https://raw.githubusercontent.com/morpheus65535/bazarr/refs/heads/master/frontend/public/images/logo128.png",
            Source::Profilarr => "https://raw.githubusercontent.com/Dictionarry-Hub/website/refs/heads/v2/public/logo.png",
            Source::Prowlarr => "https://raw.githubusercontent.com/Prowlarr/Prowlarr/refs/heads/develop/Logo/1024.png",
            Source::Radarr => "https://raw.githubusercontent.com/Radarr/Radarr/refs/heads/develop/Logo/1024.png",
            Source::Sonarr => "https://raw.githubusercontent.com/Sonarr/Sonarr/refs/heads/v5-develop/Logo/1024.png",
        }
    }

    /// Canonical filename prefix, e.g. `radarr_backup_`
    pub fn prefix(&self) -> String {
        format!("{}_backup_", self.name().to_lowercase())
    }

    /// Environment variable holding this source's local backup directory
    pub fn env_key(&self) -> String {
        format!("{}_BACKUP_PATH", self.name().to_uppercase())
    }

    /// Whether `file_name` starts with this source's canonical prefix (case-insensitive)
    pub fn matches(&self, file_name: &str) -> bool {
        let prefix = self.prefix();
        file_name
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(&prefix))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What happened to a backup in remote storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Uploaded,
    Deleted,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Uploaded => f.write_str("Uploaded"),
            Action::Deleted => f.write_str("Deleted"),
        }
    }
}
