//! Per-source collection of backups known to exist in remote storage.

use std::collections::{BTreeMap, HashSet};

use super::record::Backup;
use super::source::Source;

/// Remote backups grouped by source, with a `(source, file_name)` index so
/// "is this already synced?" is a single lookup.
///
/// Every listed entry is kept, including duplicate titles, so each one stays
/// reachable by the delete pass.
#[derive(Debug, Clone)]
pub struct Catalog {
    backups: BTreeMap<Source, Vec<Backup>>,
    names: HashSet<(Source, String)>,
}

impl Catalog {
    /// An empty catalog with a (possibly empty) list for every source
    pub fn new() -> Self {
        Self {
            backups: Source::ALL.into_iter().map(|source| (source, Vec::new())).collect(),
            names: HashSet::new(),
        }
    }

    pub fn insert(&mut self, backup: Backup) {
        self.names.insert((backup.source, backup.file_name.clone()));
        self.backups.entry(backup.source).or_default().push(backup);
    }

    /// Whether a backup with this canonical filename exists for `source`
    pub fn contains(&self, source: Source, file_name: &str) -> bool {
        self.names.contains(&(source, file_name.to_string()))
    }

    pub fn get(&self, source: Source) -> &[Backup] {
        self.backups.get(&source).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get_mut(&mut self, source: Source) -> &mut Vec<Backup> {
        self.backups.entry(source).or_default()
    }

    /// Total number of backups across all sources
    pub fn count(&self) -> usize {
        self.backups.values().map(Vec::len).sum()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
