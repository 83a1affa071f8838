//! Shared fakes for integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use arrchive::drive::{RemoteFile, StorageClient, UploadedFile};
use arrchive::notify::{Notification, NotificationSink};
use arrchive::{ArrchiveError, Result};
use async_trait::async_trait;

/// In-memory remote folder
#[derive(Default)]
pub struct MemoryStorage {
    files: Mutex<Vec<RemoteFile>>,
    next_id: Mutex<usize>,
    pub fail_list: bool,
    pub fail_uploads: HashSet<String>,
    pub fail_deletes: HashSet<String>,
    pub uploads: Mutex<Vec<String>>,
    pub deletes: Mutex<Vec<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a remote file, returning its id
    pub fn seed(&self, title: &str) -> String {
        let id = self.allocate_id();
        self.files.lock().unwrap().push(RemoteFile {
            id: id.clone(),
            title: title.to_string(),
            alternate_link: Some(link(&id)),
        });
        id
    }

    pub fn titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = self
            .files
            .lock()
            .unwrap()
            .iter()
            .map(|f| f.title.clone())
            .collect();
        titles.sort();
        titles
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.lock().unwrap().len()
    }

    fn allocate_id(&self) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        format!("file-{}", next)
    }
}

pub fn link(id: &str) -> String {
    format!("https://drive.google.com/file/d/{}/view", id)
}

#[async_trait]
impl StorageClient for MemoryStorage {
    async fn list(&self, _folder_id: &str) -> Result<Vec<RemoteFile>> {
        if self.fail_list {
            return Err(ArrchiveError::Storage("listing unavailable".into()));
        }
        Ok(self.files.lock().unwrap().clone())
    }

    async fn upload(&self, path: &Path, title: &str, _folder_id: &str) -> Result<UploadedFile> {
        if self.fail_uploads.contains(title) {
            return Err(ArrchiveError::Storage(format!("upload of {} rejected", title)));
        }
        if !path.is_file() {
            return Err(ArrchiveError::Storage(format!("{} is not a file", path.display())));
        }

        let id = self.allocate_id();
        self.files.lock().unwrap().push(RemoteFile {
            id: id.clone(),
            title: title.to_string(),
            alternate_link: Some(link(&id)),
        });
        self.uploads.lock().unwrap().push(title.to_string());

        Ok(UploadedFile {
            id: id.clone(),
            alternate_link: Some(link(&id)),
        })
    }

    async fn delete(&self, id: &str) -> Result<()> {
        if self.fail_deletes.contains(id) {
            return Err(ArrchiveError::Storage(format!("delete of {} rejected", id)));
        }

        let mut files = self.files.lock().unwrap();
        let before = files.len();
        files.retain(|f| f.id != id);
        if files.len() == before {
            return Err(ArrchiveError::Storage(format!("{} not found", id)));
        }
        self.deletes.lock().unwrap().push(id.to_string());

        Ok(())
    }
}

/// Notification sink that keeps everything it receives
#[derive(Default, Clone)]
pub struct RecordingSink {
    pub sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingSink {
    pub fn titles(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|n| n.title.clone()).collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, notification: &Notification) -> Result<()> {
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

pub fn touch(dir: &Path, name: &str) {
    std::fs::write(dir.join(name), b"PK\x03\x04").unwrap();
}

pub fn sonarr(day: u32) -> String {
    format!("sonarr_backup_v4.0.14.2939_2025.03.{:02}_06.00.00.zip", day)
}
