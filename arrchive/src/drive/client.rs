//! Google Drive v3 implementation of [`StorageClient`].

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::{debug, trace};

use super::{Authenticator, RemoteFile, StorageClient, UploadedFile};
use crate::utils::errors::{ArrchiveError, Result};

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com";

const FILE_FIELDS: &str = "id,name,webViewLink";
const PAGE_SIZE: &str = "1000";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    web_view_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Google Drive client authenticated as a service account
pub struct GoogleDrive {
    http: reqwest::Client,
    auth: Authenticator,
    api_base: String,
    upload_base: String,
}

impl GoogleDrive {
    pub fn new(auth: Authenticator) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth,
            api_base: DEFAULT_API_BASE.to_string(),
            upload_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Point metadata and upload requests at another host
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        let base = base.into();
        self.api_base = base.clone();
        self.upload_base = base;
        self
    }

    /// Obtain the first access token, failing fast on bad credentials
    pub async fn authenticate(&self) -> Result<()> {
        self.auth.access_token().await.map(|_| ())
    }

    fn files_url(&self) -> String {
        format!("{}/drive/v3/files", self.api_base)
    }
}

/// Turn a non-2xx response into a storage error carrying the body.
async fn check(resp: reqwest::Response, what: &str) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    Err(ArrchiveError::Storage(format!("{} failed with {}: {}", what, status, body)))
}

#[async_trait]
impl StorageClient for GoogleDrive {
    async fn list(&self, folder_id: &str) -> Result<Vec<RemoteFile>> {
        let query = format!("'{}' in parents and trashed=false", folder_id.replace('\'', "\\'"));
        let fields = format!("nextPageToken,files({})", FILE_FIELDS);
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let token = self.auth.access_token().await?;
            let mut params = vec![
                ("q", query.as_str()),
                ("fields", fields.as_str()),
                ("pageSize", PAGE_SIZE),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ];
            if let Some(page) = page_token.as_deref() {
                params.push(("pageToken", page));
            }

            let resp = self
                .http
                .get(self.files_url())
                .bearer_auth(token)
                .query(&params)
                .send()
                .await?;
            let page: FileList = check(resp, "List files").await?.json().await?;

            trace!("Listed {} files from folder {}", page.files.len(), folder_id);

            files.extend(page.files.into_iter().map(|f| RemoteFile {
                id: f.id,
                title: f.name,
                alternate_link: f.web_view_link,
            }));

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        Ok(files)
    }

    async fn upload(&self, path: &Path, title: &str, folder_id: &str) -> Result<UploadedFile> {
        let file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();
        let token = self.auth.access_token().await?;

        // Start a resumable session, then stream the archive to it.
        let resp = self
            .http
            .post(format!("{}/upload/drive/v3/files", self.upload_base))
            .bearer_auth(&token)
            .query(&[
                ("uploadType", "resumable"),
                ("supportsAllDrives", "true"),
                ("fields", FILE_FIELDS),
            ])
            .header("x-upload-content-type", "application/zip")
            .header("x-upload-content-length", size.to_string())
            .json(&serde_json::json!({
                "name": title,
                "parents": [folder_id],
            }))
            .send()
            .await?;
        let resp = check(resp, "Start upload").await?;

        let session = resp
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ArrchiveError::Storage("upload session has no Location header".into()))?
            .to_string();

        debug!("Uploading {} ({} bytes)", path.display(), size);

        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let resp = self
            .http
            .put(&session)
            .bearer_auth(&token)
            .header(reqwest::header::CONTENT_TYPE, "application/zip")
            .header(reqwest::header::CONTENT_LENGTH, size.to_string())
            .body(body)
            .send()
            .await?;
        let uploaded: DriveFile = check(resp, "Upload").await?.json().await?;

        trace!(?uploaded, "Upload complete");

        Ok(UploadedFile {
            id: uploaded.id,
            alternate_link: uploaded.web_view_link,
        })
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let token = self.auth.access_token().await?;

        let resp = self
            .http
            .delete(format!("{}/{}", self.files_url(), id))
            .bearer_auth(token)
            .query(&[("supportsAllDrives", "true")])
            .send()
            .await?;
        check(resp, "Delete").await?;

        Ok(())
    }
}
