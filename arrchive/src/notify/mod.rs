//! Notifications for upload and delete actions.
//!
//! [`Notifier`] turns a backup plus an [`Action`] into a [`Notification`] and
//! hands it to a [`NotificationSink`]. Delivery failures never reach the
//! caller.

pub mod discord;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, error, trace, warn};

use crate::backup::{Action, Backup};
use crate::Result;

pub use discord::DiscordWebhook;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationField {
    pub name: String,
    pub value: String,
}

/// Rendering-agnostic description of one backup event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub color: u32,
    pub author: String,
    pub author_icon: String,
    pub fields: Vec<NotificationField>,
    /// Clickable link, only set for uploads
    pub url: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    /// Build the payload for `backup`, or `None` when it has no remote URL to point at
    pub fn for_backup(backup: &Backup, action: Action) -> Option<Self> {
        let remote_url = backup.remote_url.as_ref()?;

        let mut fields = vec![NotificationField {
            name: "Timestamp".to_string(),
            value: format!("<t:{}:F>", backup.unix_timestamp()),
        }];

        if let Some(version) = &backup.source_version {
            fields.push(NotificationField {
                name: "Version".to_string(),
                value: version.clone(),
            });
        }

        Some(Self {
            title: format!("Backup {}", action),
            color: backup.source.color_value(),
            author: backup.source.name().to_string(),
            author_icon: backup.source.icon().to_string(),
            fields,
            url: (action == Action::Uploaded).then(|| remote_url.clone()),
            timestamp: Utc::now(),
        })
    }
}

/// Delivers notifications somewhere (webhook, log, ...)
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<()>;
}

/// Adapter between the reconciler and a notification sink
pub struct Notifier {
    sink: Box<dyn NotificationSink>,
}

impl Notifier {
    pub fn new(sink: impl NotificationSink + 'static) -> Self {
        Self { sink: Box::new(sink) }
    }

    /// Report `action` for `backup`. Missing links and delivery errors are logged, never returned.
    pub async fn notify(&self, backup: &Backup, action: Action) {
        let Some(notification) = Notification::for_backup(backup, action) else {
            warn!(
                "Attempted to send notification without remote URL for {} backup {}",
                backup.source, backup.timestamp_formatted
            );
            debug!(?backup, "Notification skipped");
            return;
        };

        trace!(?notification, "Sending notification");

        if let Err(e) = self.sink.send(&notification).await {
            error!(
                "Failed to send notification for {} backup {}: {}",
                backup.source, backup.timestamp_formatted, e
            );
        }
    }
}
