//! Discord webhook sink.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Notification, NotificationSink};
use crate::utils::errors::{ArrchiveError, Result};

const THUMBNAIL_URL: &str = "https://i.imgur.com/bOn2yC4.png";
const FOOTER_ICON_URL: &str = "https://i.imgur.com/pynYfuR.png";
const MAX_ATTEMPTS: u32 = 3;
const MAX_RETRY_WAIT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct WebhookBody<'a> {
    embeds: Vec<Embed<'a>>,
}

#[derive(Debug, Serialize)]
struct Embed<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    color: u32,
    author: EmbedAuthor<'a>,
    thumbnail: EmbedImage<'a>,
    fields: Vec<EmbedField<'a>>,
    footer: EmbedFooter<'a>,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct EmbedAuthor<'a> {
    name: &'a str,
    icon_url: &'a str,
}

#[derive(Debug, Serialize)]
struct EmbedImage<'a> {
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct EmbedField<'a> {
    name: &'a str,
    value: &'a str,
    inline: bool,
}

#[derive(Debug, Serialize)]
struct EmbedFooter<'a> {
    text: &'a str,
    icon_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct RateLimited {
    /// Seconds to wait before retrying
    retry_after: f64,
}

/// Posts each notification as a single embed
pub struct DiscordWebhook {
    http: reqwest::Client,
    url: String,
}

impl DiscordWebhook {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

fn embed(notification: &Notification) -> Embed<'_> {
    Embed {
        title: &notification.title,
        url: notification.url.as_deref(),
        color: notification.color,
        author: EmbedAuthor {
            name: &notification.author,
            icon_url: &notification.author_icon,
        },
        thumbnail: EmbedImage { url: THUMBNAIL_URL },
        fields: notification
            .fields
            .iter()
            .map(|f| EmbedField {
                name: &f.name,
                value: &f.value,
                inline: true,
            })
            .collect(),
        footer: EmbedFooter {
            text: "Arrchive",
            icon_url: FOOTER_ICON_URL,
        },
        timestamp: notification.timestamp.to_rfc3339(),
    }
}

#[async_trait]
impl NotificationSink for DiscordWebhook {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let body = WebhookBody {
            embeds: vec![embed(notification)],
        };

        for attempt in 1..=MAX_ATTEMPTS {
            let resp = self.http.post(&self.url).json(&body).send().await?;
            let status = resp.status();

            if status.is_success() {
                debug!("Delivered notification {:?}", notification.title);
                return Ok(());
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS && attempt < MAX_ATTEMPTS {
                let wait = resp
                    .json::<RateLimited>()
                    .await
                    .map(|r| r.retry_after)
                    .unwrap_or(1.0);
                let delay = Duration::try_from_secs_f64(wait.max(0.0))
                    .ok()
                    .filter(|delay| *delay <= MAX_RETRY_WAIT)
                    .ok_or_else(|| {
                        ArrchiveError::Notification(format!(
                            "webhook rate limited for {}s, longer than {}s",
                            wait,
                            MAX_RETRY_WAIT.as_secs()
                        ))
                    })?;
                warn!("Discord webhook rate limited, retrying in {:.2}s", wait);
                tokio::time::sleep(delay).await;
                continue;
            }

            let text = resp.text().await.unwrap_or_default();
            return Err(ArrchiveError::Notification(format!(
                "webhook returned {}: {}",
                status, text
            )));
        }

        Err(ArrchiveError::Notification(format!(
            "webhook still rate limited after {} attempts",
            MAX_ATTEMPTS
        )))
    }
}
