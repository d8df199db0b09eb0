use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::config::NotifyConfig;

use super::{IntegrationError, check_status, http_client, truncate_chars};

/// Discord rejects message content longer than this
pub const MAX_CONTENT_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedType {
    #[default]
    Rich,
    Image,
    Video,
    Gifv,
    Article,
    Link,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedAuthor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// A rich attachment on a webhook message. Built with chained setters:
///
/// ```
/// use worklog::integrations::webhook::Embed;
/// let embed = Embed::new().title("Summary").color(0x5865F2);
/// assert_eq!(embed.title.as_deref(), Some("Summary"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: EmbedType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<EmbedAuthor>,
}

impl Embed {
    pub fn new() -> Self {
        Embed::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn kind(mut self, kind: EmbedType) -> Self {
        self.kind = kind;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// 24-bit RGB, e.g. `0xFB4196`
    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color & 0x00FF_FFFF);
        self
    }

    pub fn author(mut self, name: impl Into<String>, url: Option<String>, icon_url: Option<String>) -> Self {
        self.author = Some(EmbedAuthor {
            name: name.into(),
            url,
            icon_url,
        });
        self
    }
}

/// Body of a webhook execute request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookPayload {
    pub content: String,
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub avatar_url: String,
    pub embeds: Vec<Embed>,
}

impl WebhookPayload {
    /// Content longer than [`MAX_CONTENT_CHARS`] is cut to fit
    pub fn new(content: &str, username: impl Into<String>, avatar_url: impl Into<String>) -> Self {
        WebhookPayload {
            content: truncate_chars(content, MAX_CONTENT_CHARS),
            username: username.into(),
            avatar_url: avatar_url.into(),
            embeds: Vec::new(),
        }
    }

    pub fn with_embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }
}

/// Posts messages to a configured webhook URL
pub struct WebhookNotifier {
    url: String,
    username: String,
    avatar_url: String,
    client: reqwest::blocking::Client,
}

impl WebhookNotifier {
    /// `Ok(None)` when no webhook URL is configured
    pub fn from_config(config: &NotifyConfig) -> Result<Option<Self>, IntegrationError> {
        let Some(url) = config.webhook_url.as_deref().filter(|u| !u.trim().is_empty()) else {
            return Ok(None);
        };
        Ok(Some(WebhookNotifier {
            url: url.to_string(),
            username: config.username.clone(),
            avatar_url: config.avatar_url.clone(),
            client: http_client()?,
        }))
    }

    /// A payload carrying this notifier's identity
    pub fn payload(&self, content: &str) -> WebhookPayload {
        WebhookPayload::new(content, self.username.clone(), self.avatar_url.clone())
    }

    pub fn post(&self, payload: &WebhookPayload) -> Result<(), IntegrationError> {
        tracing::debug!(embeds = payload.embeds.len(), "posting webhook");
        let response = self.client.post(&self.url).json(payload).send()?;
        check_status(response)?;
        Ok(())
    }

    /// Post and log the outcome; failures never propagate
    pub fn notify(&self, payload: &WebhookPayload) {
        match self.post(payload) {
            Ok(()) => tracing::info!("webhook notification sent"),
            Err(e) => tracing::warn!(error = %e, "webhook notification failed"),
        }
    }
}
