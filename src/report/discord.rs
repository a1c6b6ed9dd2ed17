//! Discord webhook payload and delivery.

use chrono::NaiveDateTime;
use log::debug;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use std::sync::Mutex;

use crate::error::Result;

pub const WEBHOOK_USERNAME: &str = "SCC Bot";
pub const WEBHOOK_AVATAR_URL: &str = "https://png.pngtree.com/background/20240102/original/pngtree-graph-red-flat-icon-isolated-statistics-profile-symbol-photo-picture-image_7072156.jpg";
pub const EMBED_COLOR: u32 = 0x3498db;
const EMBED_TITLE: &str = "✨ Weekly SCC Report ✨";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedImage {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub image: EmbedImage,
    pub footer: EmbedFooter,
}

/// Body sent as the `payload_json` part of the webhook request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookPayload {
    pub embeds: Vec<Embed>,
    pub username: String,
    pub avatar_url: String,
}

impl WebhookPayload {
    /// A single embed showing `attachment_name` inline.
    pub fn weekly(description: String, attachment_name: &str, generated_at: NaiveDateTime) -> Self {
        let embed = Embed {
            title: EMBED_TITLE.to_string(),
            description,
            color: EMBED_COLOR,
            image: EmbedImage {
                url: format!("attachment://{attachment_name}"),
            },
            footer: EmbedFooter {
                text: format!(
                    "Powered by SCC Bot • Generated on {}",
                    generated_at.format("%d/%m/%Y at %H:%M")
                ),
            },
        };
        Self {
            embeds: vec![embed],
            username: WEBHOOK_USERNAME.to_string(),
            avatar_url: WEBHOOK_AVATAR_URL.to_string(),
        }
    }
}

/// A PNG uploaded alongside the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// What the webhook endpoint answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Rejected { status: u16, body: String },
}

impl DeliveryOutcome {
    /// Discord answers 200 or 204 on success.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            200 | 204 => DeliveryOutcome::Delivered,
            _ => DeliveryOutcome::Rejected { status, body },
        }
    }
}

/// Destination for a finished report.
#[async_trait::async_trait]
pub trait WebhookSink: Send + Sync {
    async fn deliver(&self, payload: &WebhookPayload, attachment: Attachment)
        -> Result<DeliveryOutcome>;
}

/// Posts to a Discord webhook as `multipart/form-data`.
pub struct DiscordWebhook {
    client: reqwest::Client,
    url: String,
}

impl DiscordWebhook {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait::async_trait]
impl WebhookSink for DiscordWebhook {
    async fn deliver(
        &self,
        payload: &WebhookPayload,
        attachment: Attachment,
    ) -> Result<DeliveryOutcome> {
        let file = Part::bytes(attachment.bytes)
            .file_name(attachment.file_name)
            .mime_str("image/png")?;
        let form = Form::new()
            .text("payload_json", serde_json::to_string(payload)?)
            .part("file", file);

        let resp = self.client.post(&self.url).multipart(form).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        debug!("Webhook answered {status}");

        Ok(DeliveryOutcome::from_status(status, body))
    }
}

/// Keeps deliveries in memory instead of sending them.
#[derive(Default)]
pub struct CollectSink {
    deliveries: Mutex<Vec<(WebhookPayload, Attachment)>>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliveries(&self) -> Vec<(WebhookPayload, Attachment)> {
        self.deliveries
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl WebhookSink for CollectSink {
    async fn deliver(
        &self,
        payload: &WebhookPayload,
        attachment: Attachment,
    ) -> Result<DeliveryOutcome> {
        if let Ok(mut deliveries) = self.deliveries.lock() {
            deliveries.push((payload.clone(), attachment));
        }
        Ok(DeliveryOutcome::Delivered)
    }
}
