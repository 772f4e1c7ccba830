//! WhatsApp Cloud API client — sends text and image messages.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::channels::platform::MessagingPlatform;
use crate::config::WhatsAppConfig;
use crate::error::DeliveryError;

const PLATFORM: &str = "whatsapp";

/// WhatsApp Cloud API channel.
///
/// Holds one pooled `reqwest::Client` shared by every delivery.
pub struct WhatsAppChannel {
    access_token: SecretString,
    messages_url: String,
    client: reqwest::Client,
}

impl WhatsAppChannel {
    pub fn new(config: &WhatsAppConfig) -> Result<Self, DeliveryError> {
        Self::with_endpoint(
            &config.api_base,
            &config.api_version,
            &config.phone_number_id,
            config.access_token.clone(),
            config.send_timeout,
        )
    }

    /// Build a client against an explicit Graph API host.
    pub fn with_endpoint(
        api_base: &str,
        api_version: &str,
        phone_number_id: &str,
        access_token: SecretString,
        timeout: Duration,
    ) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeliveryError::Transport {
                platform: PLATFORM.into(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            access_token,
            messages_url: format!(
                "{}/{}/{}/messages",
                api_base.trim_end_matches('/'),
                api_version,
                phone_number_id
            ),
            client,
        })
    }

    async fn post(&self, body: serde_json::Value) -> Result<(), DeliveryError> {
        let resp = self
            .client
            .post(&self.messages_url)
            .bearer_auth(self.access_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport {
                platform: PLATFORM.into(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if status.is_success() {
            debug!(status = %status, "WhatsApp message accepted");
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        warn!(status = %status, body = %body, "WhatsApp rejected message");
        Err(DeliveryError::Rejected {
            platform: PLATFORM.into(),
            status: status.as_u16(),
            body,
        })
    }
}

/// Request body for a text message.
pub fn text_body(to: &str, body: &str, preview_url: bool) -> serde_json::Value {
    serde_json::json!({
        "messaging_product": "whatsapp",
        "recipient_type": "individual",
        "to": to,
        "type": "text",
        "text": {
            "preview_url": preview_url,
            "body": body,
        }
    })
}

/// Request body for an image message.
pub fn image_body(to: &str, link: &str) -> serde_json::Value {
    serde_json::json!({
        "messaging_product": "whatsapp",
        "to": to,
        "type": "image",
        "image": { "link": link }
    })
}

#[async_trait]
impl MessagingPlatform for WhatsAppChannel {
    fn name(&self) -> &str {
        PLATFORM
    }

    async fn send_text(
        &self,
        to: &str,
        body: &str,
        preview_url: bool,
    ) -> Result<(), DeliveryError> {
        self.post(text_body(to, body, preview_url)).await
    }

    async fn send_image(&self, to: &str, link: &str) -> Result<(), DeliveryError> {
        self.post(image_body(to, link)).await
    }
}
