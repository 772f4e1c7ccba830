//! Messaging-platform abstraction used by the notification sender.

use async_trait::async_trait;

use crate::error::DeliveryError;

/// Outbound side of a messaging platform. Pure I/O, no business logic.
#[async_trait]
pub trait MessagingPlatform: Send + Sync {
    /// Platform name (e.g. "whatsapp").
    fn name(&self) -> &str;

    /// Send a text message. `preview_url` asks the client to render link previews.
    async fn send_text(&self, to: &str, body: &str, preview_url: bool)
    -> Result<(), DeliveryError>;

    /// Send an image by public link.
    async fn send_image(&self, to: &str, link: &str) -> Result<(), DeliveryError>;
}
