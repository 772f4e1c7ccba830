//! Notification sender — delivers replies through the messaging platform.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::channels::platform::MessagingPlatform;
use crate::error::{DeliveryError, PipelineError};
use crate::pipeline::types::Notification;

/// Thin, cloneable wrapper over a `MessagingPlatform`.
#[derive(Clone)]
pub struct Notifier {
    platform: Arc<dyn MessagingPlatform>,
}

impl Notifier {
    pub fn new(platform: Arc<dyn MessagingPlatform>) -> Self {
        Self { platform }
    }

    /// Deliver one notification.
    pub async fn send(&self, to: &str, notification: &Notification) -> Result<(), DeliveryError> {
        let result = match notification {
            Notification::Text(body) => self.platform.send_text(to, body, false).await,
            Notification::TextWithPreview(body) => self.platform.send_text(to, body, true).await,
            Notification::Image(link) => self.platform.send_image(to, link).await,
        };

        match &result {
            Ok(()) => debug!(
                to,
                kind = notification.kind(),
                platform = self.platform.name(),
                "Notification delivered"
            ),
            Err(e) => warn!(
                to,
                kind = notification.kind(),
                platform = self.platform.name(),
                error = %e,
                "Notification failed"
            ),
        }
        result
    }

    /// Deliver notifications in order, stopping at the first failure.
    ///
    /// Returns how many were delivered.
    pub async fn send_all(
        &self,
        to: &str,
        notifications: &[Notification],
    ) -> Result<usize, PipelineError> {
        for (delivered, notification) in notifications.iter().enumerate() {
            if let Err(source) = self.send(to, notification).await {
                return Err(PipelineError::Delivery {
                    delivered,
                    planned: notifications.len(),
                    source,
                });
            }
        }
        Ok(notifications.len())
    }
}
