//! Channel abstraction for message I/O.

pub mod platform;
pub mod webhook;
pub mod whatsapp;

pub use platform::MessagingPlatform;
pub use webhook::WebhookNotification;
pub use whatsapp::WhatsAppChannel;
