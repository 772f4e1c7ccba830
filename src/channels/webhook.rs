//! WhatsApp Cloud API webhook payloads and their conversion to `InboundMessage`.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::pipeline::types::{InboundMessage, MessageKind};

/// Top-level webhook notification.
#[derive(Debug, Deserialize)]
pub struct WebhookNotification {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub field: String,
    pub value: ChangeValue,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub messages: Vec<WaMessage>,
}

#[derive(Debug, Deserialize)]
pub struct Contact {
    pub wa_id: String,
    #[serde(default)]
    pub profile: Option<Profile>,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: Option<String>,
}

/// One message inside a change.
#[derive(Debug, Deserialize)]
pub struct WaMessage {
    pub id: String,
    pub from: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: Option<TextPart>,
    #[serde(default)]
    pub button: Option<ButtonPart>,
    #[serde(default)]
    pub interactive: Option<InteractivePart>,
    #[serde(default)]
    pub document: Option<MediaPart>,
    #[serde(default)]
    pub image: Option<MediaPart>,
}

#[derive(Debug, Deserialize)]
pub struct TextPart {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct ButtonPart {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct InteractivePart {
    #[serde(default)]
    pub button_reply: Option<ReplyPart>,
    #[serde(default)]
    pub list_reply: Option<ReplyPart>,
}

#[derive(Debug, Deserialize)]
pub struct ReplyPart {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct MediaPart {
    pub id: String,
    #[serde(default)]
    pub caption: Option<String>,
}

impl WaMessage {
    /// User-visible text of the message, empty for media without a caption.
    fn body(&self) -> String {
        if let Some(ref text) = self.text {
            return text.body.clone();
        }
        if let Some(ref button) = self.button {
            return button.text.clone();
        }
        if let Some(ref interactive) = self.interactive {
            if let Some(ref reply) = interactive.button_reply {
                return reply.title.clone();
            }
            if let Some(ref reply) = interactive.list_reply {
                return reply.title.clone();
            }
        }
        self.document
            .as_ref()
            .or(self.image.as_ref())
            .and_then(|m| m.caption.clone())
            .unwrap_or_default()
    }

    fn message_kind(&self) -> MessageKind {
        match self.kind.as_str() {
            "text" => MessageKind::Text,
            "button" | "interactive" => MessageKind::Reply,
            "document" => MessageKind::Document,
            "image" => MessageKind::Image,
            other => MessageKind::Other(other.to_string()),
        }
    }

    fn received_at(&self) -> DateTime<Utc> {
        self.timestamp
            .as_deref()
            .and_then(|t| t.parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(Utc::now)
    }
}

impl WebhookNotification {
    /// Extract every user message carried by this notification.
    ///
    /// Status-only notifications (delivery receipts) yield nothing.
    pub fn into_inbound_messages(self) -> Vec<InboundMessage> {
        let mut out = Vec::new();
        for change in self.entry.into_iter().flat_map(|e| e.changes) {
            let value = change.value;
            let contact = value.contacts.first();
            for msg in value.messages {
                let sender = contact
                    .map(|c| c.wa_id.clone())
                    .unwrap_or_else(|| msg.from.clone());
                let sender_name = contact
                    .and_then(|c| c.profile.as_ref())
                    .and_then(|p| p.name.clone());
                let document_ref = msg
                    .document
                    .as_ref()
                    .or(msg.image.as_ref())
                    .map(|m| m.id.clone());

                out.push(InboundMessage {
                    id: msg.id.clone(),
                    sender,
                    sender_name,
                    kind: msg.message_kind(),
                    text: msg.body(),
                    document_ref,
                    received_at: msg.received_at(),
                });
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> Vec<InboundMessage> {
        serde_json::from_value::<WebhookNotification>(json)
            .unwrap()
            .into_inbound_messages()
    }

    #[test]
    fn text_message_uses_contact_wa_id() {
        let messages = parse(serde_json::json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "WABA",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "contacts": [{"profile": {"name": "Ana"}, "wa_id": "51987654321"}],
                        "messages": [{
                            "from": "51987654321",
                            "id": "wamid.1",
                            "timestamp": "1760000000",
                            "type": "text",
                            "text": {"body": "Hola, quiero información"}
                        }]
                    }
                }]
            }]
        }));
        assert_eq!(messages.len(), 1);
        let msg = &messages[0];
        assert_eq!(msg.id, "wamid.1");
        assert_eq!(msg.sender, "51987654321");
        assert_eq!(msg.sender_name.as_deref(), Some("Ana"));
        assert_eq!(msg.kind, MessageKind::Text);
        assert_eq!(msg.text, "Hola, quiero información");
        assert!(msg.document_ref.is_none());
        assert_eq!(msg.received_at.timestamp(), 1_760_000_000);
    }

    #[test]
    fn sender_falls_back_to_from_without_contacts() {
        let messages = parse(serde_json::json!({
            "entry": [{"changes": [{"field": "messages", "value": {
                "messages": [{"from": "51900000000", "id": "wamid.2", "type": "text", "text": {"body": "hola"}}]
            }}]}]
        }));
        assert_eq!(messages[0].sender, "51900000000");
    }

    #[test]
    fn document_without_caption_has_empty_text_and_reference() {
        let messages = parse(serde_json::json!({
            "entry": [{"changes": [{"field": "messages", "value": {
                "contacts": [{"wa_id": "51911111111"}],
                "messages": [{
                    "from": "51911111111", "id": "wamid.3", "type": "document",
                    "document": {"id": "MEDIA42", "filename": "dni.pdf", "mime_type": "application/pdf"}
                }]
            }}]}]
        }));
        let msg = &messages[0];
        assert_eq!(msg.kind, MessageKind::Document);
        assert!(msg.text.is_empty());
        assert_eq!(msg.document_ref.as_deref(), Some("MEDIA42"));
    }

    #[test]
    fn interactive_reply_title_becomes_text() {
        let messages = parse(serde_json::json!({
            "entry": [{"changes": [{"field": "messages", "value": {
                "messages": [{
                    "from": "51922222222", "id": "wamid.4", "type": "interactive",
                    "interactive": {"type": "button_reply", "button_reply": {"id": "b1", "title": "Beneficios"}}
                }]
            }}]}]
        }));
        assert_eq!(messages[0].kind, MessageKind::Reply);
        assert_eq!(messages[0].text, "Beneficios");
    }

    #[test]
    fn status_only_notification_yields_nothing() {
        let messages = parse(serde_json::json!({
            "object": "whatsapp_business_account",
            "entry": [{"changes": [{"field": "messages", "value": {
                "statuses": [{"id": "wamid.9", "status": "delivered", "recipient_id": "51900000000"}]
            }}]}]
        }));
        assert!(messages.is_empty());
    }

    #[test]
    fn unsupported_type_is_kept_as_other() {
        let messages = parse(serde_json::json!({
            "entry": [{"changes": [{"field": "messages", "value": {
                "messages": [{"from": "51933333333", "id": "wamid.5", "type": "sticker", "sticker": {"id": "S1"}}]
            }}]}]
        }));
        assert_eq!(messages[0].kind, MessageKind::Other("sticker".into()));
        assert!(messages[0].text.is_empty());
    }
}
