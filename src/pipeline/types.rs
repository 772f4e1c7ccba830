//! Shared types for the message dispatch pipeline.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Inbound message ─────────────────────────────────────────────────

/// Kind of the WhatsApp message that produced an `InboundMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    /// Quick-reply button or interactive list selection.
    Reply,
    Document,
    Image,
    Other(String),
}

/// One received user message.
///
/// Built by the webhook transport, consumed by the pipeline, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Platform message id.
    pub id: String,
    /// Sender address (`wa_id`); replies go here.
    pub sender: String,
    /// Profile name, when the platform provides it.
    pub sender_name: Option<String>,
    pub kind: MessageKind,
    /// Raw text body. Empty for non-text messages.
    pub text: String,
    /// Media id of an attached document or image.
    pub document_ref: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    /// Convenience constructor for a plain text message.
    pub fn text(id: impl Into<String>, sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sender: sender.into(),
            sender_name: None,
            kind: MessageKind::Text,
            text: text.into(),
            document_ref: None,
            received_at: Utc::now(),
        }
    }
}

// ── Intents ─────────────────────────────────────────────────────────

/// Closed intent vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Enrollment,
    InfoOrGreeting,
    Benefits,
    OpenCycles,
    PaymentHistoryWithDocument,
    PaymentHistoryWithoutDocument,
    RenewalWithoutDocument,
    RenewalWithDocument,
    /// Anything outside the vocabulary, including failed classifications.
    Unrecognized,
}

impl Intent {
    /// Every label the classifier may return, in prompt order.
    pub const VOCABULARY: [Intent; 8] = [
        Intent::Enrollment,
        Intent::InfoOrGreeting,
        Intent::Benefits,
        Intent::OpenCycles,
        Intent::PaymentHistoryWithDocument,
        Intent::PaymentHistoryWithoutDocument,
        Intent::RenewalWithoutDocument,
        Intent::RenewalWithDocument,
    ];

    /// Exact wire label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Enrollment => "Inscripciones",
            Self::InfoOrGreeting => "Información o Saludo",
            Self::Benefits => "Beneficios",
            Self::OpenCycles => "Ciclos Aperturados",
            Self::PaymentHistoryWithDocument => "Historial de pagos realizados con documento",
            Self::PaymentHistoryWithoutDocument => "Historial de pagos realizados sin documento",
            Self::RenewalWithoutDocument => "Renovar pago sin documento de identidad",
            Self::RenewalWithDocument => "Renovar pago con documento de identidad",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// Case-sensitive lookup; `None` for anything outside the vocabulary.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::VOCABULARY.into_iter().find(|i| i.label() == label)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifier output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedIntent {
    pub intent: Intent,
    /// Normalized document identifier, only when one was found in the text.
    pub document: Option<String>,
}

impl ClassifiedIntent {
    pub fn new(intent: Intent, document: Option<String>) -> Self {
        Self { intent, document }
    }

    pub fn unrecognized() -> Self {
        Self::new(Intent::Unrecognized, None)
    }
}

// ── Renewal ─────────────────────────────────────────────────────────

/// Outcome of a renewal lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewalStatus {
    Current,
    Overdue { link: String },
    NotFound,
    /// Record found, but its state has no rule.
    Unclassified { state: String },
    /// The data store could not answer.
    LookupFailed,
}

impl RenewalStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Overdue { .. } => "overdue",
            Self::NotFound => "not_found",
            Self::Unclassified { .. } => "unclassified",
            Self::LookupFailed => "lookup_failed",
        }
    }
}

// ── Outbound ────────────────────────────────────────────────────────

/// A single outbound send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Text(String),
    /// Text whose links should render a preview.
    TextWithPreview(String),
    /// Image by public link.
    Image(String),
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::TextWithPreview(_) => "text_preview",
            Self::Image(_) => "image",
        }
    }
}

/// Result of dispatching one classified message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub intent: Intent,
    pub renewal: Option<RenewalStatus>,
    /// Sends delivered, in order.
    pub delivered: usize,
}
