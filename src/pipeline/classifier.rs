//! Intent classifier — turns free text into a `ClassifiedIntent`.
//!
//! Flow:
//! 1. Empty text short-circuits to `Unrecognized` (no LLM call)
//! 2. LLM call constrained to a single JSON object over the fixed vocabulary
//! 3. Strict decode; any failure degrades to `Unrecognized`

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ClassificationError, LlmError};
use crate::llm::provider::{ChatMessage, CompletionRequest, LlmProvider, ResponseFormat};
use crate::pipeline::types::{ClassifiedIntent, Intent};

/// Max tokens for the classification call (the answer is a tiny JSON object).
const CLASSIFY_MAX_TOKENS: u32 = 128;

/// Deterministic classification.
const CLASSIFY_TEMPERATURE: f32 = 0.0;

/// Longest user text forwarded to the model.
const MAX_INPUT_CHARS: usize = 1000;

/// Document ids: DNI (8 digits) or foreigner card (up to 20 characters).
const DOCUMENT_MIN_LEN: usize = 8;
const DOCUMENT_MAX_LEN: usize = 20;
const DNI_LEN: usize = 8;

/// Words that introduce a document number in free text.
const DOCUMENT_LABELS: &[&str] = &[
    "dni",
    "ce",
    "carnet",
    "carné",
    "extranjeria",
    "extranjería",
    "documento",
    "pasaporte",
];

/// How many words back a label may sit ("carnet de extranjería es 001234567").
const LABEL_LOOKBACK: usize = 3;

static DOCUMENT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{L}\p{N}](?:[\p{L}\p{N}.\-]*[\p{L}\p{N}])?").expect("document token regex")
});

/// LLM-backed intent classifier.
pub struct IntentClassifier {
    llm: Arc<dyn LlmProvider>,
    timeout: Duration,
}

impl IntentClassifier {
    pub fn new(llm: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    /// Classify a message. Never fails: errors become `Unrecognized`.
    pub async fn classify(&self, text: &str) -> ClassifiedIntent {
        match self.try_classify(text).await {
            Ok(classified) => classified,
            Err(e) => {
                warn!(error = %e, "Classification failed, falling back to unrecognized");
                ClassifiedIntent::unrecognized()
            }
        }
    }

    /// Classify a message, surfacing the failure reason.
    pub async fn try_classify(&self, text: &str) -> Result<ClassifiedIntent, ClassificationError> {
        let text = text.trim();
        if text.is_empty() {
            debug!("Empty message text, skipping model call");
            return Ok(ClassifiedIntent::unrecognized());
        }

        let input: String = text.chars().take(MAX_INPUT_CHARS).collect();
        let request = CompletionRequest::new(vec![
            ChatMessage::system(build_classifier_system_prompt()),
            ChatMessage::user(input),
        ])
        .with_temperature(CLASSIFY_TEMPERATURE)
        .with_max_tokens(CLASSIFY_MAX_TOKENS)
        .with_response_format(ResponseFormat::JsonObject);

        // Own task, so a panicking backend degrades like any other model error.
        let llm = Arc::clone(&self.llm);
        let mut call = tokio::spawn(async move { llm.complete(request).await });
        let joined = match tokio::time::timeout(self.timeout, &mut call).await {
            Ok(joined) => joined,
            Err(_) => {
                call.abort();
                return Err(ClassificationError::Timeout(self.timeout));
            }
        };
        let response = joined.map_err(|e| LlmError::RequestFailed {
            provider: self.llm.model_name().to_string(),
            reason: format!("model call aborted: {e}"),
        })??;

        let classified = parse_classifier_response(&response.content, text).inspect_err(|e| {
            debug!(raw_response = %response.content, error = %e, "Unparseable classifier output");
        })?;

        debug!(
            model = self.llm.model_name(),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            intent = %classified.intent,
            has_document = classified.document.is_some(),
            "Message classified"
        );
        Ok(classified)
    }
}

// ── Prompt construction ─────────────────────────────────────────────

/// Build the classifier system prompt. Lists every label verbatim.
pub fn build_classifier_system_prompt() -> String {
    let mut prompt = String::from(
        "Eres el clasificador de mensajes del EduBot de la academia ÉLITE.\n\
         Clasifica la intención del mensaje del usuario en EXACTAMENTE uno de estos tipos:\n\n",
    );
    for intent in Intent::VOCABULARY {
        prompt.push_str(&format!("\"{}\"\n", intent.label()));
    }
    prompt.push_str(
        "\nResponde SOLO con un objeto JSON con esta estructura:\n\
         {\"tipo_mensaje\": \"tipo de mensaje identificado tal cual señalado arriba\", \
         \"documento\": \"número de documento de identidad si el usuario lo envió, o null\"}\n\n\
         Reglas:\n\
         - \"tipo_mensaje\" debe copiar uno de los tipos de arriba sin cambios\n\
         - \"documento\" solo contiene un DNI (8 dígitos) o carnet de extranjería (hasta 20 caracteres)\n\
         - No agregues texto fuera del objeto JSON",
    );
    prompt
}

// ── Response parsing ────────────────────────────────────────────────

/// Raw classifier response.
#[derive(Debug, Deserialize)]
struct ClassifierResponse {
    tipo_mensaje: String,
    #[serde(default)]
    documento: Option<serde_json::Value>,
}

/// Strictly decode model output into a `ClassifiedIntent`.
///
/// `text` is the user message; it is scanned for a document only when the
/// model picked a with-document intent but left `documento` empty.
pub fn parse_classifier_response(
    raw: &str,
    text: &str,
) -> Result<ClassifiedIntent, ClassificationError> {
    let json_str = extract_json_object(raw);
    let response: ClassifierResponse = serde_json::from_str(&json_str)
        .map_err(|e| ClassificationError::Malformed(e.to_string()))?;

    let label = response.tipo_mensaje.trim();
    let intent = Intent::from_label(label)
        .ok_or_else(|| ClassificationError::UnknownLabel(label.to_string()))?;

    let document = match response.documento {
        Some(serde_json::Value::String(s)) => normalize_document(&s),
        Some(serde_json::Value::Number(n)) => normalize_document(&n.to_string()),
        _ => None,
    };

    let document = match intent {
        Intent::RenewalWithDocument | Intent::PaymentHistoryWithDocument => {
            document.or_else(|| find_document(text))
        }
        _ => document,
    };

    Ok(ClassifiedIntent::new(intent, document))
}

/// Normalize a document id; `None` if it does not look like one.
///
/// Leading words without digits are labels ("DNI 12345678", "CE: 001234567")
/// and are dropped before validation.
pub fn normalize_document(raw: &str) -> Option<String> {
    let words: Vec<&str> = raw
        .split(|c: char| c.is_whitespace() || c == ':')
        .filter(|w| !w.is_empty())
        .skip_while(|w| !w.chars().any(|c| c.is_ascii_digit()))
        .collect();

    let cleaned: String = words
        .concat()
        .chars()
        .filter(|c| *c != '.' && *c != '-')
        .collect::<String>()
        .to_uppercase();

    let valid = (DOCUMENT_MIN_LEN..=DOCUMENT_MAX_LEN).contains(&cleaned.len())
        && cleaned.chars().all(|c| c.is_ascii_alphanumeric())
        && cleaned.chars().any(|c| c.is_ascii_digit());

    valid.then_some(cleaned)
}

/// First document in free text.
///
/// A bare token counts only when it is an 8-digit DNI; anything else must
/// follow a document label, so phone numbers in the same message are skipped.
fn find_document(text: &str) -> Option<String> {
    let tokens: Vec<&str> = DOCUMENT_TOKEN.find_iter(text).map(|m| m.as_str()).collect();

    tokens.iter().enumerate().find_map(|(i, token)| {
        let document = normalize_document(token)?;
        let is_dni = document.len() == DNI_LEN && document.chars().all(|c| c.is_ascii_digit());
        let labelled = tokens[i.saturating_sub(LABEL_LOOKBACK)..i]
            .iter()
            .any(|w| DOCUMENT_LABELS.contains(&w.to_lowercase().as_str()));
        (is_dni || labelled).then_some(document)
    })
}

/// Extract a JSON object from LLM output (handles markdown wrapping).
fn extract_json_object(text: &str) -> String {
    let trimmed = text.trim();

    if trimmed.starts_with('{') {
        return trimmed.to_string();
    }

    if let Some(start) = trimmed.find("```json") {
        let after = &trimmed[start + 7..];
        if let Some(end) = after.find("```") {
            return after[..end].trim().to_string();
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && end > start
    {
        return trimmed[start..=end].to_string();
    }

    trimmed.to_string()
}
