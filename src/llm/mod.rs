//! LLM integration.
//!
//! Supports:
//! - **OpenAI**: Responses API via rig-core (default backend)
//! - **Anthropic**: Direct API access via rig-core
//!
//! Uses the rig-core crate for HTTP transport and the `RigAdapter` to bridge
//! rig's `CompletionModel` trait to our `LlmProvider` trait.

pub mod provider;
mod rig_adapter;

pub use provider::*;
pub use rig_adapter::RigAdapter;

use std::sync::Arc;

use rig::client::CompletionClient;
use secrecy::ExposeSecret;
use serde_json::{Value, json};

use crate::error::LlmError;
use crate::pipeline::types::Intent;

/// Name of the structured-output schema sent to OpenAI.
const CLASSIFICATION_SCHEMA_NAME: &str = "clasificacion";

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    Anthropic,
    OpenAi,
}

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: secrecy::SecretString,
    pub model: String,
    /// Overrides the OpenAI API root (proxies, gateways).
    pub base_url: Option<String>,
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    match config.backend {
        LlmBackend::Anthropic => create_anthropic_provider(config),
        LlmBackend::OpenAi => create_openai_provider(config),
    }
}

/// Responses API `text.format` for classifier calls.
///
/// Strict mode requires every property listed in `required` and no extra
/// keys, so an absent document is an explicit `null`.
pub fn classification_format_params() -> Value {
    let labels: Vec<&str> = Intent::VOCABULARY.iter().map(|i| i.label()).collect();
    json!({
        "text": {
            "format": {
                "type": "json_schema",
                "name": CLASSIFICATION_SCHEMA_NAME,
                "strict": true,
                "schema": {
                    "type": "object",
                    "properties": {
                        "tipo_mensaje": { "type": "string", "enum": labels },
                        "documento": { "type": ["string", "null"] }
                    },
                    "required": ["tipo_mensaje", "documento"],
                    "additionalProperties": false
                }
            }
        }
    })
}

fn create_anthropic_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::anthropic;

    let client: rig::client::Client<anthropic::client::AnthropicExt> =
        anthropic::Client::new(config.api_key.expose_secret()).map_err(|e| {
            LlmError::RequestFailed {
                provider: "anthropic".to_string(),
                reason: format!("Failed to create Anthropic client: {}", e),
            }
        })?;

    let model = client.completion_model(&config.model);
    tracing::info!("Using Anthropic (model: {})", config.model);
    // Anthropic has no JSON response mode; the classifier prompt carries the constraint.
    Ok(Arc::new(RigAdapter::new(model, &config.model)))
}

fn create_openai_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::openai;

    let mut builder: openai::ClientBuilder =
        openai::Client::builder().api_key(config.api_key.expose_secret());
    if let Some(ref base_url) = config.base_url {
        builder = builder.base_url(base_url);
    }
    let client: openai::Client = builder.build().map_err(|e| LlmError::RequestFailed {
        provider: "openai".to_string(),
        reason: format!("Failed to create OpenAI client: {}", e),
    })?;

    let model = client.completion_model(&config.model);
    tracing::info!(
        base_url = config.base_url.as_deref().unwrap_or("default"),
        "Using OpenAI (model: {})",
        config.model
    );
    Ok(Arc::new(
        RigAdapter::new(model, &config.model).with_json_mode_params(classification_format_params()),
    ))
}
