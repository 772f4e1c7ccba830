//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};

/// Default Graph API host for the WhatsApp Cloud API.
pub const DEFAULT_GRAPH_BASE: &str = "https://graph.facebook.com";

/// Default Graph API version.
pub const DEFAULT_GRAPH_VERSION: &str = "v23.0";

/// Default classification model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// WhatsApp Cloud API settings.
#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    /// Permanent or system-user access token.
    pub access_token: SecretString,
    /// Business phone number id that sends replies.
    pub phone_number_id: String,
    /// Token echoed back during the webhook verification handshake.
    pub verify_token: SecretString,
    /// App secret used to check `X-Hub-Signature-256`. Unset disables the check.
    pub app_secret: Option<SecretString>,
    pub api_base: String,
    pub api_version: String,
    pub send_timeout: Duration,
}

/// Where the payment records live.
#[derive(Debug, Clone)]
pub enum StoreLocation {
    /// Local libSQL file.
    Local(String),
    /// Remote libSQL server (sqld / Turso).
    Remote { url: String, auth_token: SecretString },
}

/// Links and media used in the canned replies.
#[derive(Debug, Clone)]
pub struct ReplyConfig {
    pub enrollment_url: String,
    pub renewal_url: String,
    pub payment_images: [String; 2],
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            enrollment_url: "https://inscripciones.academiapreuniversitariaelite.com/".to_string(),
            renewal_url: "https://inscripciones.academiapreuniversitariaelite.com/renovaciones"
                .to_string(),
            payment_images: [
                "https://inscripciones.academiapreuniversitariaelite.com/images/mediopagoelite1.jpeg"
                    .to_string(),
                "https://inscripciones.academiapreuniversitariaelite.com/images/mediopagoelite2.jpeg"
                    .to_string(),
            ],
        }
    }
}

/// Full service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub whatsapp: WhatsAppConfig,
    pub llm: LlmConfig,
    pub llm_timeout: Duration,
    pub store: StoreLocation,
    pub db_timeout: Duration,
    pub replies: ReplyConfig,
}

impl AppConfig {
    /// Build the configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };

        let whatsapp = WhatsAppConfig {
            access_token: SecretString::from(required("WHATSAPP_TOKEN")?),
            phone_number_id: required("PHONE_NUMBER_ID")?,
            verify_token: SecretString::from(required("VERIFY_TOKEN")?),
            app_secret: lookup("WHATSAPP_APP_SECRET")
                .filter(|s| !s.is_empty())
                .map(SecretString::from),
            api_base: lookup("WHATSAPP_API_BASE").unwrap_or_else(|| DEFAULT_GRAPH_BASE.to_string()),
            api_version: lookup("WHATSAPP_API_VERSION")
                .unwrap_or_else(|| DEFAULT_GRAPH_VERSION.to_string()),
            send_timeout: parse_secs(&lookup, "EDUBOT_SEND_TIMEOUT_SECS", 10)?,
        };

        let backend = match lookup("LLM_BACKEND").as_deref() {
            None | Some("openai") => LlmBackend::OpenAi,
            Some("anthropic") => LlmBackend::Anthropic,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "LLM_BACKEND".into(),
                    message: format!("expected 'openai' or 'anthropic', got '{other}'"),
                });
            }
        };
        let key_var = match backend {
            LlmBackend::OpenAi => "OPENAI_API_KEY",
            LlmBackend::Anthropic => "ANTHROPIC_API_KEY",
        };
        let llm = LlmConfig {
            backend,
            api_key: SecretString::from(required(key_var)?),
            model: lookup("EDUBOT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: lookup("OPENAI_BASE_URL").filter(|s| !s.is_empty()),
        };

        let store = match lookup("EDUBOT_DB_URL") {
            Some(url) => StoreLocation::Remote {
                url,
                auth_token: SecretString::from(lookup("EDUBOT_DB_TOKEN").unwrap_or_default()),
            },
            None => StoreLocation::Local(
                lookup("EDUBOT_DB_PATH").unwrap_or_else(|| "./data/edubot.db".to_string()),
            ),
        };

        let defaults = ReplyConfig::default();
        let replies = ReplyConfig {
            enrollment_url: lookup("EDUBOT_ENROLLMENT_URL").unwrap_or(defaults.enrollment_url),
            renewal_url: lookup("EDUBOT_RENEWAL_URL").unwrap_or(defaults.renewal_url),
            payment_images: [
                lookup("EDUBOT_PAYMENT_IMAGE_1")
                    .unwrap_or_else(|| defaults.payment_images[0].clone()),
                lookup("EDUBOT_PAYMENT_IMAGE_2")
                    .unwrap_or_else(|| defaults.payment_images[1].clone()),
            ],
        };

        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT".into(),
                message: format!("'{raw}' is not a valid port"),
            })?,
            None => 3000,
        };

        Ok(Self {
            port,
            whatsapp,
            llm,
            llm_timeout: parse_secs(&lookup, "EDUBOT_LLM_TIMEOUT_SECS", 20)?,
            store,
            db_timeout: parse_secs(&lookup, "EDUBOT_DB_TIMEOUT_SECS", 5)?,
            replies,
        })
    }
}

fn parse_secs<F>(lookup: &F, key: &str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(Duration::from_secs(default)),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("expected a positive number of seconds, got '{raw}'"),
            }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const BASE: &[(&str, &str)] = &[
        ("WHATSAPP_TOKEN", "wa-token"),
        ("PHONE_NUMBER_ID", "1234567890"),
        ("VERIFY_TOKEN", "verify-me"),
        ("OPENAI_API_KEY", "sk-test"),
    ];

    #[test]
    fn defaults_apply() {
        let config = AppConfig::from_lookup(env(BASE)).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.whatsapp.api_version, "v23.0");
        assert_eq!(config.whatsapp.api_base, DEFAULT_GRAPH_BASE);
        assert!(config.whatsapp.app_secret.is_none());
        assert_eq!(config.llm.backend, LlmBackend::OpenAi);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert!(config.llm.base_url.is_none());
        assert_eq!(config.llm_timeout, Duration::from_secs(20));
        assert_eq!(config.db_timeout, Duration::from_secs(5));
        assert!(matches!(config.store, StoreLocation::Local(ref p) if p == "./data/edubot.db"));
    }

    #[test]
    fn missing_token_is_reported() {
        let err = AppConfig::from_lookup(env(&[("PHONE_NUMBER_ID", "1")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "WHATSAPP_TOKEN"));
    }

    #[test]
    fn anthropic_backend_requires_its_own_key() {
        let mut pairs = BASE.to_vec();
        pairs.push(("LLM_BACKEND", "anthropic"));
        let err = AppConfig::from_lookup(env(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "ANTHROPIC_API_KEY"));

        pairs.push(("ANTHROPIC_API_KEY", "sk-ant"));
        let config = AppConfig::from_lookup(env(&pairs)).unwrap();
        assert_eq!(config.llm.backend, LlmBackend::Anthropic);
        assert_eq!(config.llm.api_key.expose_secret(), "sk-ant");
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let mut pairs = BASE.to_vec();
        pairs.push(("LLM_BACKEND", "llama"));
        let err = AppConfig::from_lookup(env(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "LLM_BACKEND"));
    }

    #[test]
    fn remote_store_and_overrides() {
        let mut pairs = BASE.to_vec();
        pairs.extend([
            ("EDUBOT_DB_URL", "libsql://edubot.turso.io"),
            ("EDUBOT_DB_TOKEN", "db-token"),
            ("PORT", "8081"),
            ("EDUBOT_RENEWAL_URL", "https://pay.example/renovar"),
            ("WHATSAPP_APP_SECRET", "shh"),
            ("OPENAI_BASE_URL", "http://llm-gateway.internal/v1"),
        ]);
        let config = AppConfig::from_lookup(env(&pairs)).unwrap();
        assert_eq!(config.port, 8081);
        assert_eq!(
            config.llm.base_url.as_deref(),
            Some("http://llm-gateway.internal/v1")
        );
        assert_eq!(config.replies.renewal_url, "https://pay.example/renovar");
        assert!(config.whatsapp.app_secret.is_some());
        match config.store {
            StoreLocation::Remote { url, auth_token } => {
                assert_eq!(url, "libsql://edubot.turso.io");
                assert_eq!(auth_token.expose_secret(), "db-token");
            }
            other => panic!("Expected remote store, got {:?}", other),
        }
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let mut pairs = BASE.to_vec();
        pairs.push(("EDUBOT_DB_TIMEOUT_SECS", "0"));
        assert!(AppConfig::from_lookup(env(&pairs)).is_err());
    }
}
