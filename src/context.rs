//! Application context — the shared collaborators behind every request.

use std::path::Path;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use crate::channels::platform::MessagingPlatform;
use crate::channels::whatsapp::WhatsAppChannel;
use crate::config::{AppConfig, StoreLocation};
use crate::error::Result;
use crate::llm::create_provider;
use crate::llm::provider::LlmProvider;
use crate::pipeline::{
    IntentClassifier, IntentDispatcher, MessagePipeline, Notifier, RenewalResolver,
};
use crate::store::{EnrollmentStore, LibSqlBackend, PaymentStore};

/// Webhook verification secrets.
#[derive(Clone)]
pub struct WebhookSecrets {
    pub verify_token: SecretString,
    /// App secret for `X-Hub-Signature-256`. Signatures are not checked when unset.
    pub app_secret: Option<SecretString>,
}

/// Everything the HTTP layer needs. Cheap to clone.
#[derive(Clone)]
pub struct AppContext {
    pub pipeline: Arc<MessagePipeline>,
    pub enrollments: Arc<dyn EnrollmentStore>,
    pub notifier: Notifier,
    pub secrets: WebhookSecrets,
}

/// Collaborators used to assemble an `AppContext`.
pub struct Collaborators {
    pub llm: Arc<dyn LlmProvider>,
    pub payments: Arc<dyn PaymentStore>,
    pub enrollments: Arc<dyn EnrollmentStore>,
    pub platform: Arc<dyn MessagingPlatform>,
}

impl AppContext {
    /// Open the store, build the LLM and WhatsApp clients, and wire the pipeline.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let store = Arc::new(open_store(&config.store).await?);
        let llm = create_provider(&config.llm)?;
        let platform: Arc<dyn MessagingPlatform> = Arc::new(WhatsAppChannel::new(&config.whatsapp)?);

        info!(
            model = llm.model_name(),
            platform = platform.name(),
            "Application context ready"
        );

        Ok(Self::from_parts(
            config,
            Collaborators {
                llm,
                payments: Arc::clone(&store) as Arc<dyn PaymentStore>,
                enrollments: store as Arc<dyn EnrollmentStore>,
                platform,
            },
        ))
    }

    /// Wire the pipeline around already-built collaborators.
    pub fn from_parts(config: &AppConfig, parts: Collaborators) -> Self {
        let notifier = Notifier::new(parts.platform);
        let classifier = IntentClassifier::new(parts.llm, config.llm_timeout);
        let resolver = Arc::new(RenewalResolver::new(
            parts.payments,
            config.replies.clone(),
            config.db_timeout,
        ));
        let dispatcher = IntentDispatcher::new(resolver, notifier.clone(), config.replies.clone());

        Self {
            pipeline: Arc::new(MessagePipeline::new(classifier, dispatcher)),
            enrollments: parts.enrollments,
            notifier,
            secrets: WebhookSecrets {
                verify_token: config.whatsapp.verify_token.clone(),
                app_secret: config.whatsapp.app_secret.clone(),
            },
        }
    }
}

/// Open the configured libSQL store.
pub async fn open_store(location: &StoreLocation) -> Result<LibSqlBackend> {
    let backend = match location {
        StoreLocation::Local(path) => LibSqlBackend::new_local(Path::new(path)).await?,
        StoreLocation::Remote { url, auth_token } => {
            LibSqlBackend::new_remote(url, auth_token.expose_secret()).await?
        }
    };
    Ok(backend)
}
