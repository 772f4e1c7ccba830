//! Error types for the EduBot dispatcher.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

/// Intent classification failures. Always recovered as an unrecognized intent.
#[derive(Debug, thiserror::Error)]
pub enum ClassificationError {
    #[error("Model call failed: {0}")]
    Model(#[from] LlmError),

    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Model output is not a JSON object: {0}")]
    Malformed(String),

    #[error("Intent label outside the vocabulary: '{0}'")]
    UnknownLabel(String),
}

/// Payment lookup failures. Surfaced to the user as a retry-later reply.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Data store error: {0}")]
    Store(#[from] DatabaseError),

    #[error("Data store query timed out after {0:?}")]
    Timeout(Duration),
}

/// Outbound delivery failures on the messaging platform.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Request to {platform} failed: {reason}")]
    Transport { platform: String, reason: String },

    #[error("{platform} rejected the message ({status}): {body}")]
    Rejected {
        platform: String,
        status: u16,
        body: String,
    },
}

/// Pipeline-related errors.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Delivery failed after {delivered} of {planned} sends: {source}")]
    Delivery {
        delivered: usize,
        planned: usize,
        #[source]
        source: DeliveryError,
    },

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
