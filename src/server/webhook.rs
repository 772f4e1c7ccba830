//! WhatsApp webhook endpoints: verification handshake and message intake.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::channels::webhook::WebhookNotification;
use crate::context::AppContext;
use crate::error::PipelineError;
use crate::server::signature::{self, SIGNATURE_HEADER};

/// Query string of the subscription handshake.
#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// GET /webhook
///
/// Echoes `hub.challenge` when the mode is `subscribe` and the token matches.
pub async fn verify(
    State(ctx): State<AppContext>,
    Query(params): Query<VerifyParams>,
) -> Response {
    let token_matches = params
        .verify_token
        .as_deref()
        .is_some_and(|t| t == ctx.secrets.verify_token.expose_secret());

    if params.mode.as_deref() == Some("subscribe") && token_matches {
        info!("Webhook verified");
        (StatusCode::OK, params.challenge.unwrap_or_default()).into_response()
    } else {
        warn!(mode = ?params.mode, "Webhook verification rejected");
        StatusCode::FORBIDDEN.into_response()
    }
}

/// POST /webhook
///
/// Acknowledges immediately; each extracted message is dispatched on its own task.
pub async fn receive(State(ctx): State<AppContext>, headers: HeaderMap, body: Bytes) -> StatusCode {
    if let Some(secret) = &ctx.secrets.app_secret {
        let header = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
        if !signature::verify(secret.expose_secret().as_bytes(), &body, header) {
            warn!("Webhook delivery with invalid signature");
            return StatusCode::UNAUTHORIZED;
        }
    }

    let notification = match parse_notification(&body) {
        Ok(notification) => notification,
        Err(e) => {
            warn!(error = %e, "Ignoring unparseable webhook delivery");
            return StatusCode::OK;
        }
    };

    let messages = notification.into_inbound_messages();
    if messages.is_empty() {
        debug!("Webhook delivery without messages (status update)");
        return StatusCode::OK;
    }

    info!(count = messages.len(), "Webhook delivery accepted");
    ctx.pipeline.spawn_all(messages);
    StatusCode::OK
}

fn parse_notification(body: &[u8]) -> Result<WebhookNotification, PipelineError> {
    serde_json::from_slice(body).map_err(|e| PipelineError::InvalidPayload(e.to_string()))
}
