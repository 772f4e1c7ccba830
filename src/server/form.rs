//! Enrollment form intake from the landing page.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::context::AppContext;
use crate::pipeline::replies;
use crate::pipeline::types::Notification;
use crate::store::NewPerson;

/// Country prefix added to bare 9-digit Peruvian mobile numbers.
const COUNTRY_PREFIX: &str = "51";
const LOCAL_NUMBER_LEN: usize = 9;

/// Landing-page form payload. Field names follow the form.
#[derive(Debug, Deserialize)]
pub struct EnrollmentForm {
    pub nombres: String,
    pub apellidos: String,
    pub celular: String,
    #[serde(default)]
    pub correo: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    pub documento: String,
}

impl EnrollmentForm {
    pub fn into_new_person(self) -> NewPerson {
        NewPerson {
            first_names: self.nombres.trim().to_string(),
            last_names: self.apellidos.trim().to_string(),
            whatsapp_number: normalize_phone(&self.celular),
            email: self.correo.filter(|c| !c.trim().is_empty()),
            status: self.status,
            document: self.documento.trim().to_string(),
        }
    }
}

/// Prefix a bare 9-digit local number with the country code.
pub fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() == LOCAL_NUMBER_LEN && trimmed.chars().all(|c| c.is_ascii_digit()) {
        format!("{COUNTRY_PREFIX}{trimmed}")
    } else {
        trimmed.to_string()
    }
}

/// POST /form/inscripciones
pub async fn submit(
    State(ctx): State<AppContext>,
    Json(form): Json<EnrollmentForm>,
) -> impl IntoResponse {
    let person = form.into_new_person();

    let id = match ctx.enrollments.insert_person(&person).await {
        Ok(id) => id,
        Err(e) => {
            error!(error = %e, "Failed to store enrollment");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"ok": false, "error": "Could not store enrollment"})),
            );
        }
    };
    info!(id = %id, to = %person.whatsapp_number, "Enrollment stored");

    let congratulation = Notification::Text(replies::enrollment_received(&person.first_names));
    if let Err(e) = ctx.notifier.send(&person.whatsapp_number, &congratulation).await {
        warn!(id = %id, error = %e, "Enrollment stored but congratulation not delivered");
    }

    (StatusCode::OK, Json(serde_json::json!({"ok": true, "id": id})))
}
