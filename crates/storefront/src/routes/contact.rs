//! Contact form route handler.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use suds_core::ContactRequestId;

use crate::error::AppError;
use crate::extract::{InputFields, ValidForm};
use crate::services::contact::{ContactForm, ContactService};
use crate::state::AppState;

/// Contact form data.
#[derive(Debug, Deserialize)]
pub struct ContactFormData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl InputFields for ContactFormData {
    const FIELDS: &'static [&'static str] = &["name", "email", "subject", "message"];
}

/// Contact form response.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub id: ContactRequestId,
    pub message: &'static str,
}

/// Record a support request.
///
/// POST /contact
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    ValidForm(form): ValidForm<ContactFormData>,
) -> Result<(StatusCode, Json<ContactResponse>), AppError> {
    let stored = ContactService::new(state.store())
        .submit(&ContactForm {
            name: form.name,
            email: form.email,
            subject: form.subject,
            message: form.message,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ContactResponse {
            id: stored.id,
            message: "Thanks for getting in touch. We'll reply soon.",
        }),
    ))
}
