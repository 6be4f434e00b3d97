//! Contact form route handler.
//!
//! The home page posts the form as JSON and shows the returned message
//! inline.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use nexus_core::Email;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::services::ContactMessage;
use crate::state::AppState;

/// Contact form data.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company: String,
    pub message: String,
}

/// Response for form submission.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
}

fn reply(status: StatusCode, success: bool, message: &str) -> (StatusCode, Json<ContactResponse>) {
    (
        status,
        Json(ContactResponse {
            success,
            message: message.to_string(),
        }),
    )
}

/// Send a contact message.
///
/// POST /contact
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn submit(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> impl IntoResponse {
    if form.first_name.trim().is_empty() || form.message.trim().is_empty() {
        return reply(
            StatusCode::BAD_REQUEST,
            false,
            "Name and message are required.",
        );
    }

    if Email::parse(&form.email).is_err() {
        return reply(
            StatusCode::BAD_REQUEST,
            false,
            "Please enter a valid email address.",
        );
    }

    let Some(email) = state.email() else {
        tracing::error!("EmailJS not configured, contact message dropped");
        return reply(
            StatusCode::SERVICE_UNAVAILABLE,
            false,
            "Sorry, there was an error sending your message. Please try again.",
        );
    };

    let message = ContactMessage {
        first_name: form.first_name,
        last_name: form.last_name,
        email: form.email,
        phone: form.phone,
        company: form.company,
        message: form.message,
    };

    match email.send_contact(&message).await {
        Ok(()) => {
            tracing::info!("Contact message sent");
            reply(
                StatusCode::OK,
                true,
                "Thank you! Your message has been sent successfully. We'll get back to you soon.",
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to send contact message");
            reply(
                StatusCode::BAD_GATEWAY,
                false,
                "Sorry, there was an error sending your message. Please try again.",
            )
        }
    }
}
