/**
 * Contact Routes
 * Contact-form email relay and the site-wide page-view counter
 */
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, OrInternal};
use crate::extract::AppJson;
use crate::mail::ContactMessage;
use crate::routes::MessageResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ViewCountResponse {
    pub count: i64,
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl ContactRequest {
    fn validate(self) -> Result<ContactMessage, AppError> {
        match (
            required(self.name),
            required(self.email),
            required(self.message),
        ) {
            (Some(name), Some(email), Some(message)) => Ok(ContactMessage {
                name,
                email,
                message,
            }),
            _ => Err(AppError::validation("All fields are required")),
        }
    }
}

/// POST /api/contact
pub async fn send_message(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ContactRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let message = payload.validate()?;

    state
        .mailer
        .send(&message)
        .await
        .or_internal("Failed to send message")?;

    tracing::info!("Contact message relayed from {}", message.email);
    Ok(Json(MessageResponse::new("Message sent successfully")))
}

/// POST /api/contact/view
pub async fn increment_view(
    State(state): State<AppState>,
) -> Result<Json<ViewCountResponse>, AppError> {
    let count = state
        .store
        .increment_views()
        .await
        .or_internal("Failed to update view count")?;
    Ok(Json(ViewCountResponse { count }))
}

/// GET /api/contact/views
pub async fn view_count(State(state): State<AppState>) -> Result<Json<ViewCountResponse>, AppError> {
    let count = state
        .store
        .view_count()
        .await
        .or_internal("Failed to fetch view count")?;
    Ok(Json(ViewCountResponse { count }))
}
