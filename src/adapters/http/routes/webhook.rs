//! Inbound payment processor notifications.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::post,
};
use secrecy::ExposeSecret;
use serde_json::json;

use crate::adapters::http::app_state::AppState;
use crate::app_error::{AppError, AppResult};
use crate::application::normalizer::normalize;
use crate::application::signature::verify_webhook_signature;

const SIGNATURE_HEADER: &str = "x-razorpay-signature";

pub fn router() -> Router<AppState> {
    Router::new().route("/webhook", post(handle_webhook))
}

/// POST /api/webhook
///
/// Every acknowledged delivery gets `{"success": true}`, including
/// duplicates and event types we do not act on; the processor only needs to
/// know whether to redeliver. The body must stay raw until the signature
/// is checked.
async fn handle_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::InvalidSignature)?;

    if !verify_webhook_signature(
        &body,
        signature,
        app_state.config.razorpay_webhook_secret.expose_secret(),
    ) {
        return Err(AppError::InvalidSignature);
    }

    let event_body: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::InvalidInput(format!("Invalid webhook payload: {}", e)))?;

    let event = normalize(&event_body)?;
    app_state.webhook_use_cases.process_event(&event).await?;

    Ok(Json(json!({ "success": true })))
}
