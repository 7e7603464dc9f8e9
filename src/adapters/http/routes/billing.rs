//! Client-facing billing endpoints.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde_json::json;

use crate::adapters::http::app_state::AppState;
use crate::app_error::AppResult;
use crate::application::ports::payment_processor::CreatePlanInput;
use crate::application::use_cases::billing::{
    CancelSubscriptionRequest, CreateSubscriptionRequest, VerifyPaymentRequest,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/plans", post(create_plan))
        .route("/subscriptions", post(create_subscription))
        .route("/subscriptions/cancel", post(cancel_subscription))
        .route("/verify", post(verify_payment))
}

/// POST /api/billing/plans
async fn create_plan(
    State(app_state): State<AppState>,
    Json(input): Json<CreatePlanInput>,
) -> AppResult<impl IntoResponse> {
    let plan = app_state.billing_use_cases.create_plan(input).await?;
    Ok(Json(plan))
}

/// POST /api/billing/subscriptions
async fn create_subscription(
    State(app_state): State<AppState>,
    Json(request): Json<CreateSubscriptionRequest>,
) -> AppResult<impl IntoResponse> {
    let response = app_state
        .billing_use_cases
        .create_subscription(request)
        .await?;
    Ok(Json(response))
}

/// POST /api/billing/subscriptions/cancel
async fn cancel_subscription(
    State(app_state): State<AppState>,
    Json(request): Json<CancelSubscriptionRequest>,
) -> AppResult<impl IntoResponse> {
    app_state
        .billing_use_cases
        .cancel_subscription(request)
        .await?;
    Ok(Json(json!({ "success": true })))
}

/// POST /api/billing/verify
async fn verify_payment(
    State(app_state): State<AppState>,
    Json(request): Json<VerifyPaymentRequest>,
) -> AppResult<impl IntoResponse> {
    app_state.billing_use_cases.verify_payment(request).await?;
    Ok(Json(json!({ "success": true })))
}
