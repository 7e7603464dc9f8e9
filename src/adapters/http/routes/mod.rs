pub mod billing;
pub mod webhook;

use axum::Router;

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/billing", billing::router())
        .merge(webhook::router())
}
