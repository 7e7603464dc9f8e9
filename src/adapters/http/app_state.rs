use std::sync::Arc;

use crate::{
    application::use_cases::billing::BillingUseCases,
    application::use_cases::webhook::WebhookUseCases,
    infra::config::AppConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub webhook_use_cases: Arc<WebhookUseCases>,
    pub billing_use_cases: Arc<BillingUseCases>,
}
