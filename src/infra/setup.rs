use std::fs::File;
use std::sync::Arc;

use secrecy::ExposeSecret;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::http::app_state::AppState,
    application::ports::payment_processor::PaymentProcessorPort,
    application::use_cases::{
        billing::BillingUseCases,
        webhook::{AccountStoreTrait, WebhookUseCases},
    },
    infra::{config::AppConfig, postgres_persistence, razorpay_client::RazorpayClient},
};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let postgres_arc = Arc::new(postgres_persistence(&config.database_url).await?);
    let store_arc = postgres_arc as Arc<dyn AccountStoreTrait>;

    let razorpay = RazorpayClient::new(
        config.razorpay_key_id.clone(),
        config.razorpay_key_secret.expose_secret().to_string(),
        config.processor_timeout_secs,
    )?;
    let processor_arc = Arc::new(razorpay) as Arc<dyn PaymentProcessorPort>;

    let webhook_use_cases = WebhookUseCases::new(store_arc.clone());
    let billing_use_cases = BillingUseCases::new(
        store_arc,
        processor_arc,
        config.razorpay_key_secret.expose_secret().to_string(),
    );

    Ok(AppState {
        config: Arc::new(config),
        webhook_use_cases: Arc::new(webhook_use_cases),
        billing_use_cases: Arc::new(billing_use_cases),
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "booklings_billing=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .pretty();

    // File (structured JSON logs)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
