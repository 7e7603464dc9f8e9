//! Builders and signing helpers shared by the test suites.

use std::sync::Arc;

use axum::http::HeaderValue;
use hmac::{Hmac, Mac};
use secrecy::SecretString;
use sha2::Sha256;

use crate::adapters::http::app_state::AppState;
use crate::application::use_cases::{billing::BillingUseCases, webhook::WebhookUseCases};
use crate::domain::entities::webhook::{EventKind, NormalizedEvent, PaymentPayload, SubscriptionPayload};
use crate::infra::config::AppConfig;
use crate::test_utils::processor_mocks::MockPaymentProcessor;
use crate::test_utils::store_mocks::InMemoryAccountStore;

pub const TEST_KEY_SECRET: &str = "rzp_test_key_secret";
pub const TEST_WEBHOOK_SECRET: &str = "whsec_test";

fn hmac_hex(key: &str, message: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(key.as_bytes()).unwrap();
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Signs a webhook body the way the processor would.
pub fn sign_body(body: &str, secret: &str) -> String {
    hmac_hex(secret, body.as_bytes())
}

/// Signs a checkout payment result the way the processor would.
pub fn sign_payment(payment_id: &str, subscription_id: &str, key_secret: &str) -> String {
    hmac_hex(key_secret, format!("{}|{}", payment_id, subscription_id).as_bytes())
}

pub fn activation_body(account_id: &str, subscription_id: &str, payment_id: &str) -> String {
    serde_json::json!({
        "event": "subscription.activated",
        "payload": {
            "subscription": {
                "entity": {
                    "id": subscription_id,
                    "current_end": 1_737_600_000,
                    "notes": { "userId": account_id }
                }
            },
            "payment": {
                "entity": { "id": payment_id, "amount": 4999 }
            }
        }
    })
    .to_string()
}

pub fn event_of_kind(kind: EventKind, account_id: &str, payment_id: &str) -> NormalizedEvent {
    NormalizedEvent {
        kind,
        raw_type: "test.event".to_string(),
        account_id: account_id.to_string(),
        subscription: SubscriptionPayload {
            id: Some("sub_1".to_string()),
            current_end: Some(1_737_600_000),
        },
        payment: PaymentPayload {
            id: Some(payment_id.to_string()),
            amount: Some(4999),
            error_description: None,
        },
    }
}

pub fn charged_event(account_id: &str, payment_id: &str) -> NormalizedEvent {
    event_of_kind(EventKind::Charged, account_id, payment_id)
}

pub struct TestAppStateBuilder {
    webhook_secret: String,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
        }
    }

    pub fn webhook_secret(mut self, secret: &str) -> Self {
        self.webhook_secret = secret.to_string();
        self
    }

    pub fn build(
        self,
    ) -> (
        AppState,
        Arc<InMemoryAccountStore>,
        Arc<MockPaymentProcessor>,
    ) {
        let store = Arc::new(InMemoryAccountStore::new());
        let processor = Arc::new(MockPaymentProcessor::new());

        let config = AppConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            database_url: String::new(),
            cors_origin: HeaderValue::from_static("*"),
            razorpay_key_id: "rzp_test_key".to_string(),
            razorpay_key_secret: SecretString::new(TEST_KEY_SECRET.into()),
            razorpay_webhook_secret: SecretString::new(self.webhook_secret.into()),
            processor_timeout_secs: 10,
        };

        let webhook_use_cases = WebhookUseCases::new(store.clone());
        let billing_use_cases = BillingUseCases::new(
            store.clone(),
            processor.clone(),
            TEST_KEY_SECRET.to_string(),
        );

        let app_state = AppState {
            config: Arc::new(config),
            webhook_use_cases: Arc::new(webhook_use_cases),
            billing_use_cases: Arc::new(billing_use_cases),
        };
        (app_state, store, processor)
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
