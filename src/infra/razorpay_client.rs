//! Razorpay REST client implementing the payment processor port.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::app_error::{AppError, AppResult};
use crate::application::ports::payment_processor::{
    CreatePlanInput, CreateSubscriptionInput, PaymentProcessorPort, ProcessorPlan,
    ProcessorSubscription,
};

const RAZORPAY_API_BASE: &str = "https://api.razorpay.com/v1";

#[derive(Clone)]
pub struct RazorpayClient {
    client: Client,
    key_id: String,
    key_secret: String,
}

impl RazorpayClient {
    pub fn new(key_id: String, key_secret: String, timeout_secs: u64) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            key_id,
            key_secret,
        })
    }

    fn auth_header(&self) -> String {
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", self.key_id, self.key_secret));
        format!("Basic {}", encoded)
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> AppResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::PaymentProvider(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "Razorpay API error");

            if let Ok(error) = serde_json::from_str::<RazorpayErrorResponse>(&body) {
                return Err(AppError::PaymentProvider(
                    error
                        .error
                        .description
                        .unwrap_or_else(|| format!("Razorpay API error: {}", status)),
                ));
            }

            return Err(AppError::PaymentProvider(format!(
                "Razorpay API error: {} - {}",
                status, body
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(body = %body, error = %e, "Failed to parse Razorpay response");
            AppError::PaymentProvider(format!("Failed to parse Razorpay response: {}", e))
        })
    }
}

#[async_trait]
impl PaymentProcessorPort for RazorpayClient {
    async fn create_plan(&self, input: &CreatePlanInput) -> AppResult<ProcessorPlan> {
        let payload = json!({
            "period": input.period,
            "interval": input.interval,
            "item": {
                "name": input.name,
                "amount": input.amount,
                "currency": input.currency,
            },
        });

        let response = self
            .client
            .post(format!("{}/plans", RAZORPAY_API_BASE))
            .header("Authorization", self.auth_header())
            .json(&payload)
            .send()
            .await
            .map_err(request_error)?;

        let plan: RazorpayPlan = self.handle_response(response).await?;
        Ok(ProcessorPlan {
            id: plan.id,
            period: plan.period,
            interval: plan.interval,
            item_name: plan.item.name,
            amount: plan.item.amount,
            currency: plan.item.currency,
        })
    }

    async fn create_subscription(
        &self,
        input: &CreateSubscriptionInput,
    ) -> AppResult<ProcessorSubscription> {
        let mut notes = json!({ "userId": input.account_id });
        if let Some(ref email) = input.account_email {
            notes["userEmail"] = json!(email);
        }
        if let Some(ref name) = input.account_name {
            notes["userName"] = json!(name);
        }

        let payload = json!({
            "plan_id": input.plan_id,
            "total_count": input.total_count,
            "quantity": 1,
            "customer_notify": 1,
            "notes": notes,
        });

        let response = self
            .client
            .post(format!("{}/subscriptions", RAZORPAY_API_BASE))
            .header("Authorization", self.auth_header())
            .json(&payload)
            .send()
            .await
            .map_err(request_error)?;

        let subscription: RazorpaySubscription = self.handle_response(response).await?;
        Ok(subscription.into())
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        at_cycle_end: bool,
    ) -> AppResult<ProcessorSubscription> {
        let payload = json!({ "cancel_at_cycle_end": if at_cycle_end { 1 } else { 0 } });

        let response = self
            .client
            .post(format!(
                "{}/subscriptions/{}/cancel",
                RAZORPAY_API_BASE, subscription_id
            ))
            .header("Authorization", self.auth_header())
            .json(&payload)
            .send()
            .await
            .map_err(request_error)?;

        let subscription: RazorpaySubscription = self.handle_response(response).await?;
        Ok(subscription.into())
    }

    async fn fetch_subscription(
        &self,
        subscription_id: &str,
    ) -> AppResult<ProcessorSubscription> {
        let response = self
            .client
            .get(format!(
                "{}/subscriptions/{}",
                RAZORPAY_API_BASE, subscription_id
            ))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(request_error)?;

        let subscription: RazorpaySubscription = self.handle_response(response).await?;
        Ok(subscription.into())
    }
}

fn request_error(e: reqwest::Error) -> AppError {
    AppError::PaymentProvider(format!("Razorpay request failed: {}", e))
}

#[derive(Deserialize)]
struct RazorpaySubscription {
    id: String,
    status: String,
    current_end: Option<i64>,
    short_url: Option<String>,
    plan_id: Option<String>,
}

impl From<RazorpaySubscription> for ProcessorSubscription {
    fn from(s: RazorpaySubscription) -> Self {
        ProcessorSubscription {
            id: s.id,
            status: s.status,
            current_end: s.current_end,
            short_url: s.short_url,
            plan_id: s.plan_id,
        }
    }
}

#[derive(Deserialize)]
struct RazorpayPlan {
    id: String,
    period: String,
    interval: u32,
    item: RazorpayPlanItem,
}

#[derive(Deserialize)]
struct RazorpayPlanItem {
    name: String,
    amount: i64,
    currency: String,
}

#[derive(Deserialize)]
struct RazorpayErrorResponse {
    error: RazorpayErrorBody,
}

#[derive(Deserialize)]
struct RazorpayErrorBody {
    #[allow(dead_code)]
    code: Option<String>,
    description: Option<String>,
}
