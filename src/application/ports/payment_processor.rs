use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::app_error::AppResult;

/// Plan creation parameters, in processor-neutral terms.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlanInput {
    pub name: String,
    /// Amount in minor units (paise).
    pub amount: i64,
    pub currency: String,
    pub period: String,
    pub interval: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessorPlan {
    pub id: String,
    pub period: String,
    pub interval: u32,
    pub item_name: String,
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct CreateSubscriptionInput {
    pub plan_id: String,
    pub account_id: String,
    pub account_email: Option<String>,
    pub account_name: Option<String>,
    pub total_count: u32,
}

#[derive(Debug, Clone)]
pub struct ProcessorSubscription {
    pub id: String,
    pub status: String,
    /// End of the paid period, epoch seconds.
    pub current_end: Option<i64>,
    /// Hosted checkout link for the client to complete the first charge.
    pub short_url: Option<String>,
    pub plan_id: Option<String>,
}

/// Outbound calls to the payment processor's REST API. The billing use
/// cases depend on this trait so tests can swap in a mock.
#[async_trait]
pub trait PaymentProcessorPort: Send + Sync {
    async fn create_plan(&self, input: &CreatePlanInput) -> AppResult<ProcessorPlan>;

    async fn create_subscription(
        &self,
        input: &CreateSubscriptionInput,
    ) -> AppResult<ProcessorSubscription>;

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        at_cycle_end: bool,
    ) -> AppResult<ProcessorSubscription>;

    async fn fetch_subscription(&self, subscription_id: &str)
        -> AppResult<ProcessorSubscription>;
}
