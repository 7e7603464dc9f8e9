//! Mock payment processor for billing tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;

use crate::app_error::{AppError, AppResult};
use crate::application::ports::payment_processor::{
    CreatePlanInput, CreateSubscriptionInput, PaymentProcessorPort, ProcessorPlan,
    ProcessorSubscription,
};

pub struct MockPaymentProcessor {
    statuses: Mutex<HashMap<String, String>>,
    cancelled: Mutex<Vec<String>>,
    counter: AtomicU32,
    fail_next: AtomicBool,
}

impl MockPaymentProcessor {
    pub fn new() -> Self {
        Self {
            statuses: Mutex::new(HashMap::new()),
            cancelled: Mutex::new(Vec::new()),
            counter: AtomicU32::new(0),
            fail_next: AtomicBool::new(false),
        }
    }

    /// Makes the next processor call fail with a provider error.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn set_subscription_status(&self, subscription_id: &str, status: &str) {
        self.statuses
            .lock()
            .unwrap()
            .insert(subscription_id.to_string(), status.to_string());
    }

    pub fn cancelled_ids(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().clone()
    }

    fn check_failure(&self) -> AppResult<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(AppError::PaymentProvider("simulated outage".to_string()));
        }
        Ok(())
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}_{}", prefix, n)
    }
}

impl Default for MockPaymentProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentProcessorPort for MockPaymentProcessor {
    async fn create_plan(&self, input: &CreatePlanInput) -> AppResult<ProcessorPlan> {
        self.check_failure()?;
        Ok(ProcessorPlan {
            id: self.next_id("plan_mock"),
            period: input.period.clone(),
            interval: input.interval,
            item_name: input.name.clone(),
            amount: input.amount,
            currency: input.currency.clone(),
        })
    }

    async fn create_subscription(
        &self,
        input: &CreateSubscriptionInput,
    ) -> AppResult<ProcessorSubscription> {
        self.check_failure()?;
        let id = self.next_id("sub_mock");
        self.statuses
            .lock()
            .unwrap()
            .insert(id.clone(), "created".to_string());
        Ok(ProcessorSubscription {
            id,
            status: "created".to_string(),
            current_end: None,
            short_url: Some("https://rzp.io/i/mock".to_string()),
            plan_id: Some(input.plan_id.clone()),
        })
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        _at_cycle_end: bool,
    ) -> AppResult<ProcessorSubscription> {
        self.check_failure()?;
        self.cancelled
            .lock()
            .unwrap()
            .push(subscription_id.to_string());
        self.statuses
            .lock()
            .unwrap()
            .insert(subscription_id.to_string(), "cancelled".to_string());
        Ok(ProcessorSubscription {
            id: subscription_id.to_string(),
            status: "cancelled".to_string(),
            current_end: None,
            short_url: None,
            plan_id: None,
        })
    }

    async fn fetch_subscription(
        &self,
        subscription_id: &str,
    ) -> AppResult<ProcessorSubscription> {
        self.check_failure()?;
        let status = self
            .statuses
            .lock()
            .unwrap()
            .get(subscription_id)
            .cloned()
            .ok_or(AppError::NotFound)?;
        Ok(ProcessorSubscription {
            id: subscription_id.to_string(),
            status,
            current_end: Some(1_737_600_000),
            short_url: None,
            plan_id: None,
        })
    }
}
