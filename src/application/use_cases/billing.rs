//! Client-initiated billing flows: plan setup, subscription lifecycle, and
//! first-payment verification.

use std::sync::Arc;

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::app_error::{AppError, AppResult};
use crate::application::ports::payment_processor::{
    CreatePlanInput, CreateSubscriptionInput, PaymentProcessorPort, ProcessorPlan,
};
use crate::application::signature::verify_payment_signature;
use crate::application::use_cases::webhook::AccountStoreTrait;
use crate::domain::entities::ledger::{
    LedgerAppend, LedgerEntry, LedgerEntryStatus, LedgerEntryType,
};
use crate::domain::entities::subscription::{SubscriptionStatus, SubscriptionUpdate};

/// A monthly plan renews twelve times before the processor marks the
/// subscription completed.
const SUBSCRIPTION_TOTAL_COUNT: u32 = 12;
const DEFAULT_CURRENCY: &str = "INR";

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub account_id: String,
    pub plan_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateSubscriptionResponse {
    pub subscription_id: String,
    pub short_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelSubscriptionRequest {
    pub account_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPaymentRequest {
    pub account_id: String,
    pub payment_id: String,
    pub subscription_id: String,
    pub signature: String,
}

pub struct BillingUseCases {
    store: Arc<dyn AccountStoreTrait>,
    processor: Arc<dyn PaymentProcessorPort>,
    /// API key secret, used to check client-side payment signatures.
    key_secret: String,
}

impl BillingUseCases {
    pub fn new(
        store: Arc<dyn AccountStoreTrait>,
        processor: Arc<dyn PaymentProcessorPort>,
        key_secret: String,
    ) -> Self {
        Self {
            store,
            processor,
            key_secret,
        }
    }

    pub async fn create_plan(&self, input: CreatePlanInput) -> AppResult<ProcessorPlan> {
        if input.name.trim().is_empty() {
            return Err(AppError::InvalidInput("Plan name is required".to_string()));
        }
        if input.amount <= 0 {
            return Err(AppError::InvalidInput(
                "Plan amount must be positive".to_string(),
            ));
        }
        let plan = self.processor.create_plan(&input).await?;
        tracing::info!(plan_id = %plan.id, "Created billing plan");
        Ok(plan)
    }

    /// Creates a processor subscription and stores it as pending. The
    /// subscription turns active through verify_payment or the activation
    /// webhook, whichever lands first.
    pub async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> AppResult<CreateSubscriptionResponse> {
        if request.account_id.trim().is_empty() {
            return Err(AppError::InvalidInput("Account id is required".to_string()));
        }
        if request.plan_id.trim().is_empty() {
            return Err(AppError::InvalidInput("Plan id is required".to_string()));
        }

        let subscription = self
            .processor
            .create_subscription(&CreateSubscriptionInput {
                plan_id: request.plan_id.clone(),
                account_id: request.account_id.clone(),
                account_email: request.email,
                account_name: request.name,
                total_count: SUBSCRIPTION_TOTAL_COUNT,
            })
            .await?;

        self.store
            .merge_subscription(
                &request.account_id,
                &SubscriptionUpdate {
                    status: Some(SubscriptionStatus::Pending),
                    subscription_id: Some(subscription.id.clone()),
                    plan_id: Some(request.plan_id),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(
            account_id = %request.account_id,
            subscription_id = %subscription.id,
            "Created pending subscription"
        );
        Ok(CreateSubscriptionResponse {
            subscription_id: subscription.id,
            short_url: subscription.short_url,
        })
    }

    pub async fn cancel_subscription(
        &self,
        request: CancelSubscriptionRequest,
    ) -> AppResult<()> {
        let record = self
            .store
            .get_subscription(&request.account_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let subscription_id = record.subscription_id.ok_or(AppError::NotFound)?;

        self.processor
            .cancel_subscription(&subscription_id, false)
            .await?;

        self.store
            .merge_subscription(
                &request.account_id,
                &SubscriptionUpdate {
                    status: Some(SubscriptionStatus::Cancelled),
                    cancelled_at: Some(chrono::Utc::now().naive_utc()),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(
            account_id = %request.account_id,
            subscription_id = %subscription_id,
            "Cancelled subscription"
        );
        Ok(())
    }

    /// Confirms the client-reported first payment. The signature proves the
    /// payment came back from checkout; the subscription fetch proves the
    /// processor actually holds it active.
    pub async fn verify_payment(&self, request: VerifyPaymentRequest) -> AppResult<()> {
        if !verify_payment_signature(
            &request.payment_id,
            &request.subscription_id,
            &request.signature,
            &self.key_secret,
        ) {
            return Err(AppError::InvalidSignature);
        }

        let subscription = self
            .processor
            .fetch_subscription(&request.subscription_id)
            .await?;
        if subscription.status != "active" {
            return Err(AppError::InvalidInput(format!(
                "Subscription is not active (status: {})",
                subscription.status
            )));
        }

        let now = chrono::Utc::now().naive_utc();
        let current_period_end = subscription
            .current_end
            .and_then(|s| DateTime::from_timestamp(s, 0))
            .map(|dt| dt.naive_utc());

        self.store
            .merge_subscription(
                &request.account_id,
                &SubscriptionUpdate {
                    status: Some(SubscriptionStatus::Active),
                    current_period_end,
                    last_payment_id: Some(request.payment_id.clone()),
                    last_payment_date: Some(now),
                    verified_at: Some(now),
                    ..Default::default()
                },
            )
            .await?;

        let entry = LedgerEntry {
            amount: 0,
            currency: DEFAULT_CURRENCY.to_string(),
            payment_id: request.payment_id.clone(),
            subscription_id: Some(request.subscription_id.clone()),
            status: LedgerEntryStatus::Success,
            entry_type: LedgerEntryType::Initial,
            recorded_at: now,
            next_billing_date: current_period_end,
            reason: None,
        };
        match self
            .store
            .append_ledger_entry(&request.account_id, &entry)
            .await
        {
            Ok(LedgerAppend::Inserted) => {}
            Ok(LedgerAppend::AlreadyExists) => {
                tracing::info!(
                    account_id = %request.account_id,
                    payment_id = %request.payment_id,
                    "Initial payment already recorded"
                );
            }
            Err(e) => {
                tracing::error!(
                    account_id = %request.account_id,
                    payment_id = %request.payment_id,
                    error = %e,
                    "Failed to record initial payment"
                );
            }
        }

        tracing::info!(
            account_id = %request.account_id,
            subscription_id = %request.subscription_id,
            "Verified initial payment"
        );
        Ok(())
    }
}
