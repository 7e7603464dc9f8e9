use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    None,
    Pending,
    Active,
    Paused,
    Cancelled,
    Expired,
    Completed,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::None => "none",
            SubscriptionStatus::Pending => "pending",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Paused => "paused",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Completed => "completed",
        }
    }

    /// Returns true if the user should currently have access to paid content.
    pub fn is_active(&self) -> bool {
        matches!(self, SubscriptionStatus::Active)
    }
}

/// The per-account subscription record. One row per account; all writes go
/// through field-level merges so concurrent writers never clobber fields
/// they did not touch.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionRecord {
    pub account_id: String,
    pub status: SubscriptionStatus,
    /// Processor-assigned subscription id; immutable once set.
    pub subscription_id: Option<String>,
    pub plan_id: Option<String>,
    /// End of the currently paid period; advanced only by activation/charge.
    pub current_period_end: Option<NaiveDateTime>,
    pub last_payment_id: Option<String>,
    pub last_payment_date: Option<NaiveDateTime>,
    pub last_failed_payment: Option<NaiveDateTime>,
    pub activated_at: Option<NaiveDateTime>,
    pub cancelled_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub paused_at: Option<NaiveDateTime>,
    pub resumed_at: Option<NaiveDateTime>,
    pub verified_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl SubscriptionRecord {
    /// Record for an account that has never subscribed.
    pub fn empty(account_id: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            status: SubscriptionStatus::None,
            subscription_id: None,
            plan_id: None,
            current_period_end: None,
            last_payment_id: None,
            last_payment_date: None,
            last_failed_payment: None,
            activated_at: None,
            cancelled_at: None,
            completed_at: None,
            paused_at: None,
            resumed_at: None,
            verified_at: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Field-level merge of the subscription record. `None` means "leave the
/// stored value untouched"; the persistence layer translates this into a
/// partial update, never a whole-record overwrite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionUpdate {
    pub status: Option<SubscriptionStatus>,
    pub subscription_id: Option<String>,
    pub plan_id: Option<String>,
    pub current_period_end: Option<NaiveDateTime>,
    pub last_payment_id: Option<String>,
    pub last_payment_date: Option<NaiveDateTime>,
    pub last_failed_payment: Option<NaiveDateTime>,
    pub activated_at: Option<NaiveDateTime>,
    pub cancelled_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub paused_at: Option<NaiveDateTime>,
    pub resumed_at: Option<NaiveDateTime>,
    pub verified_at: Option<NaiveDateTime>,
}

impl SubscriptionUpdate {
    pub fn is_empty(&self) -> bool {
        *self == SubscriptionUpdate::default()
    }

    /// Apply the merge to an in-memory record (used by the in-memory store
    /// mock and for deriving the post-write state without a re-read).
    pub fn apply_to(&self, record: &mut SubscriptionRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(ref id) = self.subscription_id {
            record.subscription_id = Some(id.clone());
        }
        if let Some(ref plan) = self.plan_id {
            record.plan_id = Some(plan.clone());
        }
        if let Some(end) = self.current_period_end {
            record.current_period_end = Some(end);
        }
        if let Some(ref id) = self.last_payment_id {
            record.last_payment_id = Some(id.clone());
        }
        if let Some(ts) = self.last_payment_date {
            record.last_payment_date = Some(ts);
        }
        if let Some(ts) = self.last_failed_payment {
            record.last_failed_payment = Some(ts);
        }
        if let Some(ts) = self.activated_at {
            record.activated_at = Some(ts);
        }
        if let Some(ts) = self.cancelled_at {
            record.cancelled_at = Some(ts);
        }
        if let Some(ts) = self.completed_at {
            record.completed_at = Some(ts);
        }
        if let Some(ts) = self.paused_at {
            record.paused_at = Some(ts);
        }
        if let Some(ts) = self.resumed_at {
            record.resumed_at = Some(ts);
        }
        if let Some(ts) = self.verified_at {
            record.verified_at = Some(ts);
        }
    }
}
