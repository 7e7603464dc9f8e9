//! Applies normalized processor events to the account store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::app_error::AppResult;
use crate::application::state_machine::{self, Action};
use crate::domain::entities::ledger::{LedgerAppend, LedgerEntry, LedgerEntryType};
use crate::domain::entities::subscription::{
    SubscriptionRecord, SubscriptionStatus, SubscriptionUpdate,
};
use crate::domain::entities::webhook::NormalizedEvent;

/// Store operations the webhook pipeline needs. `append_ledger_entry` is the
/// atomic primitive: the store enforces the (payment id, entry type) unique
/// key so concurrent duplicate deliveries cannot both insert.
#[async_trait]
pub trait AccountStoreTrait: Send + Sync {
    async fn get_subscription(&self, account_id: &str)
        -> AppResult<Option<SubscriptionRecord>>;

    /// Field-level merge; creates the record if the account has none yet.
    async fn merge_subscription(
        &self,
        account_id: &str,
        update: &SubscriptionUpdate,
    ) -> AppResult<()>;

    async fn append_ledger_entry(
        &self,
        account_id: &str,
        entry: &LedgerEntry,
    ) -> AppResult<LedgerAppend>;

    async fn ledger_entry_exists(
        &self,
        payment_id: &str,
        entry_type: LedgerEntryType,
    ) -> AppResult<bool>;
}

/// What happened to the ledger side of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOutcome {
    Recorded,
    Duplicate,
    /// The append failed after the record merge succeeded. The record is
    /// already consistent, so this is logged and absorbed rather than
    /// surfaced as a processing failure.
    Failed,
    NotRequired,
}

/// Result of processing one event, for logging and tests. All variants map
/// to an acknowledged delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessReport {
    Applied(LedgerOutcome),
    DroppedStale,
    DroppedDuplicate,
}

pub struct WebhookUseCases {
    store: Arc<dyn AccountStoreTrait>,
}

impl WebhookUseCases {
    pub fn new(store: Arc<dyn AccountStoreTrait>) -> Self {
        Self { store }
    }

    /// Runs one verified event through the state machine and persists the
    /// outcome. Errors propagate only for failures of the primary record
    /// write; everything else resolves to an acknowledgeable report.
    pub async fn process_event(&self, event: &NormalizedEvent) -> AppResult<ProcessReport> {
        let current = self
            .store
            .get_subscription(&event.account_id)
            .await?
            .map(|r| r.status)
            .unwrap_or(SubscriptionStatus::None);

        let now = chrono::Utc::now().naive_utc();
        let transition = state_machine::transition(current, event, now);

        if transition.action == Action::DropStale {
            tracing::info!(
                account_id = %event.account_id,
                event_type = %event.raw_type,
                current_status = current.as_str(),
                "Dropping event without effect"
            );
            return Ok(ProcessReport::DroppedStale);
        }

        // Redelivery check before any write: a payment already in the ledger
        // means this delivery was fully processed before.
        if let Some(ref entry) = transition.ledger {
            let (payment_id, entry_type) = entry.idempotency_key();
            if self.store.ledger_entry_exists(payment_id, entry_type).await? {
                tracing::info!(
                    account_id = %event.account_id,
                    payment_id = payment_id,
                    entry_type = entry_type.as_str(),
                    "Duplicate delivery; already recorded"
                );
                return Ok(ProcessReport::DroppedDuplicate);
            }
        }

        self.store
            .merge_subscription(&event.account_id, &transition.update)
            .await?;

        let ledger_outcome = match transition.ledger {
            None => LedgerOutcome::NotRequired,
            Some(entry) => match self
                .store
                .append_ledger_entry(&event.account_id, &entry)
                .await
            {
                Ok(LedgerAppend::Inserted) => LedgerOutcome::Recorded,
                Ok(LedgerAppend::AlreadyExists) => {
                    tracing::info!(
                        account_id = %event.account_id,
                        payment_id = %entry.payment_id,
                        "Concurrent delivery recorded the ledger entry first"
                    );
                    LedgerOutcome::Duplicate
                }
                Err(e) => {
                    tracing::error!(
                        account_id = %event.account_id,
                        payment_id = %entry.payment_id,
                        error = %e,
                        "Failed to append ledger entry after record update"
                    );
                    LedgerOutcome::Failed
                }
            },
        };

        tracing::info!(
            account_id = %event.account_id,
            event_type = %event.raw_type,
            new_status = transition.update.status.map(|s| s.as_str()).unwrap_or("unchanged"),
            ledger = ?ledger_outcome,
            "Processed subscription event"
        );
        Ok(ProcessReport::Applied(ledger_outcome))
    }
}
