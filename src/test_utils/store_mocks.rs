//! In-memory store used across unit and route tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::app_error::{AppError, AppResult};
use crate::application::use_cases::webhook::AccountStoreTrait;
use crate::domain::entities::ledger::{LedgerAppend, LedgerEntry, LedgerEntryType};
use crate::domain::entities::subscription::{SubscriptionRecord, SubscriptionUpdate};

#[derive(Default)]
struct Inner {
    records: HashMap<String, SubscriptionRecord>,
    ledger: Vec<(String, LedgerEntry)>,
}

/// A single mutex guards both maps so `append_ledger_entry` is an atomic
/// check-and-insert, mirroring the database unique constraint.
pub struct InMemoryAccountStore {
    inner: Mutex<Inner>,
    fail_merge: AtomicBool,
    fail_append: AtomicBool,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            fail_merge: AtomicBool::new(false),
            fail_append: AtomicBool::new(false),
        }
    }

    pub fn fail_merges(&self) {
        self.fail_merge.store(true, Ordering::SeqCst);
    }

    pub fn fail_appends(&self) {
        self.fail_append.store(true, Ordering::SeqCst);
    }

    pub fn ledger_len(&self) -> usize {
        self.inner.lock().unwrap().ledger.len()
    }

    pub fn ledger_entries_for(&self, account_id: &str) -> Vec<LedgerEntry> {
        self.inner
            .lock()
            .unwrap()
            .ledger
            .iter()
            .filter(|(acc, _)| acc == account_id)
            .map(|(_, entry)| entry.clone())
            .collect()
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStoreTrait for InMemoryAccountStore {
    async fn get_subscription(
        &self,
        account_id: &str,
    ) -> AppResult<Option<SubscriptionRecord>> {
        Ok(self.inner.lock().unwrap().records.get(account_id).cloned())
    }

    async fn merge_subscription(
        &self,
        account_id: &str,
        update: &SubscriptionUpdate,
    ) -> AppResult<()> {
        if self.fail_merge.load(Ordering::SeqCst) {
            return Err(AppError::Database("merge failed".to_string()));
        }
        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .records
            .entry(account_id.to_string())
            .or_insert_with(|| SubscriptionRecord::empty(account_id));
        update.apply_to(record);
        record.updated_at = Some(chrono::Utc::now().naive_utc());
        Ok(())
    }

    async fn append_ledger_entry(
        &self,
        account_id: &str,
        entry: &LedgerEntry,
    ) -> AppResult<LedgerAppend> {
        if self.fail_append.load(Ordering::SeqCst) {
            return Err(AppError::Database("append failed".to_string()));
        }
        let mut inner = self.inner.lock().unwrap();
        let duplicate = inner
            .ledger
            .iter()
            .any(|(_, existing)| existing.idempotency_key() == entry.idempotency_key());
        if duplicate {
            return Ok(LedgerAppend::AlreadyExists);
        }
        inner.ledger.push((account_id.to_string(), entry.clone()));
        Ok(LedgerAppend::Inserted)
    }

    async fn ledger_entry_exists(
        &self,
        payment_id: &str,
        entry_type: LedgerEntryType,
    ) -> AppResult<bool> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .ledger
            .iter()
            .any(|(_, entry)| entry.idempotency_key() == (payment_id, entry_type)))
    }
}
