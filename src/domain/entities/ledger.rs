use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ledger_entry_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryType {
    Initial,
    Activation,
    Renewal,
    FailedRenewal,
}

impl LedgerEntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerEntryType::Initial => "initial",
            LedgerEntryType::Activation => "activation",
            LedgerEntryType::Renewal => "renewal",
            LedgerEntryType::FailedRenewal => "failed_renewal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ledger_entry_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryStatus {
    Success,
    Failed,
}

/// One immutable audit row per processed payment attempt. Entries are never
/// mutated or deleted; the ledger is the durable trail independent of the
/// mutable subscription record.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    /// Amount in minor units (paise).
    pub amount: i64,
    pub currency: String,
    pub payment_id: String,
    pub subscription_id: Option<String>,
    pub status: LedgerEntryStatus,
    pub entry_type: LedgerEntryType,
    pub recorded_at: NaiveDateTime,
    pub next_billing_date: Option<NaiveDateTime>,
    pub reason: Option<String>,
}

impl LedgerEntry {
    /// Idempotency key: at most one ledger row may exist per
    /// (payment id, entry type) pair.
    pub fn idempotency_key(&self) -> (&str, LedgerEntryType) {
        (&self.payment_id, self.entry_type)
    }
}

/// Outcome of appending a ledger entry against the store's unique
/// constraint on the idempotency key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerAppend {
    Inserted,
    AlreadyExists,
}
