use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::ledger::{LedgerAppend, LedgerEntry, LedgerEntryType},
};

impl PostgresPersistence {
    /// Append-only insert. The unique key on (payment_id, entry_type) is the
    /// idempotency guard: when two deliveries race, exactly one row lands
    /// and the loser sees `AlreadyExists`.
    pub(crate) async fn insert_ledger_entry(
        &self,
        account_id: &str,
        entry: &LedgerEntry,
    ) -> AppResult<LedgerAppend> {
        let result = sqlx::query(
            r#"
            INSERT INTO payment_ledger
                (id, account_id, payment_id, subscription_id, amount, currency,
                 status, entry_type, recorded_at, next_billing_date, reason)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (payment_id, entry_type) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account_id)
        .bind(&entry.payment_id)
        .bind(&entry.subscription_id)
        .bind(entry.amount)
        .bind(&entry.currency)
        .bind(entry.status)
        .bind(entry.entry_type)
        .bind(entry.recorded_at)
        .bind(entry.next_billing_date)
        .bind(&entry.reason)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;

        if result.rows_affected() == 0 {
            Ok(LedgerAppend::AlreadyExists)
        } else {
            Ok(LedgerAppend::Inserted)
        }
    }

    pub(crate) async fn ledger_entry_present(
        &self,
        payment_id: &str,
        entry_type: LedgerEntryType,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM payment_ledger WHERE payment_id = $1 AND entry_type = $2)",
        )
        .bind(payment_id)
        .bind(entry_type)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(exists)
    }
}
