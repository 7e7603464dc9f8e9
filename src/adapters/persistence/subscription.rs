use async_trait::async_trait;
use sqlx::Row;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::webhook::AccountStoreTrait,
    domain::entities::ledger::{LedgerAppend, LedgerEntry, LedgerEntryType},
    domain::entities::subscription::{SubscriptionRecord, SubscriptionUpdate},
};

fn row_to_record(row: &sqlx::postgres::PgRow) -> SubscriptionRecord {
    SubscriptionRecord {
        account_id: row.get("account_id"),
        status: row.get("status"),
        subscription_id: row.get("subscription_id"),
        plan_id: row.get("plan_id"),
        current_period_end: row.get("current_period_end"),
        last_payment_id: row.get("last_payment_id"),
        last_payment_date: row.get("last_payment_date"),
        last_failed_payment: row.get("last_failed_payment"),
        activated_at: row.get("activated_at"),
        cancelled_at: row.get("cancelled_at"),
        completed_at: row.get("completed_at"),
        paused_at: row.get("paused_at"),
        resumed_at: row.get("resumed_at"),
        verified_at: row.get("verified_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = r#"
    account_id, status, subscription_id, plan_id, current_period_end,
    last_payment_id, last_payment_date, last_failed_payment, activated_at,
    cancelled_at, completed_at, paused_at, resumed_at, verified_at,
    created_at, updated_at
"#;

#[async_trait]
impl AccountStoreTrait for PostgresPersistence {
    async fn get_subscription(
        &self,
        account_id: &str,
    ) -> AppResult<Option<SubscriptionRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM account_subscriptions WHERE account_id = $1",
            SELECT_COLS
        ))
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_record))
    }

    async fn merge_subscription(
        &self,
        account_id: &str,
        update: &SubscriptionUpdate,
    ) -> AppResult<()> {
        // One upsert per merge: the row is created on first contact and
        // NULL update fields fall back to the stored value, so concurrent
        // writers never clobber fields they did not touch.
        sqlx::query(
            r#"
            INSERT INTO account_subscriptions
                (account_id, status, subscription_id, plan_id, current_period_end,
                 last_payment_id, last_payment_date, last_failed_payment, activated_at,
                 cancelled_at, completed_at, paused_at, resumed_at, verified_at)
            VALUES ($1, COALESCE($2, 'none'::subscription_status), $3, $4, $5, $6, $7,
                    $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (account_id) DO UPDATE SET
                status = COALESCE($2, account_subscriptions.status),
                subscription_id = COALESCE($3, account_subscriptions.subscription_id),
                plan_id = COALESCE($4, account_subscriptions.plan_id),
                current_period_end = COALESCE($5, account_subscriptions.current_period_end),
                last_payment_id = COALESCE($6, account_subscriptions.last_payment_id),
                last_payment_date = COALESCE($7, account_subscriptions.last_payment_date),
                last_failed_payment = COALESCE($8, account_subscriptions.last_failed_payment),
                activated_at = COALESCE($9, account_subscriptions.activated_at),
                cancelled_at = COALESCE($10, account_subscriptions.cancelled_at),
                completed_at = COALESCE($11, account_subscriptions.completed_at),
                paused_at = COALESCE($12, account_subscriptions.paused_at),
                resumed_at = COALESCE($13, account_subscriptions.resumed_at),
                verified_at = COALESCE($14, account_subscriptions.verified_at),
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(account_id)
        .bind(update.status)
        .bind(&update.subscription_id)
        .bind(&update.plan_id)
        .bind(update.current_period_end)
        .bind(&update.last_payment_id)
        .bind(update.last_payment_date)
        .bind(update.last_failed_payment)
        .bind(update.activated_at)
        .bind(update.cancelled_at)
        .bind(update.completed_at)
        .bind(update.paused_at)
        .bind(update.resumed_at)
        .bind(update.verified_at)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(())
    }

    async fn append_ledger_entry(
        &self,
        account_id: &str,
        entry: &LedgerEntry,
    ) -> AppResult<LedgerAppend> {
        self.insert_ledger_entry(account_id, entry).await
    }

    async fn ledger_entry_exists(
        &self,
        payment_id: &str,
        entry_type: LedgerEntryType,
    ) -> AppResult<bool> {
        self.ledger_entry_present(payment_id, entry_type).await
    }
}
