//! Pure transition logic: given the stored subscription state and a
//! normalized event, decide what to write. No I/O happens here, which is
//! what makes the event table directly testable.

use chrono::{DateTime, NaiveDateTime};

use crate::domain::entities::ledger::{LedgerEntry, LedgerEntryStatus, LedgerEntryType};
use crate::domain::entities::subscription::{SubscriptionStatus, SubscriptionUpdate};
use crate::domain::entities::webhook::{EventKind, NormalizedEvent};

const DEFAULT_CURRENCY: &str = "INR";
const DEFAULT_FAILURE_REASON: &str = "Payment failed";

/// What the coordinator should do with the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Write the update (and ledger entry, if any).
    Apply,
    /// Event arrived out of order or is not handled; write nothing.
    DropStale,
}

/// The writes an event translates to.
#[derive(Debug, Clone)]
pub struct Transition {
    pub action: Action,
    pub update: SubscriptionUpdate,
    pub ledger: Option<LedgerEntry>,
}

impl Transition {
    fn drop_stale() -> Self {
        Self {
            action: Action::DropStale,
            update: SubscriptionUpdate::default(),
            ledger: None,
        }
    }

    fn apply(update: SubscriptionUpdate, ledger: Option<LedgerEntry>) -> Self {
        Self {
            action: Action::Apply,
            update,
            ledger,
        }
    }
}

/// Maps a normalized event onto the writes it implies, given the current
/// stored status. `now` is injected so transitions are deterministic under
/// test.
pub fn transition(
    current: SubscriptionStatus,
    event: &NormalizedEvent,
    now: NaiveDateTime,
) -> Transition {
    match event.kind {
        EventKind::Activated => activated(event, now),
        EventKind::Charged => charged(current, event, now),
        EventKind::PaymentFailed => payment_failed(event, now),
        EventKind::Cancelled => timestamped_status(
            SubscriptionStatus::Cancelled,
            SubscriptionUpdate {
                cancelled_at: Some(now),
                ..Default::default()
            },
        ),
        EventKind::Completed => timestamped_status(
            SubscriptionStatus::Completed,
            SubscriptionUpdate {
                completed_at: Some(now),
                ..Default::default()
            },
        ),
        EventKind::Paused => timestamped_status(
            SubscriptionStatus::Paused,
            SubscriptionUpdate {
                paused_at: Some(now),
                ..Default::default()
            },
        ),
        EventKind::Resumed => timestamped_status(
            SubscriptionStatus::Active,
            SubscriptionUpdate {
                resumed_at: Some(now),
                ..Default::default()
            },
        ),
        EventKind::Unhandled => Transition::drop_stale(),
    }
}

fn activated(event: &NormalizedEvent, now: NaiveDateTime) -> Transition {
    let update = SubscriptionUpdate {
        status: Some(SubscriptionStatus::Active),
        subscription_id: event.subscription.id.clone(),
        current_period_end: epoch_to_naive(event.subscription.current_end),
        activated_at: Some(now),
        last_payment_id: event.payment.id.clone(),
        last_payment_date: event.payment.id.as_ref().map(|_| now),
        ..Default::default()
    };
    let ledger = payment_ledger(
        event,
        LedgerEntryType::Activation,
        LedgerEntryStatus::Success,
        now,
    );
    Transition::apply(update, ledger)
}

fn charged(
    current: SubscriptionStatus,
    event: &NormalizedEvent,
    now: NaiveDateTime,
) -> Transition {
    // A renewal charge can race the cancellation notification; once the
    // account is cancelled a late charge must not resurrect it.
    if current == SubscriptionStatus::Cancelled {
        return Transition::drop_stale();
    }
    let update = SubscriptionUpdate {
        status: Some(SubscriptionStatus::Active),
        current_period_end: epoch_to_naive(event.subscription.current_end),
        last_payment_id: event.payment.id.clone(),
        last_payment_date: Some(now),
        ..Default::default()
    };
    let ledger = payment_ledger(
        event,
        LedgerEntryType::Renewal,
        LedgerEntryStatus::Success,
        now,
    );
    Transition::apply(update, ledger)
}

fn payment_failed(event: &NormalizedEvent, now: NaiveDateTime) -> Transition {
    let update = SubscriptionUpdate {
        status: Some(SubscriptionStatus::Expired),
        last_failed_payment: Some(now),
        ..Default::default()
    };
    let mut ledger = payment_ledger(
        event,
        LedgerEntryType::FailedRenewal,
        LedgerEntryStatus::Failed,
        now,
    );
    if let Some(ref mut entry) = ledger {
        entry.reason = Some(
            event
                .payment
                .error_description
                .clone()
                .unwrap_or_else(|| DEFAULT_FAILURE_REASON.to_string()),
        );
    }
    Transition::apply(update, ledger)
}

fn timestamped_status(status: SubscriptionStatus, base: SubscriptionUpdate) -> Transition {
    let update = SubscriptionUpdate {
        status: Some(status),
        ..base
    };
    Transition::apply(update, None)
}

/// A ledger entry requires a payment id to key on; events without one
/// update the record but leave no audit row.
fn payment_ledger(
    event: &NormalizedEvent,
    entry_type: LedgerEntryType,
    status: LedgerEntryStatus,
    now: NaiveDateTime,
) -> Option<LedgerEntry> {
    let payment_id = event.payment.id.clone()?;
    Some(LedgerEntry {
        amount: event.payment.amount.unwrap_or(0),
        currency: DEFAULT_CURRENCY.to_string(),
        payment_id,
        subscription_id: event.subscription.id.clone(),
        status,
        entry_type,
        recorded_at: now,
        next_billing_date: epoch_to_naive(event.subscription.current_end),
        reason: None,
    })
}

fn epoch_to_naive(secs: Option<i64>) -> Option<NaiveDateTime> {
    secs.and_then(|s| DateTime::from_timestamp(s, 0)).map(|dt| dt.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::webhook::{PaymentPayload, SubscriptionPayload};

    fn now() -> NaiveDateTime {
        DateTime::from_timestamp(1_735_000_000, 0).unwrap().naive_utc()
    }

    fn event(kind: EventKind) -> NormalizedEvent {
        NormalizedEvent {
            kind,
            raw_type: "test".to_string(),
            account_id: "acc_1".to_string(),
            subscription: SubscriptionPayload {
                id: Some("sub_1".to_string()),
                current_end: Some(1_737_600_000),
            },
            payment: PaymentPayload {
                id: Some("pay_1".to_string()),
                amount: Some(4999),
                error_description: None,
            },
        }
    }

    #[test]
    fn activation_sets_active_and_logs_activation() {
        let t = transition(SubscriptionStatus::Pending, &event(EventKind::Activated), now());

        assert_eq!(t.action, Action::Apply);
        assert_eq!(t.update.status, Some(SubscriptionStatus::Active));
        assert_eq!(t.update.subscription_id.as_deref(), Some("sub_1"));
        assert!(t.update.current_period_end.is_some());
        assert_eq!(t.update.activated_at, Some(now()));
        assert_eq!(t.update.last_payment_id.as_deref(), Some("pay_1"));

        let ledger = t.ledger.unwrap();
        assert_eq!(ledger.entry_type, LedgerEntryType::Activation);
        assert_eq!(ledger.status, LedgerEntryStatus::Success);
        assert_eq!(ledger.amount, 4999);
        assert_eq!(ledger.currency, "INR");
        assert!(ledger.next_billing_date.is_some());
    }

    #[test]
    fn charge_renews_and_advances_period() {
        let t = transition(SubscriptionStatus::Active, &event(EventKind::Charged), now());

        assert_eq!(t.action, Action::Apply);
        assert_eq!(t.update.status, Some(SubscriptionStatus::Active));
        assert!(t.update.current_period_end.is_some());
        assert_eq!(t.update.last_payment_date, Some(now()));
        // Renewal does not rewrite the activation timestamp.
        assert_eq!(t.update.activated_at, None);

        let ledger = t.ledger.unwrap();
        assert_eq!(ledger.entry_type, LedgerEntryType::Renewal);
        assert_eq!(ledger.status, LedgerEntryStatus::Success);
    }

    #[test]
    fn charge_after_cancellation_is_dropped() {
        let t = transition(SubscriptionStatus::Cancelled, &event(EventKind::Charged), now());

        assert_eq!(t.action, Action::DropStale);
        assert!(t.update.is_empty());
        assert!(t.ledger.is_none());
    }

    #[test]
    fn charge_in_other_states_still_applies() {
        for current in [
            SubscriptionStatus::None,
            SubscriptionStatus::Pending,
            SubscriptionStatus::Active,
            SubscriptionStatus::Paused,
            SubscriptionStatus::Expired,
        ] {
            let t = transition(current, &event(EventKind::Charged), now());
            assert_eq!(t.action, Action::Apply, "state {:?}", current);
        }
    }

    #[test]
    fn payment_failure_expires_and_logs_reason() {
        let mut e = event(EventKind::PaymentFailed);
        e.payment.error_description = Some("Insufficient funds".to_string());
        let t = transition(SubscriptionStatus::Active, &e, now());

        assert_eq!(t.update.status, Some(SubscriptionStatus::Expired));
        assert_eq!(t.update.last_failed_payment, Some(now()));

        let ledger = t.ledger.unwrap();
        assert_eq!(ledger.entry_type, LedgerEntryType::FailedRenewal);
        assert_eq!(ledger.status, LedgerEntryStatus::Failed);
        assert_eq!(ledger.reason.as_deref(), Some("Insufficient funds"));
    }

    #[test]
    fn payment_failure_without_description_gets_default_reason() {
        let t = transition(SubscriptionStatus::Active, &event(EventKind::PaymentFailed), now());
        assert_eq!(t.ledger.unwrap().reason.as_deref(), Some("Payment failed"));
    }

    #[test]
    fn lifecycle_events_set_status_and_timestamp_only() {
        let cases = [
            (EventKind::Cancelled, SubscriptionStatus::Cancelled),
            (EventKind::Completed, SubscriptionStatus::Completed),
            (EventKind::Paused, SubscriptionStatus::Paused),
            (EventKind::Resumed, SubscriptionStatus::Active),
        ];
        for (kind, expected) in cases {
            let t = transition(SubscriptionStatus::Active, &event(kind), now());
            assert_eq!(t.action, Action::Apply);
            assert_eq!(t.update.status, Some(expected), "event {:?}", kind);
            assert!(t.ledger.is_none(), "event {:?} must not write the ledger", kind);
        }
    }

    #[test]
    fn cancelled_records_cancellation_time() {
        let t = transition(SubscriptionStatus::Active, &event(EventKind::Cancelled), now());
        assert_eq!(t.update.cancelled_at, Some(now()));
        assert_eq!(t.update.completed_at, None);
    }

    #[test]
    fn resumed_records_resume_time() {
        let t = transition(SubscriptionStatus::Paused, &event(EventKind::Resumed), now());
        assert_eq!(t.update.resumed_at, Some(now()));
        assert_eq!(t.update.status, Some(SubscriptionStatus::Active));
    }

    #[test]
    fn unhandled_events_write_nothing() {
        let t = transition(SubscriptionStatus::Active, &event(EventKind::Unhandled), now());
        assert_eq!(t.action, Action::DropStale);
        assert!(t.update.is_empty());
        assert!(t.ledger.is_none());
    }

    #[test]
    fn events_without_payment_id_skip_the_ledger() {
        let mut e = event(EventKind::Charged);
        e.payment.id = None;
        let t = transition(SubscriptionStatus::Active, &e, now());
        assert_eq!(t.action, Action::Apply);
        assert!(t.ledger.is_none());
        assert_eq!(t.update.last_payment_id, None);
    }

    #[test]
    fn missing_amount_defaults_to_zero() {
        let mut e = event(EventKind::Charged);
        e.payment.amount = None;
        let t = transition(SubscriptionStatus::Active, &e, now());
        assert_eq!(t.ledger.unwrap().amount, 0);
    }
}
