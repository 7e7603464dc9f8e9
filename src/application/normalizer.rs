//! Turns a raw processor notification into a [`NormalizedEvent`],
//! independent of the processor-specific envelope shape.

use serde_json::Value as JsonValue;

use crate::app_error::{AppError, AppResult};
use crate::domain::entities::webhook::{
    EventKind, NormalizedEvent, PaymentPayload, SubscriptionPayload,
};

/// Conventional notes key under which the processor echoes back the account
/// identifier supplied at subscription creation.
const ACCOUNT_NOTES_KEY: &str = "userId";

/// Extracts the canonical event type, the owning account id, and the typed
/// payload fragments from a parsed notification body.
///
/// Unrecognized event types pass through as `Unhandled`; a notification
/// whose notes carry no account id in either entity is unroutable and fails
/// with [`AppError::MissingAccountId`].
pub fn normalize(body: &JsonValue) -> AppResult<NormalizedEvent> {
    let raw_type = body["event"].as_str().unwrap_or("").to_string();
    let kind = EventKind::from_wire(&raw_type);

    let subscription_entity = &body["payload"]["subscription"]["entity"];
    let payment_entity = &body["payload"]["payment"]["entity"];

    let account_id = resolve_account_id(subscription_entity, payment_entity, &raw_type)?;

    let subscription = SubscriptionPayload {
        id: subscription_entity["id"].as_str().map(str::to_string),
        current_end: subscription_entity["current_end"].as_i64(),
    };

    let payment = PaymentPayload {
        id: payment_entity["id"].as_str().map(str::to_string),
        amount: payment_entity["amount"].as_i64(),
        error_description: payment_entity["error_description"]
            .as_str()
            .map(str::to_string),
    };

    Ok(NormalizedEvent {
        kind,
        raw_type,
        account_id,
        subscription,
        payment,
    })
}

/// Probes for the account id: subscription entity notes first, then payment
/// entity notes. When both are populated and disagree the subscription one
/// wins deterministically, but the disagreement is flagged for audit.
fn resolve_account_id(
    subscription_entity: &JsonValue,
    payment_entity: &JsonValue,
    raw_type: &str,
) -> AppResult<String> {
    let from_subscription = notes_account_id(subscription_entity);
    let from_payment = notes_account_id(payment_entity);

    if let (Some(sub_id), Some(pay_id)) = (&from_subscription, &from_payment) {
        if sub_id != pay_id {
            tracing::warn!(
                event_type = raw_type,
                subscription_account_id = %sub_id,
                payment_account_id = %pay_id,
                "Account id mismatch between subscription and payment notes; using subscription"
            );
        }
    }

    from_subscription
        .or(from_payment)
        .ok_or(AppError::MissingAccountId)
}

fn notes_account_id(entity: &JsonValue) -> Option<String> {
    entity["notes"][ACCOUNT_NOTES_KEY]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
