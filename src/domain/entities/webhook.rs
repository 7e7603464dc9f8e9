/// Canonical event types emitted by the payment processor. Unknown wire
/// strings map to `Unhandled` so new processor event types are safely
/// ignored rather than mis-routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Activated,
    Charged,
    PaymentFailed,
    Cancelled,
    Completed,
    Paused,
    Resumed,
    Unhandled,
}

impl EventKind {
    pub fn from_wire(event: &str) -> Self {
        match event {
            "subscription.activated" => EventKind::Activated,
            "subscription.charged" => EventKind::Charged,
            "payment.failed" => EventKind::PaymentFailed,
            "subscription.cancelled" => EventKind::Cancelled,
            "subscription.completed" => EventKind::Completed,
            "subscription.paused" => EventKind::Paused,
            "subscription.resumed" => EventKind::Resumed,
            _ => EventKind::Unhandled,
        }
    }
}

/// Subscription entity fields extracted from the notification payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionPayload {
    pub id: Option<String>,
    /// End of the paid period, epoch seconds.
    pub current_end: Option<i64>,
}

/// Payment entity fields extracted from the notification payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentPayload {
    pub id: Option<String>,
    /// Amount in minor units (paise).
    pub amount: Option<i64>,
    pub error_description: Option<String>,
}

/// A verified, normalized processor notification, independent of the
/// processor-specific envelope shape.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEvent {
    pub kind: EventKind,
    /// Raw wire event type, kept for logging of unhandled events.
    pub raw_type: String,
    pub account_id: String,
    pub subscription: SubscriptionPayload,
    pub payment: PaymentPayload,
}
