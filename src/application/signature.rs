//! Signature verification for processor notifications and client-side
//! payment confirmations.

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Verifies that a webhook body was produced by the payment processor.
///
/// The HMAC-SHA256 is computed over the untouched request bytes, never a
/// re-serialization of a parsed object, which can alter key ordering or
/// whitespace and silently break verification. Returns false for any
/// missing, malformed, or mismatched signature; an invalid signature is a
/// normal outcome, not an error.
pub fn verify_webhook_signature(raw_body: &[u8], signature: &str, secret: &str) -> bool {
    let expected = hmac_sha256_hex(secret.as_bytes(), raw_body);
    constant_time_compare(signature, &expected)
}

/// Verifies the signature the client receives from the processor after the
/// first charge. Same primitive as the webhook check, computed over
/// `"{payment_id}|{subscription_id}"` keyed by the API key secret.
pub fn verify_payment_signature(
    payment_id: &str,
    subscription_id: &str,
    signature: &str,
    key_secret: &str,
) -> bool {
    let message = format!("{}|{}", payment_id, subscription_id);
    let expected = hmac_sha256_hex(key_secret.as_bytes(), message.as_bytes());
    constant_time_compare(signature, &expected)
}

fn hmac_sha256_hex(key: &[u8], message: &[u8]) -> String {
    // HMAC accepts keys of any length; new_from_slice cannot fail for SHA-256.
    let mut mac =
        Hmac::<Sha256>::new_from_slice(key).expect("HMAC-SHA256 accepts any key length");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
