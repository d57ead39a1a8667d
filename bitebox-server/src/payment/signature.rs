//! Checkout signature verification (HMAC-SHA256)
//!
//! The gateway signs `"{order_id}|{payment_id}"` with the merchant key secret
//! and hands the hex digest to the browser. The server recomputes it; the
//! confirmation is trusted only on a match.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use shared::payment::PaymentConfirmation;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Verified,
    Rejected,
}

impl Verification {
    pub fn is_verified(&self) -> bool {
        matches!(self, Verification::Verified)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("confirmation field {0} is empty")]
    MissingField(&'static str),

    #[error("signing key is empty")]
    EmptySecret,
}

fn mac_for(order_id: &str, payment_id: &str, secret: &str) -> Result<HmacSha256, SignatureError> {
    if secret.is_empty() {
        return Err(SignatureError::EmptySecret);
    }
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::EmptySecret)?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    Ok(mac)
}

/// Produce the signature the gateway would attach to a confirmation
pub fn sign(order_id: &str, payment_id: &str, secret: &str) -> Result<String, SignatureError> {
    let mac = mac_for(order_id, payment_id, secret)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Check a confirmation against the merchant secret.
///
/// Pure function of its inputs. Errors only when a field is empty; any
/// signature that does not match (including non-hex input) is `Rejected`.
pub fn verify(
    confirmation: &PaymentConfirmation,
    secret: &str,
) -> Result<Verification, SignatureError> {
    if confirmation.gateway_order_id.is_empty() {
        return Err(SignatureError::MissingField("razorpay_order_id"));
    }
    if confirmation.gateway_payment_id.is_empty() {
        return Err(SignatureError::MissingField("razorpay_payment_id"));
    }
    if confirmation.signature.is_empty() {
        return Err(SignatureError::MissingField("razorpay_signature"));
    }

    let mac = mac_for(
        &confirmation.gateway_order_id,
        &confirmation.gateway_payment_id,
        secret,
    )?;

    // Hex digests are produced lowercase; anything else is a mismatch.
    let Ok(sig_bytes) = hex::decode(&confirmation.signature) else {
        return Ok(Verification::Rejected);
    };
    if confirmation.signature.bytes().any(|b| b.is_ascii_uppercase()) {
        return Ok(Verification::Rejected);
    }

    // Constant-time comparison
    match mac.verify_slice(&sig_bytes) {
        Ok(()) => Ok(Verification::Verified),
        Err(_) => Ok(Verification::Rejected),
    }
}
