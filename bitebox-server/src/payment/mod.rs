//! Payment gateway adapter (server half)
//!
//! - [`PaymentGateway`] - creates payment intents with the provider
//! - [`RazorpayGateway`] - REST implementation
//! - [`signature`] - checkout confirmation verification

pub mod razorpay;
pub mod signature;

pub use razorpay::RazorpayGateway;
pub use signature::{SignatureError, Verification, sign, verify};

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::money::{MoneyError, validate_minor_units};
use shared::payment::PaymentIntent;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] MoneyError),

    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("gateway rejected request ({status}): {body}")]
    Provider { status: u16, body: String },

    #[error("unexpected gateway response: {0}")]
    Malformed(String),
}

impl From<GatewayError> for AppError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::InvalidAmount(m) => AppError::with_message(
                ErrorCode::InvalidAmount,
                format!("Invalid payment amount: {m}"),
            ),
            GatewayError::Transport(e) if e.is_timeout() => {
                tracing::warn!(error = %e, "Payment gateway timed out");
                AppError::new(ErrorCode::GatewayTimeout)
            }
            other => {
                tracing::warn!(error = %other, "Payment gateway unavailable");
                AppError::new(ErrorCode::GatewayUnavailable)
            }
        }
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Reserve `amount` (minor units) with the provider.
    async fn create_intent(
        &self,
        amount: i64,
        currency: &str,
        receipt: Option<&str>,
    ) -> Result<PaymentIntent, GatewayError>;
}

/// Validate a minor-unit amount and create an intent for it.
///
/// Non-positive and fractional amounts are rejected before the provider is
/// contacted.
pub async fn create_intent(
    gateway: &dyn PaymentGateway,
    amount: Decimal,
    currency: &str,
    receipt: Option<&str>,
) -> Result<PaymentIntent, GatewayError> {
    let minor = validate_minor_units(amount)?;
    let intent = gateway.create_intent(minor, currency, receipt).await?;
    tracing::info!(
        gateway_order_id = %intent.gateway_order_id,
        amount = intent.amount,
        currency = %intent.currency,
        "Payment intent created"
    );
    Ok(intent)
}
