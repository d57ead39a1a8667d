//! Client error types

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// HTTP API errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with an error envelope
    #[error("API error {}: {}", .0.code, .0.message)]
    Api(AppError),

    /// Response did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Server error code, when the server produced one
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Api(e) => Some(e.code),
            _ => None,
        }
    }

    /// Transport failures that a read may retry
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Http(e) => e.is_connect() || e.is_timeout(),
            ClientError::Api(e) => matches!(
                e.code,
                ErrorCode::GatewayUnavailable | ErrorCode::NetworkError
            ),
            _ => false,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Cart mutations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("no active restaurant for {0}")]
    NoActiveRestaurant(String),

    #[error("item {0} is not available")]
    ItemUnavailable(String),

    #[error("quantity {quantity} of item {item_id} exceeds {max}")]
    QuantityTooLarge {
        item_id: String,
        quantity: i64,
        max: i32,
    },
}

/// Cart file persistence
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cart file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cart file could not be encoded: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Payment collection through the hosted checkout
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// The customer closed the checkout
    #[error("payment cancelled")]
    Cancelled,

    /// The gateway reported a failure, or the checkout ended without a result
    #[error("payment failed: {reason}")]
    Failed { reason: String },

    /// No result within the configured bound; distinct from cancellation
    #[error("payment timed out")]
    Timeout,
}

impl PaymentError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PaymentError::Cancelled => ErrorCode::GatewayCancelled,
            PaymentError::Failed { .. } => ErrorCode::PaymentFailed,
            PaymentError::Timeout => ErrorCode::GatewayTimeout,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            PaymentError::Cancelled => "Payment cancelled, you can try again.",
            PaymentError::Failed { .. } => "Payment failed, please try again or contact support.",
            PaymentError::Timeout => {
                "Payment is taking too long. Please check your order history before trying again."
            }
        }
    }
}

/// Checkout orchestration
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart for {0} is empty")]
    EmptyCart(String),

    /// The server would refuse this order; nothing was charged
    #[error("order is invalid: {0}")]
    Invalid(#[from] shared::order::ValidationError),

    #[error("amount cannot be charged: {0}")]
    InvalidAmount(#[from] shared::money::MoneyError),

    /// Payment intent could not be created; nothing was charged
    #[error("could not start payment: {0}")]
    Intent(ClientError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Payment may have been captured but no order was confirmed
    #[error("order was not saved: {0}")]
    OrderNotSaved(ClientError),
}

impl CheckoutError {
    pub fn user_message(&self) -> &'static str {
        match self {
            CheckoutError::EmptyCart(_) => "Your cart is empty.",
            CheckoutError::Invalid(_) => "Please review your order details and try again.",
            CheckoutError::InvalidAmount(_) | CheckoutError::Intent(_) => {
                "Payment could not be started, please try again."
            }
            CheckoutError::Payment(e) => e.user_message(),
            CheckoutError::OrderNotSaved(e) if e.code() == Some(ErrorCode::DuplicatePayment) => {
                "This payment already has an order. Please check your order history."
            }
            CheckoutError::OrderNotSaved(_) => {
                "Your order could not be confirmed. Please check your order history before retrying."
            }
        }
    }
}
