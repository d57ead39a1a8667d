//! Order service
//!
//! Validation, order-number and OTP assignment, persistence, and the status
//! workflow. HTTP handlers live in [`crate::api::orders`].

pub mod otp;
pub mod service;

pub use service::OrderService;

use shared::error::{AppError, ErrorCode};
use shared::order::{TransitionError, ValidationError};
use thiserror::Error;

use crate::db::StoreError;
use crate::error::ServiceError;
use crate::payment::SignatureError;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("restaurant not found: {0}")]
    RestaurantNotFound(String),

    #[error("online orders require a payment confirmation")]
    PaymentRequired,

    #[error("cash orders must not carry a payment confirmation")]
    UnexpectedPayment,

    #[error("payment signature rejected")]
    PaymentRejected,

    #[error("malformed payment confirmation: {0}")]
    MalformedPayment(#[from] SignatureError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("order not found: {0}")]
    NotFound(i64),

    #[error("order could not be saved: {0}")]
    Persistence(StoreError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for OrderError {
    fn from(e: StoreError) -> Self {
        OrderError::Store(e)
    }
}

impl From<OrderError> for ServiceError {
    fn from(e: OrderError) -> Self {
        let app = match e {
            OrderError::Store(store) => return ServiceError::from(store),
            OrderError::Persistence(store) => {
                tracing::error!(error = %store, "Order insert failed");
                AppError::with_message(
                    ErrorCode::DatabaseError,
                    "Your order could not be saved. Please check your order history before retrying.",
                )
            }
            OrderError::Invalid(ValidationError::Invalid(msg)) => AppError::validation(msg),
            OrderError::Invalid(ValidationError::Empty) => AppError::new(ErrorCode::OrderEmpty),
            OrderError::Invalid(ValidationError::TotalMismatch {
                field,
                expected,
                submitted,
            }) => AppError::with_message(
                ErrorCode::OrderTotalMismatch,
                format!("{field} does not match the server calculation"),
            )
            .with_detail("field", field)
            .with_detail("expected", expected.to_string())
            .with_detail("submitted", submitted.to_string()),
            OrderError::RestaurantNotFound(id) => {
                AppError::new(ErrorCode::RestaurantNotFound).with_detail("restaurant_id", id)
            }
            OrderError::PaymentRequired => AppError::with_message(
                ErrorCode::PaymentVerificationFailed,
                "Online orders require a payment confirmation",
            ),
            OrderError::UnexpectedPayment => AppError::with_message(
                ErrorCode::PaymentInvalidMethod,
                "Cash orders must not carry a payment confirmation",
            ),
            OrderError::PaymentRejected => AppError::new(ErrorCode::PaymentVerificationFailed),
            OrderError::MalformedPayment(err) => {
                AppError::with_message(ErrorCode::PaymentVerificationFailed, err.to_string())
            }
            OrderError::Transition(err) => {
                AppError::with_message(ErrorCode::InvalidTransition, err.to_string())
                    .with_detail("from", err.from.as_str())
                    .with_detail("to", err.to.as_str())
            }
            OrderError::NotFound(id) => {
                AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", id)
            }
        };
        ServiceError::App(app)
    }
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        ServiceError::from(e).into()
    }
}
