//! Service-layer error type
//!
//! `ServiceError` sits between storage errors and the API-layer [`AppError`],
//! so handlers can use `?` on both without mapping by hand.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::db::StoreError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service-layer error
///
/// - `Db`: storage or infrastructure failure (logged, mapped to `DatabaseError`)
/// - `App`: business-rule error, passed through to the client unchanged
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicatePayment(payment_id) => ServiceError::App(
                AppError::new(ErrorCode::DuplicatePayment)
                    .with_detail("gateway_payment_id", payment_id),
            ),
            StoreError::OrderNotFound(id) => ServiceError::App(
                AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", id),
            ),
            StoreError::StatusChanged {
                id,
                expected,
                actual,
            } => ServiceError::App(
                AppError::with_message(
                    ErrorCode::InvalidTransition,
                    format!("Order {id} is already {actual}"),
                )
                .with_detail("expected", expected.as_str())
                .with_detail("current", actual.as_str()),
            ),
            other => ServiceError::Db(other.into()),
        }
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service storage error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
