//! Payment API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /payment/create-order | POST | bearer |
//! | /payment/verify-payment | POST | bearer |
//!
//! `/create-order` and `/verify-payment` are kept as aliases for older
//! clients.

mod handler;

use axum::{Router, routing::post};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/payment/create-order", post(handler::create_order))
        .route("/payment/verify-payment", post(handler::verify_payment))
        .route("/create-order", post(handler::create_order))
        .route("/verify-payment", post(handler::verify_payment))
}
