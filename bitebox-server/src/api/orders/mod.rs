//! Order API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /orders | POST | bearer |
//! | /orders | GET | staff |
//! | /orders/count | GET | bearer |
//! | /orders/{user_id} | GET | self or staff |
//! | /orders/id/{id} | GET | owner or staff |
//! | /orders/{id}/status | PUT | staff |
//!
//! Static segments win over captures: `/orders/count` and `/orders/id/...`
//! are never read as a user id, and `PUT /orders/id/status` hits the GET-only
//! single-order route and answers 405. Order ids are numeric, so no real
//! status update is affected.

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    // `{id}` names the user on GET and the order on the status route; the
    // router requires one parameter name per position.
    Router::new()
        .route("/orders", get(handler::list_all).post(handler::create))
        .route("/orders/count", get(handler::count))
        .route("/orders/id/{id}", get(handler::get_by_id))
        .route("/orders/{id}", get(handler::list_for_user))
        .route("/orders/{id}/status", put(handler::update_status))
}
