//! HTTP routes
//!
//! - [`health`] - liveness
//! - [`payment`] - payment intents and confirmation checks
//! - [`orders`] - order lifecycle

pub mod health;
pub mod orders;
pub mod payment;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use http::HeaderName;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_BODY_BYTES: usize = 64 * 1024;

/// All routes, without middleware
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(payment::router())
        .merge(orders::router())
}

/// Fully configured application, used by the binary and by tests
pub fn create_router(state: AppState) -> Router {
    build_router()
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            MakeRequestUuid,
        ))
        .with_state(state)
}
