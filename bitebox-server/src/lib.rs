//! bitebox-server: order lifecycle REST API
//!
//! - Verifies hosted-checkout payments and creates orders atomically
//! - Assigns sequential order numbers and pickup OTPs
//! - Drives the `pending → ready_to_pick | cancelled` workflow for staff

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod orders;
pub mod payment;
pub mod state;

pub use config::Config;
pub use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Serve the API on an already-bound listener until `shutdown` resolves
pub async fn serve(
    listener: tokio::net::TcpListener,
    state: AppState,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), BoxError> {
    let app = api::create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
