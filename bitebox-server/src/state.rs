//! Application state

use std::sync::Arc;
use std::time::Duration;

use crate::auth::JwtService;
use crate::config::Config;
use crate::db::{MemoryOrderStore, OrderStore, PgOrderStore};
use crate::orders::OrderService;
use crate::payment::{PaymentGateway, RazorpayGateway};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub orders: OrderService,
    pub gateway: Arc<dyn PaymentGateway>,
    pub jwt: JwtService,
    /// Merchant key secret, used to verify checkout signatures
    pub key_secret: Arc<str>,
    /// Currency used when a create-intent request names none
    pub currency: Arc<str>,
}

impl AppState {
    /// Build state from configuration, connecting to PostgreSQL when
    /// `DATABASE_URL` is set and falling back to the in-memory store otherwise.
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let store: Arc<dyn OrderStore> = match &config.database_url {
            Some(url) => {
                let store = PgOrderStore::connect(url).await?;
                tracing::info!("Connected to PostgreSQL, migrations applied");
                Arc::new(store)
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory order store");
                Arc::new(MemoryOrderStore::new())
            }
        };

        let gateway = RazorpayGateway::new(
            &config.razorpay_api_base,
            &config.razorpay_key_id,
            &config.razorpay_key_secret,
            Duration::from_millis(config.gateway_timeout_ms),
        )?;

        Ok(Self::with_parts(config, store, Arc::new(gateway)))
    }

    /// Assemble state from explicit collaborators
    pub fn with_parts(
        config: &Config,
        store: Arc<dyn OrderStore>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            orders: OrderService::new(store, config.pricing, &config.razorpay_key_secret),
            gateway,
            jwt: JwtService::new(&config.jwt_secret),
            key_secret: Arc::from(config.razorpay_key_secret.as_str()),
            currency: Arc::from(config.currency.as_str()),
        }
    }
}
