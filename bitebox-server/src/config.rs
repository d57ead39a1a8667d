//! Order server configuration

use rust_decimal::Decimal;
use shared::money::{DEFAULT_DELIVERY_FEE, DEFAULT_TAX_RATE_BPS, PricingPolicy};
use shared::payment::DEFAULT_CURRENCY;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Order server configuration
///
/// | Variable | Default | Notes |
/// |----------|---------|-------|
/// | `ENVIRONMENT` | development | development \| staging \| production |
/// | `HTTP_PORT` | 8080 | |
/// | `DATABASE_URL` | (none) | required outside development; in-memory store otherwise |
/// | `JWT_SECRET` | dev value | required outside development |
/// | `RAZORPAY_KEY_ID` | dev value | required outside development |
/// | `RAZORPAY_KEY_SECRET` | dev value | required outside development |
/// | `RAZORPAY_API_BASE` | https://api.razorpay.com/v1 | |
/// | `GATEWAY_TIMEOUT_MS` | 10000 | outbound gateway request timeout |
/// | `CURRENCY` | INR | |
/// | `DELIVERY_FEE` | 30 | major units |
/// | `TAX_RATE_BPS` | 800 | basis points |
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL (None = in-memory store)
    pub database_url: Option<String>,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// JWT secret for bearer token validation
    pub jwt_secret: String,
    /// Gateway API key id (basic auth user)
    pub razorpay_key_id: String,
    /// Gateway API key secret (basic auth password and signature key)
    pub razorpay_key_secret: String,
    /// Gateway REST base URL
    pub razorpay_api_base: String,
    /// Outbound gateway request timeout (ms)
    pub gateway_timeout_ms: u64,
    /// Settlement currency
    pub currency: String,
    /// Delivery fee and tax applied to every order
    pub pricing: PricingPolicy,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let database_url = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());
        if database_url.is_none() && environment != "development" {
            return Err(format!("DATABASE_URL must be set in {environment} environment").into());
        }

        let delivery_fee = match std::env::var("DELIVERY_FEE") {
            Ok(v) => v
                .parse::<Decimal>()
                .map_err(|e| format!("DELIVERY_FEE is not a decimal: {e}"))?,
            Err(_) => DEFAULT_DELIVERY_FEE,
        };

        Ok(Self {
            database_url,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: environment.clone(),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            razorpay_key_id: Self::require_secret("RAZORPAY_KEY_ID", &environment)?,
            razorpay_key_secret: Self::require_secret("RAZORPAY_KEY_SECRET", &environment)?,
            razorpay_api_base: std::env::var("RAZORPAY_API_BASE")
                .unwrap_or_else(|_| "https://api.razorpay.com/v1".into()),
            gateway_timeout_ms: std::env::var("GATEWAY_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10_000),
            currency: std::env::var("CURRENCY").unwrap_or_else(|_| DEFAULT_CURRENCY.into()),
            pricing: PricingPolicy::new(
                delivery_fee,
                std::env::var("TAX_RATE_BPS")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(DEFAULT_TAX_RATE_BPS),
            ),
        })
    }

    /// Development configuration with fixed secrets, for tests and local runs
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            http_port: 0,
            environment: "development".into(),
            jwt_secret: "test-jwt-secret".into(),
            razorpay_key_id: "rzp_test_key".into(),
            razorpay_key_secret: "rzp_test_secret".into(),
            razorpay_api_base: "http://127.0.0.1:9/v1".into(),
            gateway_timeout_ms: 1_000,
            currency: DEFAULT_CURRENCY.into(),
            pricing: PricingPolicy::default(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
