//! Client configuration

use shared::money::PricingPolicy;
use shared::payment::DEFAULT_CURRENCY;
use std::path::PathBuf;
use std::time::Duration;

/// Client configuration for talking to the order server
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8080")
    pub base_url: String,

    /// Bearer token for authentication
    pub token: Option<String>,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Upper bound on the hosted checkout, from opening to result
    pub checkout_timeout: Duration,

    /// Where the cart session is persisted (None = memory only)
    pub cart_path: Option<PathBuf>,

    /// Quiet period before a cart change is written to disk
    pub persist_debounce: Duration,

    /// Settlement currency for payment intents
    pub currency: String,

    /// Must match the server's pricing policy
    pub pricing: PricingPolicy,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            request_timeout: Duration::from_secs(30),
            checkout_timeout: Duration::from_secs(300),
            cart_path: None,
            persist_debounce: Duration::from_millis(250),
            currency: DEFAULT_CURRENCY.to_string(),
            pricing: PricingPolicy::default(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_checkout_timeout(mut self, timeout: Duration) -> Self {
        self.checkout_timeout = timeout;
        self
    }

    pub fn with_cart_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cart_path = Some(path.into());
        self
    }

    pub fn with_persist_debounce(mut self, debounce: Duration) -> Self {
        self.persist_debounce = debounce;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_pricing(mut self, pricing: PricingPolicy) -> Self {
        self.pricing = pricing;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}
