//! Bitebox client library
//!
//! Per-restaurant carts with write-behind persistence, the client half of
//! the hosted payment checkout, and an HTTP client for the order server.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod http;
pub mod payment;

pub use cart::CartStore;
pub use catalog::{Catalog, StaticCatalog};
pub use checkout::{CheckoutDetails, CheckoutFlow};
pub use config::ClientConfig;
pub use error::{CartError, CheckoutError, ClientError, ClientResult, PaymentError, PersistError};
pub use http::HttpClient;
pub use payment::{CheckoutOutcome, CheckoutResolver, HostedCheckout, collect_payment};

// Re-export shared types for convenience
pub use shared::order::{Order, OrderStatus};
pub use shared::payment::{CheckoutPrefill, PaymentConfirmation, PaymentIntent};
