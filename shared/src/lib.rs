//! Shared types for Bitebox
//!
//! Wire types used by both the order server and the client library:
//! error codes and the API envelope, the order model and its status
//! workflow, payment gateway payloads, catalog snapshots and money helpers.

pub mod error;
pub mod money;
pub mod order;
pub mod payment;
pub mod restaurant;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use rust_decimal::Decimal;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use money::{PricingPolicy, Quote};
pub use order::{Order, OrderLine, OrderStatus, PaymentMethod};
pub use payment::{PaymentConfirmation, PaymentIntent};
pub use restaurant::{MenuItem, RestaurantInfo};
