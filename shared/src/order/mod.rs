//! Order model
//!
//! - `status`: the workflow shared by customer and staff views
//! - `types`: persisted order, lines and request/response bodies
//! - `validate`: create-order input checks run by both client and server

pub mod status;
pub mod types;
pub mod validate;

// Re-exports
pub use status::{OrderStatus, TransitionError, UnknownStatus};
pub use types::*;
pub use validate::{MAX_QUANTITY, ValidationError, validate_create};
