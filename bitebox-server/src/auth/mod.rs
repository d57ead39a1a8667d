//! Authentication
//!
//! - [`JwtService`] - HS256 bearer tokens
//! - [`CurrentUser`] - caller extracted from the token
//! - [`StaffUser`] - extractor that additionally requires the staff role

pub mod extractor;
pub mod jwt;

pub use extractor::StaffUser;
pub use jwt::{Claims, CurrentUser, JwtError, JwtService, Role};
