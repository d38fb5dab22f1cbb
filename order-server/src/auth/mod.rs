//! Authentication
//!
//! - [`JwtService`]: validates bearer tokens
//! - [`CurrentUser`]: authenticated caller
//! - [`require_auth`] / [`require_admin`]: route middleware

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_admin, require_auth};
