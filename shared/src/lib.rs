//! Shared types for the order service
//!
//! Domain models, the error system and small utilities used by the server
//! and by tests that talk to it.

pub mod error;
pub mod models;
pub mod util;

pub use error::{AppError, ErrorCode};
pub use http;
