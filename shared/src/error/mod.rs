//! Error system shared by every HTTP-facing layer
//!
//! - [`ErrorCode`]: numeric code, HTTP status and default message
//! - [`ErrorCategory`]: domain of a code, from its range
//! - [`AppError`]: code plus message and optional details
//! - [`ApiResponse`]: the JSON body clients receive
//!
//! ```
//! use shared::error::{AppError, ApiResponse, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::TableBooked);
//! assert_eq!(err.http_status(), shared::http::StatusCode::CONFLICT);
//!
//! let body = ApiResponse::from(AppError::required("table_id"));
//! assert_eq!(body.code.code(), 7);
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::ErrorCode;
pub use types::{ApiResponse, AppError};
