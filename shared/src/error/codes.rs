//! Error codes
//!
//! Every code carries its numeric value, HTTP status and default message in
//! one table row, so the three can never drift apart.
//!
//! | Range | Domain |
//! |-------|--------|
//! | 0xxx  | request validation |
//! | 1xxx  | authentication |
//! | 2xxx  | permission |
//! | 4xxx  | orders |
//! | 6xxx  | menu items |
//! | 7xxx  | tables |
//! | 9xxx  | system |

use http::StatusCode;
use serde::Serialize;
use std::fmt;

macro_rules! error_codes {
    ($($(#[$meta:meta])* $name:ident = $code:literal, $status:ident, $message:literal;)+) => {
        /// Stable numeric error code sent to clients
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        #[serde(into = "u16")]
        #[repr(u16)]
        pub enum ErrorCode {
            $($(#[$meta])* $name = $code,)+
        }

        impl ErrorCode {
            /// Every defined code, in table order
            pub const ALL: &'static [ErrorCode] = &[$(ErrorCode::$name,)+];

            /// Default message shown when no specific one is given
            pub const fn message(&self) -> &'static str {
                match self {
                    $(ErrorCode::$name => $message,)+
                }
            }

            pub fn http_status(&self) -> StatusCode {
                match self {
                    $(ErrorCode::$name => StatusCode::$status,)+
                }
            }
        }
    };
}

error_codes! {
    // Request validation
    ValidationFailed = 2, BAD_REQUEST, "Validation failed";
    /// Body is not valid JSON for the endpoint
    InvalidRequest = 5, BAD_REQUEST, "Invalid request";
    RequiredField = 7, BAD_REQUEST, "Required field is missing";
    ValueOutOfRange = 8, BAD_REQUEST, "Value is out of range";

    // Authentication
    NotAuthenticated = 1001, UNAUTHORIZED, "User is not authenticated";
    TokenExpired = 1003, UNAUTHORIZED, "Authentication token has expired";
    TokenInvalid = 1004, UNAUTHORIZED, "Authentication token is invalid";

    // Permission
    AdminRequired = 2003, FORBIDDEN, "Administrator role is required";

    // Orders
    /// Missing or owned by another user
    OrderNotFound = 4001, NOT_FOUND, "Order not found";
    OrderAlreadyCompleted = 4003, BAD_REQUEST, "Order already completed";
    OrderNotPending = 4008, BAD_REQUEST, "Order not pending";

    // Menu items
    ItemNotFound = 6001, NOT_FOUND, "Item not found";
    ItemInvalidPrice = 6002, BAD_REQUEST, "Item has invalid price";
    /// Referenced by at least one order line
    ItemInUse = 6004, CONFLICT, "Item is referenced by existing orders";

    // Tables
    TableNotFound = 7001, NOT_FOUND, "Table not found";
    /// Held by a pending order
    TableBooked = 7002, CONFLICT, "Table already booked";
    TableNumberExists = 7003, CONFLICT, "Table number already exists";

    // System
    InternalError = 9001, INTERNAL_SERVER_ERROR, "Internal server error";
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
