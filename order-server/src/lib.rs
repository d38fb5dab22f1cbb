//! order-server: restaurant table and order workflow service
//!
//! - [`orders`]: place / add item / checkout / cancel under row locks
//! - [`catalog`]: table and menu item management
//! - [`db`]: storage abstraction with PostgreSQL and in-memory backends
//! - [`api`]: axum HTTP surface

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod orders;
pub mod state;

pub use config::Config;
pub use state::AppState;

/// Security event log (target `security`)
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
