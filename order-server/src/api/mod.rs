//! HTTP API
//!
//! Every `/api/` route requires a bearer token; catalog writes additionally
//! require a superuser.

pub mod health;
pub mod items;
pub mod json;
pub mod orders;
pub mod tables;

use axum::{Json, Router, middleware};
use shared::error::AppError;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::state::AppState;

pub type ApiResult<T> = Result<Json<T>, AppError>;

/// Build the full router with state and middleware applied
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(tables::router())
        .merge(items::router())
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
