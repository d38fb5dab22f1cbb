//! Dining table API

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
};
use shared::error::AppError;
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate};

use super::ApiResult;
use super::json::ApiJson;
use crate::auth::require_admin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<AppState> {
    let read_routes = Router::new()
        .route("/", get(list_tables))
        .route("/{id}", get(get_table));

    let manage_routes = Router::new()
        .route("/", post(create_table))
        .route("/{id}", put(update_table).delete(delete_table))
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(manage_routes)
}

pub async fn list_tables(State(state): State<AppState>) -> ApiResult<Vec<DiningTable>> {
    Ok(Json(state.catalog.list_tables().await?))
}

pub async fn get_table(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<DiningTable> {
    Ok(Json(state.catalog.get_table(id).await?))
}

pub async fn create_table(
    State(state): State<AppState>,
    ApiJson(data): ApiJson<DiningTableCreate>,
) -> Result<(StatusCode, Json<DiningTable>), AppError> {
    let table = state.catalog.create_table(&data).await?;
    Ok((StatusCode::CREATED, Json(table)))
}

pub async fn update_table(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(data): ApiJson<DiningTableUpdate>,
) -> ApiResult<DiningTable> {
    Ok(Json(state.catalog.update_table(id, &data).await?))
}

pub async fn delete_table(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.catalog.delete_table(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
