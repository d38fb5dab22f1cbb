//! Menu item API

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
};
use shared::error::AppError;
use shared::models::{Item, ItemCreate, ItemUpdate};

use super::ApiResult;
use super::json::ApiJson;
use crate::auth::require_admin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/items", routes())
}

fn routes() -> Router<AppState> {
    let read_routes = Router::new()
        .route("/", get(list_items))
        .route("/{id}", get(get_item));

    let manage_routes = Router::new()
        .route("/", post(create_item))
        .route("/{id}", put(update_item).delete(delete_item))
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(manage_routes)
}

pub async fn list_items(State(state): State<AppState>) -> ApiResult<Vec<Item>> {
    Ok(Json(state.catalog.list_items().await?))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Item> {
    Ok(Json(state.catalog.get_item(id).await?))
}

pub async fn create_item(
    State(state): State<AppState>,
    ApiJson(data): ApiJson<ItemCreate>,
) -> Result<(StatusCode, Json<Item>), AppError> {
    let item = state.catalog.create_item(&data).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(data): ApiJson<ItemUpdate>,
) -> ApiResult<Item> {
    Ok(Json(state.catalog.update_item(id, &data).await?))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.catalog.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
