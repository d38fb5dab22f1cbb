//! Order API

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use shared::error::AppError;
use shared::models::{
    AddItemRequest, AddItemResponse, CheckoutRequest, CheckoutResponse, OrderAck, OrderDetail,
    PlaceOrderRequest,
};

use super::ApiResult;
use super::json::ApiJson;
use crate::auth::CurrentUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/place_order", post(place_order))
        .route("/{id}", get(get_order))
        .route("/{id}/add_item", post(add_item))
        .route("/{id}/checkout", post(checkout))
        .route("/{id}/cancel", post(cancel))
}

pub async fn list_orders(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<OrderDetail>> {
    Ok(Json(state.orders.list_orders(&user).await?))
}

pub async fn get_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<OrderDetail> {
    Ok(Json(state.orders.get_order(&user, id).await?))
}

pub async fn place_order(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(req): ApiJson<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderDetail>), AppError> {
    let order = state.orders.place_order(&user, &req).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn add_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<AddItemRequest>,
) -> ApiResult<AddItemResponse> {
    Ok(Json(state.orders.add_item(&user, id, &req).await?))
}

pub async fn checkout(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<CheckoutRequest>,
) -> ApiResult<CheckoutResponse> {
    Ok(Json(state.orders.checkout(&user, id, &req).await?))
}

pub async fn cancel(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<OrderAck> {
    Ok(Json(state.orders.cancel(&user, id).await?))
}
