use shared::error::{AppError, ErrorCode};
use shared::models::OrderStatus;
use thiserror::Error;

use crate::db::BoxError;

/// Workflow errors
///
/// Every variant except `Storage` is a rejected request that left the store
/// untouched.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("{0} required")]
    MissingField(&'static str),

    #[error("quantity must be between 1 and {max}, got {quantity}")]
    InvalidQuantity { quantity: i64, max: i64 },

    #[error("quantity of item {item_id} would exceed {max}")]
    LineQuantityExceeded { item_id: i64, max: i64 },

    #[error("{0}")]
    Validation(String),

    #[error("Table {0} not found")]
    TableNotFound(i64),

    #[error("Item {0} not found")]
    ItemNotFound(i64),

    #[error("Order {0} not found")]
    OrderNotFound(i64),

    #[error("Table already booked")]
    TableBooked(i64),

    #[error("Order not pending")]
    NotPending { order_id: i64, status: OrderStatus },

    #[error("Order already completed")]
    AlreadyCompleted(i64),

    #[error("Cannot cancel completed order")]
    CannotCancelCompleted(i64),

    #[error("Storage error: {0}")]
    Storage(BoxError),
}

impl From<BoxError> for OrderError {
    fn from(e: BoxError) -> Self {
        OrderError::Storage(e)
    }
}

impl OrderError {
    pub fn code(&self) -> ErrorCode {
        match self {
            OrderError::MissingField(_) => ErrorCode::RequiredField,
            OrderError::InvalidQuantity { .. } | OrderError::LineQuantityExceeded { .. } => {
                ErrorCode::ValueOutOfRange
            }
            OrderError::Validation(_) => ErrorCode::ValidationFailed,
            OrderError::TableNotFound(_) => ErrorCode::TableNotFound,
            OrderError::ItemNotFound(_) => ErrorCode::ItemNotFound,
            OrderError::OrderNotFound(_) => ErrorCode::OrderNotFound,
            OrderError::TableBooked(_) => ErrorCode::TableBooked,
            OrderError::NotPending { .. } | OrderError::CannotCancelCompleted(_) => {
                ErrorCode::OrderNotPending
            }
            OrderError::AlreadyCompleted(_) => ErrorCode::OrderAlreadyCompleted,
            OrderError::Storage(_) => ErrorCode::InternalError,
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        let code = err.code();
        match err {
            OrderError::Storage(e) => {
                tracing::error!(error = %e, "Order workflow storage error");
                AppError::new(code)
            }
            OrderError::MissingField(field) => AppError::required(field),
            OrderError::InvalidQuantity { quantity, max } => {
                AppError::with_message(code, err.to_string())
                    .with_detail("quantity", quantity)
                    .with_detail("max", max)
            }
            OrderError::LineQuantityExceeded { item_id, max } => {
                AppError::with_message(code, err.to_string())
                    .with_detail("item_id", item_id)
                    .with_detail("max", max)
            }
            OrderError::TableNotFound(id) | OrderError::TableBooked(id) => {
                AppError::with_message(code, err.to_string()).with_detail("table_id", id)
            }
            OrderError::ItemNotFound(id) => {
                AppError::with_message(code, err.to_string()).with_detail("item_id", id)
            }
            OrderError::OrderNotFound(id)
            | OrderError::AlreadyCompleted(id)
            | OrderError::CannotCancelCompleted(id) => {
                AppError::with_message(code, err.to_string()).with_detail("order_id", id)
            }
            OrderError::NotPending { order_id, status } => {
                AppError::with_message(code, err.to_string())
                    .with_detail("order_id", order_id)
                    .with_detail("status", status.as_str())
            }
            OrderError::Validation(_) => AppError::with_message(code, err.to_string()),
        }
    }
}
