//! Order state machine
//!
//! ```text
//! pending ──checkout──▶ completed
//!    │
//!    └────cancel─────▶ cancelled ──cancel──▶ cancelled (no-op)
//! ```

use shared::models::{Order, OrderStatus};

use super::error::OrderError;

/// What a cancel request does to an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Pending order becomes cancelled and releases its table
    Cancel,
    /// Already cancelled; acknowledged without touching the order or table
    AlreadyCancelled,
}

/// Only pending orders accept new line items
pub fn ensure_editable(order: &Order) -> Result<(), OrderError> {
    match order.status {
        OrderStatus::Pending => Ok(()),
        status => Err(OrderError::NotPending {
            order_id: order.id,
            status,
        }),
    }
}

/// A repeated checkout is reported separately from other invalid states
pub fn ensure_checkout(order: &Order) -> Result<(), OrderError> {
    match order.status {
        OrderStatus::Pending => Ok(()),
        OrderStatus::Completed => Err(OrderError::AlreadyCompleted(order.id)),
        status => Err(OrderError::NotPending {
            order_id: order.id,
            status,
        }),
    }
}

pub fn cancel_outcome(order: &Order) -> Result<CancelOutcome, OrderError> {
    match order.status {
        OrderStatus::Pending => Ok(CancelOutcome::Cancel),
        OrderStatus::Cancelled => Ok(CancelOutcome::AlreadyCancelled),
        OrderStatus::Completed => Err(OrderError::CannotCancelCompleted(order.id)),
    }
}
