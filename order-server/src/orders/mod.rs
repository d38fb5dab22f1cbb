//! Order workflow engine
//!
//! Each operation is one short transaction: lock, re-check state, mutate,
//! read back the snapshot, commit. Any error before commit drops the
//! transaction and rolls everything back.
//!
//! Lock order:
//! - `place_order` locks the table row, then inserts the order
//! - `add_item` / `checkout` / `cancel` lock the order row, then touch its table

pub mod error;
pub mod input;
pub mod money;
pub mod snapshot;
pub mod transitions;


use std::sync::Arc;

use shared::models::{
    AddItemRequest, AddItemResponse, CheckoutRequest, CheckoutResponse, Order, OrderAck,
    OrderDetail, OrderItem, OrderStatus, PlaceOrderRequest, TableStatus,
};
use shared::util::now_millis;

use crate::auth::CurrentUser;
use crate::db::{OrderRecord, Store, StoreTx};

pub use error::OrderError;
use input::LineRequest;
use money::{MAX_LINE_QUANTITY, MAX_QUANTITY};
use transitions::CancelOutcome;

/// Order workflow service
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn Store>,
}

impl OrderService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Reserve a table and create a pending order with its line items
    pub async fn place_order(
        &self,
        user: &CurrentUser,
        req: &PlaceOrderRequest,
    ) -> Result<OrderDetail, OrderError> {
        let place = input::place_order(req)?;

        let mut tx = self.store.begin().await?;

        // The locked read is the authority on table status
        let table = tx
            .lock_table(place.table_id)
            .await?
            .ok_or(OrderError::TableNotFound(place.table_id))?;
        if table.status == TableStatus::Booked {
            tracing::info!(
                table_id = table.id,
                user_id = user.id,
                "Place order rejected: table already booked"
            );
            return Err(OrderError::TableBooked(table.id));
        }

        tx.set_table_status(table.id, TableStatus::Booked).await?;
        let order = tx
            .insert_order(user.id, Some(table.id), now_millis())
            .await?;

        for line in &place.lines {
            if tx.find_item(line.item_id).await?.is_none() {
                return Err(OrderError::ItemNotFound(line.item_id));
            }
            add_line(tx.as_mut(), order.id, line).await?;
        }

        let record = read_back(tx.as_mut(), order.id).await?;
        tx.commit().await?;

        tracing::info!(
            order_id = order.id,
            table_id = table.id,
            user_id = user.id,
            lines = place.lines.len(),
            "Order placed"
        );
        Ok(snapshot::order_detail(record))
    }

    /// Add to a pending order, accumulating into an existing line
    pub async fn add_item(
        &self,
        user: &CurrentUser,
        order_id: i64,
        req: &AddItemRequest,
    ) -> Result<AddItemResponse, OrderError> {
        let line = input::add_item(req)?;

        let mut tx = self.store.begin().await?;
        let mut order = lock_visible(tx.as_mut(), user, order_id).await?;
        transitions::ensure_editable(&order)?;

        if tx.find_item(line.item_id).await?.is_none() {
            return Err(OrderError::ItemNotFound(line.item_id));
        }
        let stored = add_line(tx.as_mut(), order.id, &line).await?;

        order.updated_at = now_millis();
        tx.update_order(&order).await?;

        let record = read_back(tx.as_mut(), order.id).await?;
        tx.commit().await?;

        tracing::info!(
            order_id,
            item_id = line.item_id,
            quantity = line.quantity,
            line_quantity = stored.quantity,
            "Item added to order"
        );
        Ok(AddItemResponse {
            status: "item added".to_string(),
            order_id,
            order: snapshot::order_detail(record),
        })
    }

    /// Record customer details, complete the order and release its table
    pub async fn checkout(
        &self,
        user: &CurrentUser,
        order_id: i64,
        req: &CheckoutRequest,
    ) -> Result<CheckoutResponse, OrderError> {
        let mut tx = self.store.begin().await?;
        let mut order = lock_visible(tx.as_mut(), user, order_id).await?;

        // Status before inputs: a repeated checkout reports AlreadyCompleted
        // even with an empty body
        transitions::ensure_checkout(&order)?;
        let details = input::checkout(req)?;

        order.name = Some(details.name);
        order.phone_number = Some(details.phone);
        order.status = OrderStatus::Completed;
        order.updated_at = now_millis();
        tx.update_order(&order).await?;
        release_table(tx.as_mut(), &order).await?;

        let record = read_back(tx.as_mut(), order.id).await?;
        tx.commit().await?;

        tracing::info!(order_id, table_id = ?order.table_id, "Order checked out");
        Ok(CheckoutResponse {
            message: "Checkout successful".to_string(),
            order: snapshot::order_detail(record),
        })
    }

    /// Cancel a pending order and release its table
    ///
    /// Cancelling an already cancelled order is acknowledged again without
    /// touching the table, which may since have been booked by another order.
    pub async fn cancel(&self, user: &CurrentUser, order_id: i64) -> Result<OrderAck, OrderError> {
        let mut tx = self.store.begin().await?;
        let mut order = lock_visible(tx.as_mut(), user, order_id).await?;

        match transitions::cancel_outcome(&order)? {
            CancelOutcome::Cancel => {
                order.status = OrderStatus::Cancelled;
                order.updated_at = now_millis();
                tx.update_order(&order).await?;
                release_table(tx.as_mut(), &order).await?;
                tx.commit().await?;
                tracing::info!(order_id, table_id = ?order.table_id, "Order cancelled");
            }
            CancelOutcome::AlreadyCancelled => {
                tracing::debug!(order_id, "Order already cancelled");
            }
        }

        Ok(OrderAck {
            status: "order cancelled".to_string(),
            order_id,
        })
    }

    pub async fn get_order(
        &self,
        user: &CurrentUser,
        order_id: i64,
    ) -> Result<OrderDetail, OrderError> {
        let record = self
            .store
            .find_order(order_id)
            .await?
            .filter(|r| user.can_view(r.order.user_id))
            .ok_or(OrderError::OrderNotFound(order_id))?;
        Ok(snapshot::order_detail(record))
    }

    /// Newest first; superusers see every order
    pub async fn list_orders(&self, user: &CurrentUser) -> Result<Vec<OrderDetail>, OrderError> {
        let owner = (!user.is_superuser).then_some(user.id);
        let records = self.store.list_orders(owner).await?;
        Ok(records.into_iter().map(snapshot::order_detail).collect())
    }
}

/// Lock an order row, hiding orders the caller may not see
async fn lock_visible(
    tx: &mut dyn StoreTx,
    user: &CurrentUser,
    order_id: i64,
) -> Result<Order, OrderError> {
    tx.lock_order(order_id)
        .await?
        .filter(|o| user.can_view(o.user_id))
        .ok_or(OrderError::OrderNotFound(order_id))
}

async fn add_line(
    tx: &mut dyn StoreTx,
    order_id: i64,
    line: &LineRequest,
) -> Result<OrderItem, OrderError> {
    tx.add_line_item(order_id, line.item_id, line.quantity, MAX_LINE_QUANTITY)
        .await?
        .ok_or(OrderError::LineQuantityExceeded {
            item_id: line.item_id,
            max: MAX_QUANTITY,
        })
}

async fn release_table(tx: &mut dyn StoreTx, order: &Order) -> Result<(), OrderError> {
    if let Some(table_id) = order.table_id {
        tx.set_table_status(table_id, TableStatus::Available)
            .await?;
    }
    Ok(())
}

async fn read_back(tx: &mut dyn StoreTx, order_id: i64) -> Result<OrderRecord, OrderError> {
    tx.order_record(order_id)
        .await?
        .ok_or_else(|| {
            OrderError::Storage(format!("order {order_id} vanished mid-transaction").into())
        })
}
