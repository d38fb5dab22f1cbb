//! In-memory backend
//!
//! A transaction owns the store mutex from `begin` until it is committed or
//! dropped, so transactions run strictly one after another. Mutations go to a
//! staged copy that replaces the live data on commit.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use shared::models::{DiningTable, Item, Order, OrderItem, OrderStatus, TableStatus};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{BoxError, NewItem, NewTable, OrderRecord, Store, StoreTx};

#[derive(Debug, Clone, Default)]
struct MemoryData {
    tables: BTreeMap<i64, DiningTable>,
    items: BTreeMap<i64, Item>,
    orders: BTreeMap<i64, Order>,
    order_items: BTreeMap<i64, OrderItem>,
    last_id: i64,
}

impl MemoryData {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn record(&self, order: &Order) -> OrderRecord {
        let lines = self
            .order_items
            .values()
            .filter(|line| line.order_id == order.id)
            .filter_map(|line| {
                self.items
                    .get(&line.item_id)
                    .map(|item| (line.clone(), item.clone()))
            })
            .collect();
        OrderRecord {
            order: order.clone(),
            table: order.table_id.and_then(|id| self.tables.get(&id).cloned()),
            lines,
        }
    }
}

/// Process-local store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<MemoryData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, BoxError> {
        let guard = self.data.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTx { guard, staged }))
    }

    async fn list_tables(&self) -> Result<Vec<DiningTable>, BoxError> {
        let data = self.data.lock().await;
        let mut tables: Vec<DiningTable> = data.tables.values().cloned().collect();
        tables.sort_by(|a, b| a.number.cmp(&b.number));
        Ok(tables)
    }

    async fn find_table(&self, id: i64) -> Result<Option<DiningTable>, BoxError> {
        Ok(self.data.lock().await.tables.get(&id).cloned())
    }

    async fn list_items(&self) -> Result<Vec<Item>, BoxError> {
        Ok(self.data.lock().await.items.values().cloned().collect())
    }

    async fn find_item(&self, id: i64) -> Result<Option<Item>, BoxError> {
        Ok(self.data.lock().await.items.get(&id).cloned())
    }

    async fn list_orders(&self, owner: Option<i64>) -> Result<Vec<OrderRecord>, BoxError> {
        let data = self.data.lock().await;
        let mut orders: Vec<&Order> = data
            .orders
            .values()
            .filter(|o| owner.is_none_or(|user_id| o.user_id == user_id))
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders.into_iter().map(|o| data.record(o)).collect())
    }

    async fn find_order(&self, id: i64) -> Result<Option<OrderRecord>, BoxError> {
        let data = self.data.lock().await;
        Ok(data.orders.get(&id).map(|o| data.record(o)))
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<MemoryData>,
    staged: MemoryData,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn lock_table(&mut self, id: i64) -> Result<Option<DiningTable>, BoxError> {
        Ok(self.staged.tables.get(&id).cloned())
    }

    async fn set_table_status(&mut self, id: i64, status: TableStatus) -> Result<(), BoxError> {
        if let Some(table) = self.staged.tables.get_mut(&id) {
            table.status = status;
        }
        Ok(())
    }

    async fn table_number_taken(
        &mut self,
        number: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, BoxError> {
        Ok(self
            .staged
            .tables
            .values()
            .any(|t| t.number == number && Some(t.id) != exclude_id))
    }

    async fn insert_table(&mut self, table: &NewTable) -> Result<Option<DiningTable>, BoxError> {
        if self.table_number_taken(&table.number, None).await? {
            return Ok(None);
        }
        let id = self.staged.next_id();
        let table = DiningTable {
            id,
            number: table.number.clone(),
            seats: table.seats,
            status: TableStatus::Available,
            note: table.note.clone(),
        };
        self.staged.tables.insert(id, table.clone());
        Ok(Some(table))
    }

    async fn update_table(&mut self, table: &DiningTable) -> Result<(), BoxError> {
        if let Some(existing) = self.staged.tables.get_mut(&table.id) {
            existing.number = table.number.clone();
            existing.seats = table.seats;
            existing.note = table.note.clone();
        }
        Ok(())
    }

    async fn delete_table(&mut self, id: i64) -> Result<bool, BoxError> {
        if self.staged.tables.remove(&id).is_none() {
            return Ok(false);
        }
        for order in self.staged.orders.values_mut() {
            if order.table_id == Some(id) {
                order.table_id = None;
            }
        }
        Ok(true)
    }

    async fn find_item(&mut self, id: i64) -> Result<Option<Item>, BoxError> {
        Ok(self.staged.items.get(&id).cloned())
    }

    async fn insert_item(&mut self, item: &NewItem) -> Result<Item, BoxError> {
        let id = self.staged.next_id();
        let item = Item {
            id,
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price,
            available: item.available,
        };
        self.staged.items.insert(id, item.clone());
        Ok(item)
    }

    async fn update_item(&mut self, item: &Item) -> Result<(), BoxError> {
        if let Some(existing) = self.staged.items.get_mut(&item.id) {
            *existing = item.clone();
        }
        Ok(())
    }

    async fn item_in_use(&mut self, id: i64) -> Result<bool, BoxError> {
        Ok(self.staged.order_items.values().any(|l| l.item_id == id))
    }

    async fn delete_item(&mut self, id: i64) -> Result<bool, BoxError> {
        if self.item_in_use(id).await? {
            return Err(format!("item {id} is referenced by order items").into());
        }
        Ok(self.staged.items.remove(&id).is_some())
    }

    async fn insert_order(
        &mut self,
        user_id: i64,
        table_id: Option<i64>,
        now: i64,
    ) -> Result<Order, BoxError> {
        if let Some(table_id) = table_id {
            if !self.staged.tables.contains_key(&table_id) {
                return Err(format!("table {table_id} does not exist").into());
            }
            let held = self
                .staged
                .orders
                .values()
                .any(|o| o.table_id == Some(table_id) && o.status == OrderStatus::Pending);
            if held {
                return Err(format!("table {table_id} already has a pending order").into());
            }
        }
        let id = self.staged.next_id();
        let order = Order {
            id,
            user_id,
            table_id,
            status: OrderStatus::Pending,
            name: None,
            phone_number: None,
            created_at: now,
            updated_at: now,
        };
        self.staged.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn lock_order(&mut self, id: i64) -> Result<Option<Order>, BoxError> {
        Ok(self.staged.orders.get(&id).cloned())
    }

    async fn update_order(&mut self, order: &Order) -> Result<(), BoxError> {
        if let Some(existing) = self.staged.orders.get_mut(&order.id) {
            existing.status = order.status;
            existing.name = order.name.clone();
            existing.phone_number = order.phone_number.clone();
            existing.updated_at = order.updated_at;
        }
        Ok(())
    }

    async fn add_line_item(
        &mut self,
        order_id: i64,
        item_id: i64,
        quantity: i32,
        max: i32,
    ) -> Result<Option<OrderItem>, BoxError> {
        if !self.staged.orders.contains_key(&order_id) {
            return Err(format!("order {order_id} does not exist").into());
        }
        if !self.staged.items.contains_key(&item_id) {
            return Err(format!("item {item_id} does not exist").into());
        }

        let existing = self
            .staged
            .order_items
            .values_mut()
            .find(|l| l.order_id == order_id && l.item_id == item_id);
        if let Some(line) = existing {
            match line.quantity.checked_add(quantity) {
                Some(total) if total <= max => {
                    line.quantity = total;
                    return Ok(Some(line.clone()));
                }
                _ => return Ok(None),
            }
        }

        let id = self.staged.next_id();
        let line = OrderItem {
            id,
            order_id,
            item_id,
            quantity,
        };
        self.staged.order_items.insert(id, line.clone());
        Ok(Some(line))
    }

    async fn order_record(&mut self, id: i64) -> Result<Option<OrderRecord>, BoxError> {
        Ok(self.staged.orders.get(&id).map(|o| self.staged.record(o)))
    }

    async fn commit(self: Box<Self>) -> Result<(), BoxError> {
        let MemoryTx { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn new_table(number: &str) -> NewTable {
        NewTable {
            number: number.to_string(),
            seats: 4,
            note: None,
        }
    }

    #[tokio::test]
    async fn test_drop_without_commit_rolls_back() {
        let store = MemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        tx.insert_table(&new_table("1")).await.unwrap();
        drop(tx);

        assert!(store.list_tables().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commit_publishes_changes() {
        let store = MemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        let table = tx.insert_table(&new_table("1")).await.unwrap().unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.find_table(table.id).await.unwrap(), Some(table));
    }

    #[tokio::test]
    async fn test_duplicate_table_number_rejected() {
        let store = MemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        assert!(tx.insert_table(&new_table("7")).await.unwrap().is_some());
        assert!(tx.insert_table(&new_table("7")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_line_items_accumulate() {
        let store = MemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        let item = tx
            .insert_item(&NewItem {
                name: "Soup".to_string(),
                description: String::new(),
                price: Decimal::new(450, 2),
                available: true,
            })
            .await
            .unwrap();
        let order = tx.insert_order(1, None, 0).await.unwrap();
        let first = tx.add_line_item(order.id, item.id, 2, 10).await.unwrap().unwrap();
        let second = tx.add_line_item(order.id, item.id, 3, 10).await.unwrap().unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.quantity, 5);
        let record = tx.order_record(order.id).await.unwrap().unwrap();
        assert_eq!(record.lines.len(), 1);

        // Past the cap the line is left as it was
        let refused = tx.add_line_item(order.id, item.id, 6, 10).await.unwrap();
        assert!(refused.is_none());
        let record = tx.order_record(order.id).await.unwrap().unwrap();
        assert_eq!(record.lines[0].0.quantity, 5);
    }

    #[tokio::test]
    async fn test_second_pending_order_on_table_rejected() {
        let store = MemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        let table = tx.insert_table(&new_table("3")).await.unwrap().unwrap();
        tx.insert_order(1, Some(table.id), 0).await.unwrap();
        assert!(tx.insert_order(2, Some(table.id), 0).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_table_clears_order_reference() {
        let store = MemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        let table = tx.insert_table(&new_table("9")).await.unwrap().unwrap();
        let order = tx.insert_order(1, Some(table.id), 0).await.unwrap();
        assert!(tx.delete_table(table.id).await.unwrap());
        tx.commit().await.unwrap();

        let record = store.find_order(order.id).await.unwrap().unwrap();
        assert_eq!(record.order.table_id, None);
        assert!(record.table.is_none());
    }
}
