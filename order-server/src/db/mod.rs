//! Persistence layer
//!
//! The workflow engine talks to storage only through [`Store`] and
//! [`StoreTx`]. Two backends exist:
//! - [`PgStore`]: PostgreSQL via sqlx, row locks with `SELECT ... FOR UPDATE`
//! - [`MemoryStore`]: process-local, one transaction at a time
//!
//! A [`StoreTx`] dropped without [`StoreTx::commit`] rolls back everything it
//! did.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{DiningTable, Item, Order, OrderItem, TableStatus};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An order joined with its table and line items
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub order: Order,
    pub table: Option<DiningTable>,
    /// Line items in insertion order, each with its current catalog item
    pub lines: Vec<(OrderItem, Item)>,
}

/// Fields of a table row about to be inserted
#[derive(Debug, Clone)]
pub struct NewTable {
    pub number: String,
    pub seats: i32,
    pub note: Option<String>,
}

/// Fields of an item row about to be inserted
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub available: bool,
}

/// Read access plus the entry point for transactions
#[async_trait]
pub trait Store: Send + Sync {
    /// Open a transaction
    async fn begin(&self) -> Result<Box<dyn StoreTx>, BoxError>;

    /// All tables ordered by number
    async fn list_tables(&self) -> Result<Vec<DiningTable>, BoxError>;

    async fn find_table(&self, id: i64) -> Result<Option<DiningTable>, BoxError>;

    /// All items ordered by id
    async fn list_items(&self) -> Result<Vec<Item>, BoxError>;

    async fn find_item(&self, id: i64) -> Result<Option<Item>, BoxError>;

    /// Orders newest first; `owner` restricts to one user
    async fn list_orders(&self, owner: Option<i64>) -> Result<Vec<OrderRecord>, BoxError>;

    async fn find_order(&self, id: i64) -> Result<Option<OrderRecord>, BoxError>;
}

/// One open transaction
#[async_trait]
pub trait StoreTx: Send {
    // ── Tables ──

    /// Exclusive row lock held until commit or rollback
    async fn lock_table(&mut self, id: i64) -> Result<Option<DiningTable>, BoxError>;

    async fn set_table_status(&mut self, id: i64, status: TableStatus) -> Result<(), BoxError>;

    /// Whether another table already uses `number`
    async fn table_number_taken(
        &mut self,
        number: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, BoxError>;

    /// Returns `None` when the number is already taken
    async fn insert_table(&mut self, table: &NewTable) -> Result<Option<DiningTable>, BoxError>;

    /// Writes number, seats and note
    async fn update_table(&mut self, table: &DiningTable) -> Result<(), BoxError>;

    /// Clears the table reference on its orders, returns false if missing
    async fn delete_table(&mut self, id: i64) -> Result<bool, BoxError>;

    // ── Items ──

    async fn find_item(&mut self, id: i64) -> Result<Option<Item>, BoxError>;

    async fn insert_item(&mut self, item: &NewItem) -> Result<Item, BoxError>;

    async fn update_item(&mut self, item: &Item) -> Result<(), BoxError>;

    /// Whether any line item references the item
    async fn item_in_use(&mut self, id: i64) -> Result<bool, BoxError>;

    async fn delete_item(&mut self, id: i64) -> Result<bool, BoxError>;

    // ── Orders ──

    /// Creates a pending order
    async fn insert_order(
        &mut self,
        user_id: i64,
        table_id: Option<i64>,
        now: i64,
    ) -> Result<Order, BoxError>;

    /// Exclusive row lock held until commit or rollback
    async fn lock_order(&mut self, id: i64) -> Result<Option<Order>, BoxError>;

    /// Writes status, name, phone_number and updated_at
    async fn update_order(&mut self, order: &Order) -> Result<(), BoxError>;

    /// Adds `quantity` to the (order, item) line, creating it when absent
    ///
    /// Returns `None`, leaving the line unchanged, when the accumulated
    /// quantity would exceed `max`.
    async fn add_line_item(
        &mut self,
        order_id: i64,
        item_id: i64,
        quantity: i32,
        max: i32,
    ) -> Result<Option<OrderItem>, BoxError>;

    /// Order with table and lines as seen by this transaction
    async fn order_record(&mut self, id: i64) -> Result<Option<OrderRecord>, BoxError>;

    async fn commit(self: Box<Self>) -> Result<(), BoxError>;
}
