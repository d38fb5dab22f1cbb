//! PostgreSQL backend
//!
//! Status columns are TEXT with CHECK constraints; rows are read into
//! string-typed structs and parsed here.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{DiningTable, Item, Order, OrderItem, TableStatus};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use super::{BoxError, NewItem, NewTable, OrderRecord, Store, StoreTx};

const TABLE_COLUMNS: &str = "id, number, seats, status, note";
const ORDER_COLUMNS: &str =
    "id, user_id, table_id, status, name, phone_number, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct TableRow {
    id: i64,
    number: String,
    seats: i32,
    status: String,
    note: Option<String>,
}

impl TryFrom<TableRow> for DiningTable {
    type Error = BoxError;

    fn try_from(row: TableRow) -> Result<Self, Self::Error> {
        Ok(DiningTable {
            id: row.id,
            number: row.number,
            seats: row.seats,
            status: row.status.parse()?,
            note: row.note,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    table_id: Option<i64>,
    status: String,
    name: Option<String>,
    phone_number: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<OrderRow> for Order {
    type Error = BoxError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: row.id,
            user_id: row.user_id,
            table_id: row.table_id,
            status: row.status.parse()?,
            name: row.name,
            phone_number: row.phone_number,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Line item joined with its catalog item
#[derive(sqlx::FromRow)]
struct LineRow {
    id: i64,
    order_id: i64,
    item_id: i64,
    quantity: i32,
    name: String,
    description: String,
    price: Decimal,
    available: bool,
}

impl LineRow {
    fn split(self) -> (OrderItem, Item) {
        (
            OrderItem {
                id: self.id,
                order_id: self.order_id,
                item_id: self.item_id,
                quantity: self.quantity,
            },
            Item {
                id: self.item_id,
                name: self.name,
                description: self.description,
                price: self.price,
                available: self.available,
            },
        )
    }
}

// ── Shared queries (pool connection or transaction) ──

async fn fetch_table(conn: &mut PgConnection, id: i64) -> Result<Option<DiningTable>, BoxError> {
    let row: Option<TableRow> = sqlx::query_as(&format!(
        "SELECT {TABLE_COLUMNS} FROM dining_tables WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    row.map(DiningTable::try_from).transpose()
}

async fn fetch_item(conn: &mut PgConnection, id: i64) -> Result<Option<Item>, BoxError> {
    let item: Option<Item> = sqlx::query_as(
        "SELECT id, name, description, price, available FROM items WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(item)
}

/// Attach tables and line items to a batch of orders, preserving their order
async fn assemble(
    conn: &mut PgConnection,
    orders: Vec<Order>,
) -> Result<Vec<OrderRecord>, BoxError> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }
    let order_ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let table_ids: Vec<i64> = orders.iter().filter_map(|o| o.table_id).collect();

    let table_rows: Vec<TableRow> = sqlx::query_as(&format!(
        "SELECT {TABLE_COLUMNS} FROM dining_tables WHERE id = ANY($1)"
    ))
    .bind(&table_ids)
    .fetch_all(&mut *conn)
    .await?;
    let mut tables = HashMap::with_capacity(table_rows.len());
    for row in table_rows {
        let table = DiningTable::try_from(row)?;
        tables.insert(table.id, table);
    }

    let line_rows: Vec<LineRow> = sqlx::query_as(
        r#"
        SELECT oi.id, oi.order_id, oi.item_id, oi.quantity,
               i.name, i.description, i.price, i.available
        FROM order_items oi
        JOIN items i ON i.id = oi.item_id
        WHERE oi.order_id = ANY($1)
        ORDER BY oi.order_id, oi.id
        "#,
    )
    .bind(&order_ids)
    .fetch_all(&mut *conn)
    .await?;
    let mut lines: HashMap<i64, Vec<(OrderItem, Item)>> = HashMap::new();
    for row in line_rows {
        lines.entry(row.order_id).or_default().push(row.split());
    }

    Ok(orders
        .into_iter()
        .map(|order| OrderRecord {
            table: order.table_id.and_then(|id| tables.get(&id).cloned()),
            lines: lines.remove(&order.id).unwrap_or_default(),
            order,
        })
        .collect())
}

async fn fetch_record(conn: &mut PgConnection, id: i64) -> Result<Option<OrderRecord>, BoxError> {
    let row: Option<OrderRow> = sqlx::query_as(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    let Some(row) = row else {
        return Ok(None);
    };
    let mut records = assemble(conn, vec![Order::try_from(row)?]).await?;
    Ok(records.pop())
}

// ── Store ──

/// PostgreSQL-backed store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and apply pending migrations
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!(max_connections, "PostgreSQL store ready");

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, BoxError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }

    async fn list_tables(&self) -> Result<Vec<DiningTable>, BoxError> {
        let rows: Vec<TableRow> = sqlx::query_as(&format!(
            "SELECT {TABLE_COLUMNS} FROM dining_tables ORDER BY number"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(DiningTable::try_from).collect()
    }

    async fn find_table(&self, id: i64) -> Result<Option<DiningTable>, BoxError> {
        let mut conn = self.pool.acquire().await?;
        fetch_table(&mut conn, id).await
    }

    async fn list_items(&self) -> Result<Vec<Item>, BoxError> {
        let items: Vec<Item> = sqlx::query_as(
            "SELECT id, name, description, price, available FROM items ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn find_item(&self, id: i64) -> Result<Option<Item>, BoxError> {
        let mut conn = self.pool.acquire().await?;
        fetch_item(&mut conn, id).await
    }

    async fn list_orders(&self, owner: Option<i64>) -> Result<Vec<OrderRecord>, BoxError> {
        let mut conn = self.pool.acquire().await?;
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE ($1::BIGINT IS NULL OR user_id = $1)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(owner)
        .fetch_all(&mut *conn)
        .await?;
        let orders = rows
            .into_iter()
            .map(Order::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        assemble(&mut conn, orders).await
    }

    async fn find_order(&self, id: i64) -> Result<Option<OrderRecord>, BoxError> {
        let mut conn = self.pool.acquire().await?;
        fetch_record(&mut conn, id).await
    }
}

// ── Transaction ──

struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn lock_table(&mut self, id: i64) -> Result<Option<DiningTable>, BoxError> {
        let row: Option<TableRow> = sqlx::query_as(&format!(
            "SELECT {TABLE_COLUMNS} FROM dining_tables WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(DiningTable::try_from).transpose()
    }

    async fn set_table_status(&mut self, id: i64, status: TableStatus) -> Result<(), BoxError> {
        sqlx::query("UPDATE dining_tables SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn table_number_taken(
        &mut self,
        number: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, BoxError> {
        let (taken,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM dining_tables
                WHERE number = $1 AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(number)
        .bind(exclude_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(taken)
    }

    async fn insert_table(&mut self, table: &NewTable) -> Result<Option<DiningTable>, BoxError> {
        let row: Option<TableRow> = sqlx::query_as(&format!(
            r#"
            INSERT INTO dining_tables (number, seats, status, note)
            VALUES ($1, $2, 'available', $3)
            ON CONFLICT (number) DO NOTHING
            RETURNING {TABLE_COLUMNS}
            "#
        ))
        .bind(&table.number)
        .bind(table.seats)
        .bind(&table.note)
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(DiningTable::try_from).transpose()
    }

    async fn update_table(&mut self, table: &DiningTable) -> Result<(), BoxError> {
        sqlx::query("UPDATE dining_tables SET number = $1, seats = $2, note = $3 WHERE id = $4")
            .bind(&table.number)
            .bind(table.seats)
            .bind(&table.note)
            .bind(table.id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn delete_table(&mut self, id: i64) -> Result<bool, BoxError> {
        // orders.table_id is ON DELETE SET NULL
        let result = sqlx::query("DELETE FROM dining_tables WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_item(&mut self, id: i64) -> Result<Option<Item>, BoxError> {
        fetch_item(&mut self.tx, id).await
    }

    async fn insert_item(&mut self, item: &NewItem) -> Result<Item, BoxError> {
        let item: Item = sqlx::query_as(
            r#"
            INSERT INTO items (name, description, price, available)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, price, available
            "#,
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(item.available)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(item)
    }

    async fn update_item(&mut self, item: &Item) -> Result<(), BoxError> {
        sqlx::query(
            "UPDATE items SET name = $1, description = $2, price = $3, available = $4 WHERE id = $5",
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(item.available)
        .bind(item.id)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn item_in_use(&mut self, id: i64) -> Result<bool, BoxError> {
        let (in_use,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM order_items WHERE item_id = $1)")
                .bind(id)
                .fetch_one(&mut *self.tx)
                .await?;
        Ok(in_use)
    }

    async fn delete_item(&mut self, id: i64) -> Result<bool, BoxError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_order(
        &mut self,
        user_id: i64,
        table_id: Option<i64>,
        now: i64,
    ) -> Result<Order, BoxError> {
        let row: OrderRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO orders (user_id, table_id, status, created_at, updated_at)
            VALUES ($1, $2, 'pending', $3, $3)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(table_id)
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await?;
        Order::try_from(row)
    }

    async fn lock_order(&mut self, id: i64) -> Result<Option<Order>, BoxError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(Order::try_from).transpose()
    }

    async fn update_order(&mut self, order: &Order) -> Result<(), BoxError> {
        sqlx::query(
            r#"
            UPDATE orders
            SET status = $1, name = $2, phone_number = $3, updated_at = $4
            WHERE id = $5
            "#,
        )
        .bind(order.status.as_str())
        .bind(&order.name)
        .bind(&order.phone_number)
        .bind(order.updated_at)
        .bind(order.id)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn add_line_item(
        &mut self,
        order_id: i64,
        item_id: i64,
        quantity: i32,
        max: i32,
    ) -> Result<Option<OrderItem>, BoxError> {
        // A conflicting row that fails the WHERE is left alone and returns nothing
        let line: Option<OrderItem> = sqlx::query_as(
            r#"
            INSERT INTO order_items (order_id, item_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (order_id, item_id)
            DO UPDATE SET quantity = order_items.quantity + EXCLUDED.quantity
            WHERE order_items.quantity + EXCLUDED.quantity <= $4
            RETURNING id, order_id, item_id, quantity
            "#,
        )
        .bind(order_id)
        .bind(item_id)
        .bind(quantity)
        .bind(max)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(line)
    }

    async fn order_record(&mut self, id: i64) -> Result<Option<OrderRecord>, BoxError> {
        fetch_record(&mut self.tx, id).await
    }

    async fn commit(self: Box<Self>) -> Result<(), BoxError> {
        self.tx.commit().await?;
        Ok(())
    }
}
