//! Order workflow against a real PostgreSQL database.
//!
//! Ignored by default. Run with:
//!
//! ```text
//! DATABASE_URL=postgres://... cargo test -p order-server --test postgres_store -- --ignored
//! ```

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use order_server::auth::CurrentUser;
use order_server::db::{NewItem, NewTable, PgStore, Store};
use order_server::orders::{OrderError, OrderService};
use rust_decimal::Decimal;
use shared::models::{
    AddItemRequest, CheckoutRequest, LineItemInput, OrderStatus, PlaceOrderRequest, TableStatus,
};

static SEQ: AtomicU32 = AtomicU32::new(0);

struct Seed {
    store: Arc<PgStore>,
    service: OrderService,
    table_id: i64,
    item_id: i64,
}

/// Fresh table and item per test; numbers are unique per process and run
async fn seed() -> Option<Seed> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let store = Arc::new(PgStore::connect(&url, 16).await.expect("connect"));

    let seq = SEQ.fetch_add(1, Ordering::SeqCst);
    let number = format!("{:07}{seq:02}", shared::util::now_millis() % 10_000_000);

    let mut tx = store.begin().await.unwrap();
    let table = tx
        .insert_table(&NewTable {
            number,
            seats: 2,
            note: None,
        })
        .await
        .unwrap()
        .expect("table number collision");
    let item = tx
        .insert_item(&NewItem {
            name: "Soup".to_string(),
            description: String::new(),
            price: Decimal::from_str("10.00").unwrap(),
            available: true,
        })
        .await
        .unwrap();
    tx.commit().await.unwrap();

    Some(Seed {
        service: OrderService::new(store.clone()),
        store,
        table_id: table.id,
        item_id: item.id,
    })
}

fn user(id: i64) -> CurrentUser {
    CurrentUser {
        id,
        username: format!("pg-user{id}"),
        is_superuser: false,
    }
}

fn place_req(seed: &Seed, quantity: i64) -> PlaceOrderRequest {
    PlaceOrderRequest {
        table_id: Some(seed.table_id),
        items: vec![LineItemInput {
            item_id: Some(seed.item_id),
            quantity: Some(quantity),
        }],
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn concurrent_place_orders_book_table_once() {
    let Some(seed) = seed().await else { return };

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = seed.service.clone();
            let req = place_req(&seed, 1);
            tokio::spawn(async move { service.place_order(&user(i), &req).await })
        })
        .collect();

    let mut placed = 0;
    let mut booked = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => placed += 1,
            Err(OrderError::TableBooked(_)) => booked += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!((placed, booked), (1, 7));

    let table = seed.store.find_table(seed.table_id).await.unwrap().unwrap();
    assert_eq!(table.status, TableStatus::Booked);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn add_item_accumulates_under_contention() {
    let Some(seed) = seed().await else { return };
    let order = seed
        .service
        .place_order(&user(1), &place_req(&seed, 1))
        .await
        .unwrap();

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let service = seed.service.clone();
            let req = AddItemRequest {
                item_id: Some(seed.item_id),
                quantity: Some(1),
            };
            tokio::spawn(async move { service.add_item(&user(1), order.id, &req).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let detail = seed.service.get_order(&user(1), order.id).await.unwrap();
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].quantity, 11);
    assert_eq!(detail.total_price, Decimal::from_str("110.00").unwrap());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn cancel_releases_table_for_next_order() {
    let Some(seed) = seed().await else { return };
    let first = seed
        .service
        .place_order(&user(1), &place_req(&seed, 2))
        .await
        .unwrap();

    seed.service.cancel(&user(1), first.id).await.unwrap();
    let second = seed
        .service
        .place_order(&user(2), &place_req(&seed, 1))
        .await
        .unwrap();
    assert_eq!(second.status, OrderStatus::Pending);

    // Repeating the cancel must not free the table held by the second order
    seed.service.cancel(&user(1), first.id).await.unwrap();
    let table = seed.store.find_table(seed.table_id).await.unwrap().unwrap();
    assert_eq!(table.status, TableStatus::Booked);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn checkout_and_cancel_race_settles_once() {
    let Some(seed) = seed().await else { return };

    for round in 0..5 {
        let order = seed
            .service
            .place_order(&user(1), &place_req(&seed, 1))
            .await
            .unwrap();

        let checkout = {
            let service = seed.service.clone();
            let req = CheckoutRequest {
                name: Some("Ana".to_string()),
                phone: Some("555-0101".to_string()),
                phone_number: None,
            };
            tokio::spawn(async move { service.checkout(&user(1), order.id, &req).await })
        };
        let cancel = {
            let service = seed.service.clone();
            tokio::spawn(async move { service.cancel(&user(1), order.id).await })
        };
        let (checkout, cancel) = (checkout.await.unwrap(), cancel.await.unwrap());

        let detail = seed.service.get_order(&user(1), order.id).await.unwrap();
        match detail.status {
            OrderStatus::Completed => {
                assert!(checkout.is_ok(), "round {round}");
                assert!(
                    matches!(cancel, Err(OrderError::CannotCancelCompleted(_))),
                    "round {round}: {cancel:?}"
                );
            }
            OrderStatus::Cancelled => {
                assert!(cancel.is_ok(), "round {round}");
                assert!(
                    matches!(checkout, Err(OrderError::NotPending { .. })),
                    "round {round}: {checkout:?}"
                );
            }
            OrderStatus::Pending => panic!("round {round}: order left pending"),
        }

        // Either way the table was released exactly once and is free again
        let table = seed.store.find_table(seed.table_id).await.unwrap().unwrap();
        assert_eq!(table.status, TableStatus::Available, "round {round}");
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn add_item_past_line_cap_leaves_line_unchanged() {
    let Some(seed) = seed().await else { return };
    let order = seed
        .service
        .place_order(&user(1), &place_req(&seed, 9000))
        .await
        .unwrap();

    let req = AddItemRequest {
        item_id: Some(seed.item_id),
        quantity: Some(1000),
    };
    let err = seed.service.add_item(&user(1), order.id, &req).await.unwrap_err();
    assert!(matches!(err, OrderError::LineQuantityExceeded { max: 9999, .. }));

    let detail = seed.service.get_order(&user(1), order.id).await.unwrap();
    assert_eq!(detail.items[0].quantity, 9000);
}
