use shared::models::{OrderDetail, OrderLine};

use super::money::{line_subtotal, order_total};
use crate::db::OrderRecord;

/// Build the client-facing snapshot, pricing every line from the current
/// catalog item
pub fn order_detail(record: OrderRecord) -> OrderDetail {
    let OrderRecord {
        order,
        table,
        lines,
    } = record;

    let items: Vec<OrderLine> = lines
        .into_iter()
        .map(|(line, item)| OrderLine {
            id: line.id,
            subtotal: line_subtotal(item.price, line.quantity),
            quantity: line.quantity,
            item,
        })
        .collect();
    let total_price = order_total(items.iter().map(|l| l.subtotal));

    OrderDetail {
        id: order.id,
        user_id: order.user_id,
        table,
        status: order.status,
        name: order.name,
        phone_number: order.phone_number,
        items,
        total_price,
        created_at: order.created_at,
        updated_at: order.updated_at,
    }
}
