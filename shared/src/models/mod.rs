//! Domain models

pub mod dining_table;
pub mod item;
pub mod order;

pub use dining_table::{DiningTable, DiningTableCreate, DiningTableUpdate, TableStatus};
pub use item::{Item, ItemCreate, ItemUpdate};
pub use order::{
    AddItemRequest, AddItemResponse, CheckoutRequest, CheckoutResponse, LineItemInput, Order,
    OrderAck, OrderDetail, OrderItem, OrderLine, OrderStatus, PlaceOrderRequest,
};
