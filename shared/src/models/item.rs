//! Menu Item Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Menu item (catalog entry)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Unit price in currency unit, non-negative, 2 decimal places
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Whether the item is currently offered
    pub available: bool,
}

/// Create item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemCreate {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub available: Option<bool>,
}

/// Update item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub available: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_price_serializes_as_number() {
        let item = Item {
            id: 1,
            name: "Soup".to_string(),
            description: String::new(),
            price: Decimal::from_str("10.50").unwrap(),
            available: true,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["price"], 10.5);
    }

    #[test]
    fn test_payload_price_accepts_number() {
        let data: ItemCreate = serde_json::from_str(r#"{"name": "Tea", "price": 2.5}"#).unwrap();
        assert_eq!(data.price, Decimal::from_str("2.5").unwrap());

        let update: ItemUpdate = serde_json::from_str(r#"{"price": 3.75}"#).unwrap();
        assert_eq!(update.price, Some(Decimal::from_str("3.75").unwrap()));
        let update: ItemUpdate = serde_json::from_str(r#"{"name": "Tea"}"#).unwrap();
        assert_eq!(update.price, None);
    }
}
