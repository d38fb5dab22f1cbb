//! Request normalization
//!
//! Everything here runs before a transaction is opened; a request that fails
//! these checks never touches the store.

use shared::models::{AddItemRequest, CheckoutRequest, LineItemInput, PlaceOrderRequest};

use super::error::OrderError;
use super::money::MAX_QUANTITY;

/// Maximum length of the customer name captured at checkout
pub const MAX_NAME_LEN: usize = 100;
/// Maximum length of the phone number captured at checkout
pub const MAX_PHONE_LEN: usize = 20;

/// One validated (item, quantity) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRequest {
    pub item_id: i64,
    pub quantity: i32,
}

/// Validated place_order request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOrder {
    pub table_id: i64,
    /// One entry per distinct item, in first-seen order
    pub lines: Vec<LineRequest>,
}

/// Validated checkout details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDetails {
    pub name: String,
    pub phone: String,
}

/// Missing quantity means 1
pub fn quantity(raw: Option<i64>) -> Result<i32, OrderError> {
    let quantity = raw.unwrap_or(1);
    if !(1..=MAX_QUANTITY).contains(&quantity) {
        return Err(OrderError::InvalidQuantity {
            quantity,
            max: MAX_QUANTITY,
        });
    }
    // bounded by MAX_QUANTITY above
    Ok(quantity as i32)
}

pub fn line(item_id: Option<i64>, raw_quantity: Option<i64>) -> Result<LineRequest, OrderError> {
    let item_id = item_id.ok_or(OrderError::MissingField("item_id"))?;
    Ok(LineRequest {
        item_id,
        quantity: quantity(raw_quantity)?,
    })
}

pub fn add_item(req: &AddItemRequest) -> Result<LineRequest, OrderError> {
    line(req.item_id, req.quantity)
}

/// Repeated items are merged into the first occurrence
pub fn place_order(req: &PlaceOrderRequest) -> Result<PlaceOrder, OrderError> {
    let table_id = req.table_id.ok_or(OrderError::MissingField("table_id"))?;
    if req.items.is_empty() {
        return Err(OrderError::MissingField("items"));
    }

    let mut lines: Vec<LineRequest> = Vec::with_capacity(req.items.len());
    for LineItemInput {
        item_id,
        quantity: raw,
    } in &req.items
    {
        let next = line(*item_id, *raw)?;
        match lines.iter_mut().find(|l| l.item_id == next.item_id) {
            Some(existing) => {
                let merged = i64::from(existing.quantity) + i64::from(next.quantity);
                existing.quantity = quantity(Some(merged))?;
            }
            None => lines.push(next),
        }
    }

    Ok(PlaceOrder { table_id, lines })
}

/// `phone` wins over `phone_number` when both are present
pub fn checkout(req: &CheckoutRequest) -> Result<CheckoutDetails, OrderError> {
    let name = non_empty(req.name.as_deref()).ok_or(OrderError::MissingField("name"))?;
    let phone = non_empty(req.phone.as_deref())
        .or_else(|| non_empty(req.phone_number.as_deref()))
        .ok_or(OrderError::MissingField("phone"))?;

    if name.chars().count() > MAX_NAME_LEN {
        return Err(OrderError::Validation(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    if phone.chars().count() > MAX_PHONE_LEN {
        return Err(OrderError::Validation(format!(
            "phone must be at most {MAX_PHONE_LEN} characters"
        )));
    }

    Ok(CheckoutDetails {
        name: name.to_string(),
        phone: phone.to_string(),
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(item_id: i64, quantity: Option<i64>) -> LineItemInput {
        LineItemInput {
            item_id: Some(item_id),
            quantity,
        }
    }

    #[test]
    fn test_quantity_defaults_to_one() {
        assert_eq!(quantity(None).unwrap(), 1);
        assert_eq!(quantity(Some(3)).unwrap(), 3);
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(matches!(
            quantity(Some(0)),
            Err(OrderError::InvalidQuantity { quantity: 0, .. })
        ));
        assert!(quantity(Some(-2)).is_err());
        assert!(quantity(Some(MAX_QUANTITY)).is_ok());
        assert!(quantity(Some(MAX_QUANTITY + 1)).is_err());
    }

    #[test]
    fn test_place_order_requires_table_and_items() {
        let req = PlaceOrderRequest {
            table_id: None,
            items: vec![input(1, Some(1))],
        };
        assert!(matches!(
            place_order(&req),
            Err(OrderError::MissingField("table_id"))
        ));

        let req = PlaceOrderRequest {
            table_id: Some(5),
            items: vec![],
        };
        assert!(matches!(
            place_order(&req),
            Err(OrderError::MissingField("items"))
        ));

        let req = PlaceOrderRequest {
            table_id: Some(5),
            items: vec![LineItemInput {
                item_id: None,
                quantity: Some(1),
            }],
        };
        assert!(matches!(
            place_order(&req),
            Err(OrderError::MissingField("item_id"))
        ));
    }

    #[test]
    fn test_place_order_merges_duplicates_in_first_seen_order() {
        let req = PlaceOrderRequest {
            table_id: Some(5),
            items: vec![input(2, Some(1)), input(1, Some(2)), input(2, None)],
        };
        let place = place_order(&req).unwrap();
        assert_eq!(place.table_id, 5);
        assert_eq!(
            place.lines,
            vec![
                LineRequest {
                    item_id: 2,
                    quantity: 2
                },
                LineRequest {
                    item_id: 1,
                    quantity: 2
                },
            ]
        );
    }

    #[test]
    fn test_merged_quantity_is_capped() {
        let req = PlaceOrderRequest {
            table_id: Some(5),
            items: vec![input(1, Some(MAX_QUANTITY)), input(1, Some(1))],
        };
        assert!(matches!(
            place_order(&req),
            Err(OrderError::InvalidQuantity { quantity, .. }) if quantity == MAX_QUANTITY + 1
        ));
    }

    #[test]
    fn test_checkout_accepts_either_phone_field() {
        let req = CheckoutRequest {
            name: Some("Ana".to_string()),
            phone: None,
            phone_number: Some("555-0101".to_string()),
        };
        assert_eq!(checkout(&req).unwrap().phone, "555-0101");

        let req = CheckoutRequest {
            name: Some("Ana".to_string()),
            phone: Some("555-0202".to_string()),
            phone_number: Some("555-0101".to_string()),
        };
        assert_eq!(checkout(&req).unwrap().phone, "555-0202");
    }

    #[test]
    fn test_checkout_blank_fields_are_missing() {
        let req = CheckoutRequest {
            name: Some("   ".to_string()),
            phone: Some("555".to_string()),
            phone_number: None,
        };
        assert!(matches!(
            checkout(&req),
            Err(OrderError::MissingField("name"))
        ));

        let req = CheckoutRequest {
            name: Some("Ana".to_string()),
            phone: Some("".to_string()),
            phone_number: None,
        };
        assert!(matches!(
            checkout(&req),
            Err(OrderError::MissingField("phone"))
        ));
    }

    #[test]
    fn test_checkout_trims_and_limits_length() {
        let req = CheckoutRequest {
            name: Some("  Ana  ".to_string()),
            phone: Some(" 555 ".to_string()),
            phone_number: None,
        };
        let details = checkout(&req).unwrap();
        assert_eq!(details.name, "Ana");
        assert_eq!(details.phone, "555");

        let req = CheckoutRequest {
            name: Some("x".repeat(MAX_NAME_LEN + 1)),
            phone: Some("555".to_string()),
            phone_number: None,
        };
        assert!(matches!(checkout(&req), Err(OrderError::Validation(_))));
    }
}
