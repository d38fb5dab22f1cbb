//! Money calculation using rust_decimal
//!
//! Subtotals and the running total stay exact; only the order total is
//! rounded, and only when a snapshot is built.

use rust_decimal::prelude::*;

/// Rounding for presented totals (2 decimal places, half away from zero)
pub const DECIMAL_PLACES: u32 = 2;

/// Largest quantity one order line may reach, in one request or accumulated
pub const MAX_LINE_QUANTITY: i32 = 9999;

/// [`MAX_LINE_QUANTITY`] for validating raw request values
pub const MAX_QUANTITY: i64 = MAX_LINE_QUANTITY as i64;

/// Maximum item price (NUMERIC(8,2))
pub const MAX_PRICE: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 2);

/// `quantity × price`, exact
pub fn line_subtotal(price: Decimal, quantity: i32) -> Decimal {
    price * Decimal::from(quantity)
}

/// Sum of subtotals rounded for presentation
pub fn order_total<I>(subtotals: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    let sum: Decimal = subtotals.into_iter().sum();
    round_money(sum)
}

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Catalog prices: non-negative, at most 2 decimal places, within column range
pub fn validate_price(price: Decimal) -> Result<(), String> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(format!("price must be non-negative, got {price}"));
    }
    if price.normalize().scale() > DECIMAL_PLACES {
        return Err(format!("price must have at most 2 decimal places, got {price}"));
    }
    if price > MAX_PRICE {
        return Err(format!("price exceeds maximum allowed ({MAX_PRICE}), got {price}"));
    }
    Ok(())
}
