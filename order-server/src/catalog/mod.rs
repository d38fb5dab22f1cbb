//! Table and menu item management
//!
//! The workflow engine only reads tables and items; this module is the
//! administrative path that creates and edits them. Writes are restricted to
//! superusers at the router.

pub mod items;
pub mod tables;

use std::sync::Arc;

use crate::db::Store;

/// Maximum length of a table number
pub const MAX_TABLE_NUMBER_LEN: usize = 10;
/// Maximum length of a table note
pub const MAX_NOTE_LEN: usize = 255;
/// Maximum length of an item name
pub const MAX_ITEM_NAME_LEN: usize = 100;
/// Seats assigned when a table is created without a capacity
pub const DEFAULT_SEATS: i32 = 4;

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn Store>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

/// Trimmed, non-empty, at most `max` characters
fn required_text(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> Result<String, shared::error::AppError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| shared::error::AppError::required(field))?;
    if value.chars().count() > max {
        return Err(shared::error::AppError::validation(format!(
            "{field} must be at most {max} characters"
        ))
        .with_detail("field", field));
    }
    Ok(value.to_string())
}
