use shared::error::{AppError, ErrorCode};
use shared::models::{Item, ItemCreate, ItemUpdate};

use super::{CatalogService, MAX_ITEM_NAME_LEN, required_text};
use crate::db::NewItem;
use crate::error::ServiceResult;
use crate::orders::money::validate_price;

fn item_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::ItemNotFound, format!("Item {id} not found"))
        .with_detail("item_id", id)
}

fn check_price(price: rust_decimal::Decimal) -> Result<(), AppError> {
    validate_price(price).map_err(|msg| {
        AppError::with_message(ErrorCode::ItemInvalidPrice, msg).with_detail("field", "price")
    })
}

impl CatalogService {
    pub async fn list_items(&self) -> ServiceResult<Vec<Item>> {
        Ok(self.store.list_items().await?)
    }

    pub async fn get_item(&self, id: i64) -> ServiceResult<Item> {
        Ok(self
            .store
            .find_item(id)
            .await?
            .ok_or_else(|| item_not_found(id))?)
    }

    pub async fn create_item(&self, data: &ItemCreate) -> ServiceResult<Item> {
        check_price(data.price)?;
        let new = NewItem {
            name: required_text("name", Some(&data.name), MAX_ITEM_NAME_LEN)?,
            description: data.description.clone().unwrap_or_default(),
            price: data.price,
            available: data.available.unwrap_or(true),
        };

        let mut tx = self.store.begin().await?;
        let item = tx.insert_item(&new).await?;
        tx.commit().await?;

        tracing::info!(item_id = item.id, name = %item.name, "Item created");
        Ok(item)
    }

    /// Price changes apply to every order snapshot read afterwards
    pub async fn update_item(&self, id: i64, data: &ItemUpdate) -> ServiceResult<Item> {
        let mut tx = self.store.begin().await?;
        let mut item = tx
            .find_item(id)
            .await?
            .ok_or_else(|| item_not_found(id))?;

        if let Some(name) = data.name.as_deref() {
            item.name = required_text("name", Some(name), MAX_ITEM_NAME_LEN)?;
        }
        if let Some(description) = &data.description {
            item.description = description.clone();
        }
        if let Some(price) = data.price {
            check_price(price)?;
            item.price = price;
        }
        if let Some(available) = data.available {
            item.available = available;
        }

        tx.update_item(&item).await?;
        tx.commit().await?;

        tracing::info!(item_id = id, "Item updated");
        Ok(item)
    }

    /// Items referenced by any order line cannot be deleted
    pub async fn delete_item(&self, id: i64) -> ServiceResult<()> {
        let mut tx = self.store.begin().await?;
        if tx.find_item(id).await?.is_none() {
            return Err(item_not_found(id).into());
        }
        if tx.item_in_use(id).await? {
            return Err(AppError::new(ErrorCode::ItemInUse)
                .with_detail("item_id", id)
                .into());
        }
        tx.delete_item(id).await?;
        tx.commit().await?;

        tracing::info!(item_id = id, "Item deleted");
        Ok(())
    }
}
