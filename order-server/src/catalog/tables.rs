use shared::error::{AppError, ErrorCode};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate, TableStatus};

use super::{
    CatalogService, DEFAULT_SEATS, MAX_NOTE_LEN, MAX_TABLE_NUMBER_LEN, required_text,
};
use crate::db::NewTable;
use crate::error::ServiceResult;

fn table_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::TableNotFound, format!("Table {id} not found"))
        .with_detail("table_id", id)
}

fn table_held(id: i64) -> AppError {
    AppError::with_message(ErrorCode::TableBooked, "Table is held by a pending order")
        .with_detail("table_id", id)
}

fn number_exists(number: &str) -> AppError {
    AppError::with_message(
        ErrorCode::TableNumberExists,
        format!("Table number {number} already exists"),
    )
    .with_detail("number", number)
}

fn validate_seats(seats: i32) -> Result<i32, AppError> {
    if seats < 0 {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("seats must be non-negative, got {seats}"),
        )
        .with_detail("field", "seats"));
    }
    Ok(seats)
}

/// Blank notes are stored as NULL
fn validate_note(note: Option<&str>) -> Result<Option<String>, AppError> {
    let note = note.map(str::trim).filter(|n| !n.is_empty());
    if note.is_some_and(|n| n.chars().count() > MAX_NOTE_LEN) {
        return Err(
            AppError::validation(format!("note must be at most {MAX_NOTE_LEN} characters"))
                .with_detail("field", "note"),
        );
    }
    Ok(note.map(str::to_string))
}

impl CatalogService {
    pub async fn list_tables(&self) -> ServiceResult<Vec<DiningTable>> {
        Ok(self.store.list_tables().await?)
    }

    pub async fn get_table(&self, id: i64) -> ServiceResult<DiningTable> {
        Ok(self
            .store
            .find_table(id)
            .await?
            .ok_or_else(|| table_not_found(id))?)
    }

    /// New tables start available
    pub async fn create_table(&self, data: &DiningTableCreate) -> ServiceResult<DiningTable> {
        let new = NewTable {
            number: required_text("number", Some(&data.number), MAX_TABLE_NUMBER_LEN)?,
            seats: validate_seats(data.seats.unwrap_or(DEFAULT_SEATS))?,
            note: validate_note(data.note.as_deref())?,
        };

        let mut tx = self.store.begin().await?;
        let table = tx
            .insert_table(&new)
            .await?
            .ok_or_else(|| number_exists(&new.number))?;
        tx.commit().await?;

        tracing::info!(table_id = table.id, number = %table.number, "Table created");
        Ok(table)
    }

    /// Edits number, seats or note of a table that is not currently held
    pub async fn update_table(
        &self,
        id: i64,
        data: &DiningTableUpdate,
    ) -> ServiceResult<DiningTable> {
        let mut tx = self.store.begin().await?;
        let mut table = tx
            .lock_table(id)
            .await?
            .ok_or_else(|| table_not_found(id))?;
        if table.status == TableStatus::Booked {
            return Err(table_held(id).into());
        }

        if let Some(number) = data.number.as_deref() {
            let number = required_text("number", Some(number), MAX_TABLE_NUMBER_LEN)?;
            if tx.table_number_taken(&number, Some(id)).await? {
                return Err(number_exists(&number).into());
            }
            table.number = number;
        }
        if let Some(seats) = data.seats {
            table.seats = validate_seats(seats)?;
        }
        if data.note.is_some() {
            table.note = validate_note(data.note.as_deref())?;
        }

        tx.update_table(&table).await?;
        tx.commit().await?;

        tracing::info!(table_id = id, "Table updated");
        Ok(table)
    }

    /// Refused while a pending order holds the table; finished orders that
    /// referenced it keep existing with no table
    pub async fn delete_table(&self, id: i64) -> ServiceResult<()> {
        let mut tx = self.store.begin().await?;
        let table = tx
            .lock_table(id)
            .await?
            .ok_or_else(|| table_not_found(id))?;
        if table.status == TableStatus::Booked {
            return Err(table_held(id).into());
        }
        tx.delete_table(id).await?;
        tx.commit().await?;

        tracing::info!(table_id = id, status = table.status.as_str(), "Table deleted");
        Ok(())
    }
}
