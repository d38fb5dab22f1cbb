//! Dining Table Model

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Reservation state of a table
///
/// A table is `Booked` exactly while one pending order holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    #[default]
    Available,
    Booked,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Booked => "booked",
        }
    }
}

impl FromStr for TableStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "booked" => Ok(Self::Booked),
            other => Err(format!("unknown table status: {other}")),
        }
    }
}

/// Dining table entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiningTable {
    pub id: i64,
    /// Unique label shown to staff ("5", "A2", ...)
    pub number: String,
    /// Capacity, informational only
    pub seats: i32,
    pub status: TableStatus,
    pub note: Option<String>,
}

/// Create dining table payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiningTableCreate {
    /// Blank or absent is rejected by the service as a missing field
    #[serde(default)]
    pub number: String,
    pub seats: Option<i32>,
    pub note: Option<String>,
}

/// Update dining table payload
///
/// `status` is intentionally absent: it only changes through order transitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiningTableUpdate {
    pub number: Option<String>,
    pub seats: Option<i32>,
    pub note: Option<String>,
}
