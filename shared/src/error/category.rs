//! Error categories derived from the code range

use super::codes::ErrorCode;

/// Domain an error code belongs to, by its thousands digit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Request,
    Auth,
    Permission,
    Order,
    Item,
    Table,
    /// 9xxx and any unassigned range
    System,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        match code / 1000 {
            0 => Self::Request,
            1 => Self::Auth,
            2 => Self::Permission,
            4 => Self::Order,
            6 => Self::Item,
            7 => Self::Table,
            _ => Self::System,
        }
    }
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
