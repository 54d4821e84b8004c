//! Error handling utilities for repositories

use modbot_core::error::DomainError;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::Persistence(e.to_string())
}

/// Out-of-range quote position
pub fn invalid_index(position: i64, count: usize) -> DomainError {
    DomainError::InvalidIndex { position, count }
}
