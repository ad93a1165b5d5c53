//! SeaORM implementations of the domain repository interfaces

pub mod api_key_repository;
pub mod user_repository;

pub use api_key_repository::ApiKeyRepository;
pub use user_repository::UserRepository;

use sea_orm::{DbErr, SqlErr};

use crate::domain::{DomainError, PersistenceError};

/// Classify a database error by the constraint it violated, if any.
pub(crate) fn db_err(e: DbErr) -> DomainError {
    let classified = match e.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => PersistenceError::ForeignKey(msg),
        Some(SqlErr::UniqueConstraintViolation(msg)) => PersistenceError::Unique(msg),
        _ => PersistenceError::Storage(e.to_string()),
    };
    classified.into()
}
