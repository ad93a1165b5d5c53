use thiserror::Error;

/// Failures raised by the storage layer, classified by the constraint involved.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Foreign key constraint failed: {0}")]
    ForeignKey(String),

    #[error("Unique constraint failed: {0}")]
    Unique(String),

    #[error("Database error: {0}")]
    Storage(String),
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("{0}")]
    Validation(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl DomainError {
    pub fn not_found(entity: &'static str, field: &'static str, value: impl ToString) -> Self {
        Self::NotFound {
            entity,
            field,
            value: value.to_string(),
        }
    }

    /// Whether this error is caused by the storage backend itself rather
    /// than by the request.
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, DomainError::Persistence(PersistenceError::Storage(_)))
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_key() {
        let err = DomainError::not_found("ApiKey", "id", 17);
        assert_eq!(err.to_string(), "Not found: ApiKey with id=17");
    }

    #[test]
    fn persistence_errors_convert_transparently() {
        let err: DomainError = PersistenceError::ForeignKey("user_id".into()).into();
        assert_eq!(err.to_string(), "Foreign key constraint failed: user_id");
        assert!(!err.is_storage_failure());

        let err: DomainError = PersistenceError::Storage("disk I/O error".into()).into();
        assert!(err.is_storage_failure());
    }
}
