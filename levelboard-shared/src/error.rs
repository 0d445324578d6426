/// Error types for the core engine and the storage layer
///
/// `CoreError` is what the ledger, ranking engine and subscription registry
/// return. Storage problems are wrapped as `CoreError::Store` so the transport
/// layer can log them and answer with an opaque failure.

/// Storage layer error
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Unique or foreign key constraint violated (constraint name)
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Numeric value outside its column's range
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// Migration failure
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if let Some(constraint) = db_err.constraint() {
                return StoreError::Constraint(constraint.to_string());
            }
            // numeric_value_out_of_range
            if db_err.code().as_deref() == Some("22003") {
                return StoreError::OutOfRange(db_err.message().to_string());
            }
        }
        StoreError::Database(err)
    }
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Error returned by core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Referenced user or classification does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Action kind is not in the award table
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Classification name does not resolve
    #[error("Unknown classification: {0}")]
    InvalidClassification(String),

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_display() {
        let err = CoreError::NotFound("User 42".to_string());
        assert_eq!(err.to_string(), "User 42 not found");

        let err = CoreError::InvalidAction("dance".to_string());
        assert_eq!(err.to_string(), "Invalid action: dance");

        let err = CoreError::InvalidClassification("Cycling".to_string());
        assert_eq!(err.to_string(), "Unknown classification: Cycling");
    }

    #[test]
    fn test_store_error_is_transparent() {
        let err = CoreError::from(StoreError::Constraint("users_email_key".to_string()));
        assert_eq!(err.to_string(), "Constraint violation: users_email_key");
    }

    #[test]
    fn test_row_not_found_maps_to_database() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(sqlx::Error::RowNotFound)));
    }
}
