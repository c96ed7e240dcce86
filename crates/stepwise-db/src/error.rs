//! Database-specific error types and conversions.

use stepwise_core::error::StepwiseError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Record already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<DbError> for StepwiseError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => StepwiseError::NotFound { entity, id },
            DbError::AlreadyExists { entity } => StepwiseError::AlreadyExists { entity },
            other => StepwiseError::Database(other.to_string()),
        }
    }
}
