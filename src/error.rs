//! Error types for the bucket ingestion pipeline
//!
//! Each stage of the pipeline (storage access, CSV merging, database work)
//! carries its own error enum; `IngestError` is the top-level type the run
//! orchestrator propagates to the binary boundary.

use thiserror::Error;

/// Errors from listing or fetching objects in the source bucket
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Bucket not accessible: {bucket} - {cause}")]
    BucketUnavailable { bucket: String, cause: String },

    #[error("Listing bucket contents failed: {cause}")]
    ListFailed { cause: String },

    #[error("Fetching object failed: {path} - {cause}")]
    FetchFailed { path: String, cause: String },

    #[error("Invalid credential file: {path} - {cause}")]
    InvalidCredentials { path: String, cause: String },
}

/// Errors from decoding and merging CSV shards
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("CSV parsing failed: {path} - {cause}")]
    CsvParseFailed { path: String, cause: String },

    #[error("Storage error while merging: {0}")]
    Storage(#[from] StorageError),
}

/// Errors related to database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection failed: {url} - {cause}")]
    ConnectionFailed { url: String, cause: String },

    #[error("Database creation failed: {database} - {cause}")]
    DatabaseCreationFailed { database: String, cause: String },

    #[error("Schema creation failed: {schema} - {cause}")]
    SchemaCreationFailed { schema: String, cause: String },

    #[error("Table creation failed: {table_name} - {cause}")]
    TableCreationFailed { table_name: String, cause: String },

    #[error("Query execution failed: {query} - {cause}")]
    QueryFailed { query: String, cause: String },

    #[error("Transaction failed: {cause}")]
    TransactionFailed { cause: String },

    #[error("Invalid identifier: {name} - {reason}")]
    InvalidIdentifier { name: String, reason: String },

    #[error("Value does not match inferred column type {expected}: {value}")]
    TypeMismatch { expected: String, value: String },
}

/// Top-level error for a full ingestion run
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Result type aliases for common operations
pub type StorageResult<T> = Result<T, StorageError>;
pub type MergeResult<T> = Result<T, MergeError>;
pub type DatabaseResult<T> = Result<T, DatabaseError>;
pub type IngestResult<T> = Result<T, IngestError>;

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => DatabaseError::QueryFailed {
                query: "unknown".to_string(),
                cause: db_err.to_string(),
            },
            sqlx::Error::Io(io_err) => DatabaseError::ConnectionFailed {
                url: "unknown".to_string(),
                cause: io_err.to_string(),
            },
            _ => DatabaseError::QueryFailed {
                query: "unknown".to_string(),
                cause: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_context() {
        let err = DatabaseError::TableCreationFailed {
            table_name: "orders".to_string(),
            cause: "permission denied".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("orders"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn test_ingest_error_from_database_error() {
        let db_err = DatabaseError::TransactionFailed {
            cause: "connection reset".to_string(),
        };
        let top: IngestError = db_err.into();
        assert!(matches!(top, IngestError::Database(_)));
    }

    #[test]
    fn test_sqlx_error_conversion() {
        let sqlx_err = sqlx::Error::PoolTimedOut;
        let db_err: DatabaseError = sqlx_err.into();
        assert!(matches!(db_err, DatabaseError::QueryFailed { .. }));
    }
}
