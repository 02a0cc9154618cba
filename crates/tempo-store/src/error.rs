use thiserror::Error;

/// Errors that can occur in the schedule store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The `info` payload column could not be encoded or decoded.
    #[error("Payload serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored timestamp column is not valid RFC 3339.
    #[error("Invalid timestamp in column {column}: {value}")]
    InvalidTimestamp { column: &'static str, value: String },

    /// No schedule with the given ID exists.
    #[error("Schedule not found: {id}")]
    NotFound { id: String },

    /// The store is unreachable (used by fallible test doubles and future
    /// remote backends).
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
