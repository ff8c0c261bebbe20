/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Stored value could not be decoded
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Catalog file could not be read
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for harmony_core::HarmonyError {
    fn from(err: StorageError) -> Self {
        harmony_core::HarmonyError::storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harmony_core::HarmonyError;

    #[test]
    fn converts_into_storage_error() {
        let err: HarmonyError = StorageError::SerializationError("bad kind".into()).into();
        assert!(matches!(err, HarmonyError::Storage(_)));
        assert!(err.to_string().contains("bad kind"));
    }
}
