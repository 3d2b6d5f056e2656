use crate::storage::StorageError;

/// Every failure the content store can report, regardless of backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Input rejected, e.g. a duplicate slug or an invalid contact form.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Update against a post id or setting key that does not exist.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// The remote backend could not be reached or rejected the request.
    #[error("Remote backend error: {0}")]
    Transport(String),

    /// The local persisted data could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity,
            key: key.into(),
        }
    }

    /// Short machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Validation(_) => "VALIDATION_ERROR",
            StoreError::NotFound { .. } => "NOT_FOUND",
            StoreError::Transport(_) => "TRANSPORT_ERROR",
            StoreError::Storage(_) => "STORAGE_ERROR",
        }
    }
}
