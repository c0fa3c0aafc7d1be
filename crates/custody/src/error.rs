use thiserror::Error;

#[derive(Error, Debug)]
pub enum CustodyError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Capacity or uniqueness constraint violated.
    #[error("{0}")]
    Conflict(String),

    /// A required field is missing or blank.
    #[error("{0}")]
    InvalidInput(String),

    /// A reference to another record does not resolve.
    #[error("{0}")]
    InvalidReference(String),

    #[error("store failure: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl CustodyError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}

pub type CustodyResult<T> = Result<T, CustodyError>;
