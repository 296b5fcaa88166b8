use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// A required field is missing or a value failed a type/range check.
    #[error("{0}")]
    Validation(String),
    /// A uniqueness constraint would be violated.
    #[error("{0}")]
    Conflict(String),
    /// The viewer's role or ownership does not permit the operation.
    #[error("{0}")]
    Forbidden(String),
    #[error("{kind} {id} not found.")]
    NotFound { kind: &'static str, id: String },
    /// A status change that the record's current status does not allow.
    #[error("{kind} {id} is {from}; cannot {action}.")]
    InvalidTransition {
        kind: &'static str,
        id: String,
        from: String,
        action: &'static str,
    },
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl DataError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        DataError::Validation(message.into())
    }

    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        DataError::Conflict(message.into())
    }

    pub(crate) fn forbidden(message: impl Into<String>) -> Self {
        DataError::Forbidden(message.into())
    }

    pub(crate) fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        DataError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

pub type DataResult<T> = std::result::Result<T, DataError>;
