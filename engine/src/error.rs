//! Error types for the PawSync engine.

use crate::RecordId;
use thiserror::Error;

/// All possible errors from the PawSync engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Validation errors
    #[error("invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    // Scope errors
    #[error("animal not found: {0}")]
    AnimalNotFound(RecordId),

    #[error("record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("record already exists: {0}")]
    RecordAlreadyExists(RecordId),
}

impl Error {
    /// Build an [`Error::InvalidField`] for the given field path.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn error_display() {
        let err = Error::invalid_field("pets[0].name", "must not be blank");
        assert_eq!(
            err.to_string(),
            "invalid field 'pets[0].name': must not be blank"
        );

        let id = Uuid::nil();
        let err = Error::AnimalNotFound(id);
        assert_eq!(
            err.to_string(),
            "animal not found: 00000000-0000-0000-0000-000000000000"
        );

        let err = Error::RecordAlreadyExists(id);
        assert_eq!(
            err.to_string(),
            "record already exists: 00000000-0000-0000-0000-000000000000"
        );
    }
}
