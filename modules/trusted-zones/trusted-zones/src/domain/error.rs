use trusted_zones_sdk::TrustedZonesError;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Validation error on field '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Zone name '{name}' is already used by {existing_id}")]
    DuplicateName { name: String, existing_id: String },

    #[error("Location is already saved as {existing_id}")]
    DuplicateLocation { existing_id: String },

    #[error("Zone not found: {0}")]
    NotFound(String),

    #[error("Revision conflict: expected {expected}, found {found}")]
    Conflict { expected: u64, found: u64 },

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn duplicate_name(name: impl Into<String>, existing_id: impl Into<String>) -> Self {
        Self::DuplicateName {
            name: name.into(),
            existing_id: existing_id.into(),
        }
    }

    pub fn duplicate_location(existing_id: impl Into<String>) -> Self {
        Self::DuplicateLocation {
            existing_id: existing_id.into(),
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }
}

impl From<DomainError> for TrustedZonesError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation { field, message } => Self::validation(field, message),
            DomainError::DuplicateName { name, .. } => Self::duplicate_name(name),
            DomainError::DuplicateLocation { existing_id } => Self::duplicate_location(existing_id),
            DomainError::NotFound(id) => Self::not_found(id),
            DomainError::Conflict { expected, found } => Self::conflict(expected, found),
            DomainError::Storage(e) => Self::storage(format!("{e:#}")),
        }
    }
}
