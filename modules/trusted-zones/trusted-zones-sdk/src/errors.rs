//! Error types for the trusted-zones SDK.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrustedZonesError {
    #[error("Validation error on field '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("A zone named '{name}' already exists")]
    DuplicateName { name: String },

    #[error("Location is already saved as zone '{existing_id}'")]
    DuplicateLocation { existing_id: String },

    #[error("Zone not found: {id}")]
    NotFound { id: String },

    #[error("Concurrent write detected (expected revision {expected}, found {found})")]
    Conflict { expected: u64, found: u64 },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl TrustedZonesError {
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    #[must_use]
    pub fn duplicate_location(existing_id: impl Into<String>) -> Self {
        Self::DuplicateLocation {
            existing_id: existing_id.into(),
        }
    }

    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    #[must_use]
    pub fn conflict(expected: u64, found: u64) -> Self {
        Self::Conflict { expected, found }
    }

    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    #[must_use]
    pub fn is_duplicate_name(&self) -> bool {
        matches!(self, Self::DuplicateName { .. })
    }

    #[must_use]
    pub fn is_duplicate_location(&self) -> bool {
        matches!(self, Self::DuplicateLocation { .. })
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }

    /// Short message suitable for a transient notice in a UI.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { field, message } => format!("Invalid {field}: {message}."),
            Self::DuplicateName { .. } => "This WiFi name already exists.".to_owned(),
            Self::DuplicateLocation { .. } => "This location is already saved.".to_owned(),
            Self::NotFound { .. } => "This zone no longer exists.".to_owned(),
            Self::Conflict { .. } => {
                "The zone list changed while saving. Please try again.".to_owned()
            }
            Self::Storage { .. } => "Failed to save the trusted zone.".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(TrustedZonesError::validation("name", "empty").is_validation());
        assert!(TrustedZonesError::duplicate_name("Home").is_duplicate_name());
        assert!(TrustedZonesError::duplicate_location("wifi-1").is_duplicate_location());
        assert!(TrustedZonesError::not_found("wifi-9").is_not_found());
        assert!(TrustedZonesError::conflict(1, 2).is_conflict());
        assert!(TrustedZonesError::storage("disk full").is_storage());
        assert!(!TrustedZonesError::storage("disk full").is_conflict());
    }

    #[test]
    fn test_display() {
        let err = TrustedZonesError::validation("name", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Validation error on field 'name': must not be empty"
        );

        let err = TrustedZonesError::conflict(3, 4);
        assert_eq!(
            err.to_string(),
            "Concurrent write detected (expected revision 3, found 4)"
        );
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            TrustedZonesError::duplicate_name("Home").user_message(),
            "This WiFi name already exists."
        );
        assert_eq!(
            TrustedZonesError::duplicate_location("wifi-1").user_message(),
            "This location is already saved."
        );
    }
}
