//! Configuration for the trusted-zones module.

use serde::{Deserialize, Serialize};

use crate::domain::service::ServiceConfig;

/// Storage key of the profile document written by the mobile application.
pub const DEFAULT_PROFILE_KEY: &str = "userData";
/// Storage key of the theme preference written by the mobile application.
pub const DEFAULT_THEME_KEY: &str = "netswith:theme_mode";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TrustedZonesConfig {
    /// Key under which the profile document is persisted.
    pub profile_key: String,
    /// Key under which the theme preference is persisted.
    pub theme_key: String,
    /// Maximum length (in characters) of a zone name or the display name.
    pub max_field_length: usize,
    /// Maximum length (in characters) of a single notification message.
    pub max_message_length: usize,
    /// How many times a write is retried after a revision conflict.
    pub conflict_retries: u32,
}

impl Default for TrustedZonesConfig {
    fn default() -> Self {
        Self {
            profile_key: DEFAULT_PROFILE_KEY.to_owned(),
            theme_key: DEFAULT_THEME_KEY.to_owned(),
            max_field_length: 100,
            max_message_length: 500,
            conflict_retries: 1,
        }
    }
}

impl TrustedZonesConfig {
    #[must_use]
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            max_field_length: self.max_field_length,
            max_message_length: self.max_message_length,
            conflict_retries: self.conflict_retries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = TrustedZonesConfig::default();
        assert_eq!(cfg.profile_key, "userData");
        assert_eq!(cfg.theme_key, "netswith:theme_mode");
        assert_eq!(cfg.max_field_length, 100);
        assert_eq!(cfg.conflict_retries, 1);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let cfg: TrustedZonesConfig =
            serde_json::from_value(serde_json::json!({ "max_field_length": 32 })).unwrap();
        assert_eq!(cfg.max_field_length, 32);
        assert_eq!(cfg.profile_key, DEFAULT_PROFILE_KEY);
        assert_eq!(cfg.max_message_length, 500);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<TrustedZonesConfig, _> =
            serde_json::from_value(serde_json::json!({ "proximity": 0.5 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_service_config_mirrors_limits() {
        let cfg = TrustedZonesConfig {
            max_field_length: 10,
            max_message_length: 20,
            conflict_retries: 3,
            ..TrustedZonesConfig::default()
        };
        let svc = cfg.service_config();
        assert_eq!(svc.max_field_length, 10);
        assert_eq!(svc.max_message_length, 20);
        assert_eq!(svc.conflict_retries, 3);
    }
}
