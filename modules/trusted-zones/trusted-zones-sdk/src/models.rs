//! Public models for the trusted-zones module.
//!
//! These are transport-agnostic data structures that define the contract
//! between the zone store and its presentation adapters. They carry no
//! persistence details: the on-disk field names live in the module's
//! storage layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A trusted location paired with the WiFi network name observed there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Store-assigned identifier (`wifi-<n>`), never reused.
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Caller-supplied data for creating or editing a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewZone {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl NewZone {
    #[must_use]
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

/// The persisted document could not be parsed and was read as empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("persisted document under '{key}' is corrupt: {reason}")]
pub struct CorruptState {
    pub key: String,
    pub reason: String,
}

/// Result of listing zones.
///
/// `corrupt_state` is set when the persisted document was unreadable; in that
/// case `zones` is empty and callers should log the condition rather than
/// fail.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ZoneList {
    pub zones: Vec<Zone>,
    pub corrupt_state: Option<CorruptState>,
}

impl ZoneList {
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.zones.iter().map(|z| z.id.as_str()).collect()
    }
}

/// User profile fields stored next to the zone collection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Profile {
    pub display_name: String,
    pub notification_messages: Vec<String>,
}

impl Profile {
    /// The message surfaced to the user; only the first entry is shown.
    #[must_use]
    pub fn primary_message(&self) -> Option<&str> {
        self.notification_messages.first().map(String::as_str)
    }
}

/// Partial update data for the profile.
///
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub notification_messages: Option<Vec<String>>,
}

impl ProfilePatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.notification_messages.is_none()
    }
}

/// Colour scheme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            other => Err(format!("unknown theme mode '{other}', expected 'dark' or 'light'")),
        }
    }
}
