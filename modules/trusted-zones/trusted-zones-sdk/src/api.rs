//! `TrustedZonesClientV1` trait definition.
//!
//! This trait is the narrow interface presentation adapters (screens, maps,
//! the command line) use to reach the zone store. It returns plain data only.

use async_trait::async_trait;

use crate::errors::TrustedZonesError;
use crate::models::{NewZone, Profile, ProfilePatch, ThemeMode, Zone, ZoneList};

/// Public API trait for the trusted-zones module.
///
/// Mutating calls on one client are serialized; calls are safe to issue
/// concurrently.
#[async_trait]
pub trait TrustedZonesClientV1: Send + Sync {
    /// List zones in insertion order.
    /// An unreadable document yields an empty list with `corrupt_state` set.
    async fn list_zones(&self) -> Result<ZoneList, TrustedZonesError>;

    /// Add a zone. The store assigns the identifier.
    async fn add_zone(&self, zone: NewZone) -> Result<Zone, TrustedZonesError>;

    /// Replace the name and location of an existing zone, keeping its id.
    async fn update_zone(&self, id: &str, zone: NewZone) -> Result<Zone, TrustedZonesError>;

    /// Delete a zone. Returns `false` when no such zone existed (not an error).
    async fn delete_zone(&self, id: &str) -> Result<bool, TrustedZonesError>;

    /// Get the profile fields. Returns defaults if nothing is stored yet.
    async fn get_profile(&self) -> Result<Profile, TrustedZonesError>;

    /// Partially update the profile (PATCH semantics).
    async fn patch_profile(&self, patch: ProfilePatch) -> Result<Profile, TrustedZonesError>;

    /// Stored theme preference, `Dark` when unset or unreadable.
    async fn theme_mode(&self) -> ThemeMode;

    /// Persist the theme preference.
    async fn set_theme_mode(&self, mode: ThemeMode) -> Result<(), TrustedZonesError>;

    /// Flip the theme preference and return the new value.
    async fn toggle_theme(&self) -> Result<ThemeMode, TrustedZonesError>;
}
