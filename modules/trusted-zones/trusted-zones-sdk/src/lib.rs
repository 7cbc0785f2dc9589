//! Trusted Zones SDK
//!
//! This crate provides the public API for the trusted-zones module:
//! - `TrustedZonesClientV1` trait for presentation adapters
//! - Model types (`Zone`, `NewZone`, `ZoneList`, `Profile`, `ProfilePatch`, `ThemeMode`)
//! - Error type (`TrustedZonesError`)
//!
//! Consumers hold the client behind an `Arc<dyn TrustedZonesClientV1>`:
//! ```ignore
//! let listing = client.list_zones().await?;
//! let zone = client.add_zone(NewZone::new("Home_WiFi", 26.9124, 75.7873)).await?;
//! ```

#![forbid(unsafe_code)]

pub mod api;
pub mod errors;
pub mod models;

pub use api::TrustedZonesClientV1;
pub use errors::TrustedZonesError;
pub use models::{CorruptState, NewZone, Profile, ProfilePatch, ThemeMode, Zone, ZoneList};
