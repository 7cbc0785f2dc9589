//! Trusted Zones Module Implementation
//!
//! The public API is defined in `trusted-zones-sdk` and re-exported here.
//!
//! Wiring for an in-process consumer:
//! ```ignore
//! let store = Arc::new(InMemoryKeyValueStore::new());
//! let client = trusted_zones::build_client(store, TrustedZonesConfig::default());
//! client.add_zone(NewZone::new("Home_WiFi", 26.9124, 75.7873)).await?;
//! ```

pub use trusted_zones_sdk::{
    CorruptState, NewZone, Profile, ProfilePatch, ThemeMode, TrustedZonesClientV1,
    TrustedZonesError, Zone, ZoneList,
};

pub mod config;
pub mod local_client;

#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;

use std::sync::Arc;

pub use config::TrustedZonesConfig;
pub use infra::storage::kv::{FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore};
pub use local_client::LocalClient;

/// Build a ready-to-use client over the given persistence adapter.
#[must_use]
pub fn build_client(
    store: Arc<dyn KeyValueStore>,
    config: TrustedZonesConfig,
) -> Arc<dyn TrustedZonesClientV1> {
    let repo = Arc::new(infra::storage::KvProfileRepository::new(
        store,
        config.profile_key.clone(),
        config.theme_key.clone(),
    ));
    let service = Arc::new(domain::service::Service::new(
        repo.clone(),
        repo,
        config.service_config(),
    ));
    Arc::new(LocalClient::new(service))
}
