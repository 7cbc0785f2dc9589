#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

//! Common test utilities for trusted-zones integration tests

use std::path::Path;
use std::sync::Arc;

use trusted_zones::{
    FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore, TrustedZonesClientV1,
    TrustedZonesConfig, build_client,
};

pub const PROFILE_KEY: &str = "userData";

pub fn memory_store() -> Arc<InMemoryKeyValueStore> {
    Arc::new(InMemoryKeyValueStore::new())
}

pub fn seeded_store(raw: &str) -> Arc<InMemoryKeyValueStore> {
    Arc::new(InMemoryKeyValueStore::with_entries([(PROFILE_KEY, raw)]))
}

pub fn client_over(store: Arc<dyn KeyValueStore>) -> Arc<dyn TrustedZonesClientV1> {
    build_client(store, TrustedZonesConfig::default())
}

/// A client over files in `dir`, as a fresh process would open it.
pub fn file_client(dir: &Path) -> Arc<dyn TrustedZonesClientV1> {
    client_over(Arc::new(FileKeyValueStore::new(dir)))
}

pub fn file_client_with(dir: &Path, config: TrustedZonesConfig) -> Arc<dyn TrustedZonesClientV1> {
    build_client(Arc::new(FileKeyValueStore::new(dir)), config)
}

pub fn stored_json(store: &InMemoryKeyValueStore) -> serde_json::Value {
    let raw = store.snapshot(PROFILE_KEY).expect("profile document stored");
    serde_json::from_str(&raw).unwrap()
}
