use async_trait::async_trait;
use std::sync::Arc;
use trusted_zones_sdk::{
    NewZone, Profile, ProfilePatch, ThemeMode, TrustedZonesClientV1, TrustedZonesError, Zone,
    ZoneList,
};

use crate::domain::service::Service;

/// In-process implementation of [`TrustedZonesClientV1`].
pub struct LocalClient {
    service: Arc<Service>,
}

impl LocalClient {
    #[must_use]
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl TrustedZonesClientV1 for LocalClient {
    async fn list_zones(&self) -> Result<ZoneList, TrustedZonesError> {
        self.service.list_zones().await.map_err(Into::into)
    }

    async fn add_zone(&self, zone: NewZone) -> Result<Zone, TrustedZonesError> {
        self.service.add_zone(zone).await.map_err(Into::into)
    }

    async fn update_zone(&self, id: &str, zone: NewZone) -> Result<Zone, TrustedZonesError> {
        self.service.update_zone(id, zone).await.map_err(Into::into)
    }

    async fn delete_zone(&self, id: &str) -> Result<bool, TrustedZonesError> {
        self.service.delete_zone(id).await.map_err(Into::into)
    }

    async fn get_profile(&self) -> Result<Profile, TrustedZonesError> {
        self.service.get_profile().await.map_err(Into::into)
    }

    async fn patch_profile(&self, patch: ProfilePatch) -> Result<Profile, TrustedZonesError> {
        self.service.patch_profile(patch).await.map_err(Into::into)
    }

    async fn theme_mode(&self) -> ThemeMode {
        self.service.theme_mode().await
    }

    async fn set_theme_mode(&self, mode: ThemeMode) -> Result<(), TrustedZonesError> {
        self.service.set_theme_mode(mode).await.map_err(Into::into)
    }

    async fn toggle_theme(&self) -> Result<ThemeMode, TrustedZonesError> {
        self.service.toggle_theme().await.map_err(Into::into)
    }
}
