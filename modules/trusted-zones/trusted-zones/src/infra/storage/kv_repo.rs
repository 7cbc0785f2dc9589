use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tracing::{debug, warn};
use trusted_zones_sdk::CorruptState;

use crate::domain::document::ProfileDocument;
use crate::domain::repo::{LoadedProfile, PreferenceRepository, ProfileRepository, SaveOutcome};

use super::entity::{self, StoredProfile};
use super::kv::KeyValueStore;

/// Suffix of the key a corrupt document is copied to before it is replaced.
pub const CORRUPT_BACKUP_SUFFIX: &str = ".corrupt";

enum Decoded {
    Document(ProfileDocument),
    Corrupt(String),
}

/// Profile document and theme preference kept in a [`KeyValueStore`].
pub struct KvProfileRepository {
    store: Arc<dyn KeyValueStore>,
    profile_key: String,
    theme_key: String,
}

impl KvProfileRepository {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, profile_key: String, theme_key: String) -> Self {
        Self {
            store,
            profile_key,
            theme_key,
        }
    }

    fn decode(raw: &str) -> anyhow::Result<Decoded> {
        let mut stored: StoredProfile = match serde_json::from_str(raw) {
            Ok(stored) => stored,
            Err(e) => return Ok(Decoded::Corrupt(e.to_string())),
        };
        entity::migrate(&mut stored)?;
        Ok(Decoded::Document(stored.into()))
    }

    async fn read_raw(&self) -> anyhow::Result<Option<String>> {
        self.store
            .get(&self.profile_key)
            .await
            .with_context(|| format!("failed to read '{}'", self.profile_key))
    }

    /// Revision of the stored copy. A corrupt copy is backed up and counts as 0.
    async fn stored_revision(&self, raw: Option<&str>) -> anyhow::Result<u64> {
        let Some(raw) = raw else {
            return Ok(0);
        };
        match Self::decode(raw)? {
            Decoded::Document(document) => Ok(document.revision),
            Decoded::Corrupt(reason) => {
                let backup_key = format!("{}{CORRUPT_BACKUP_SUFFIX}", self.profile_key);
                warn!(
                    key = %self.profile_key,
                    backup_key = %backup_key,
                    reason = %reason,
                    "Replacing corrupt profile document, previous contents backed up"
                );
                self.store
                    .set(&backup_key, raw)
                    .await
                    .with_context(|| format!("failed to back up '{}'", self.profile_key))?;
                Ok(0)
            }
        }
    }
}

#[async_trait]
impl ProfileRepository for KvProfileRepository {
    async fn load(&self) -> anyhow::Result<LoadedProfile> {
        let Some(raw) = self.read_raw().await? else {
            debug!(key = %self.profile_key, "No stored profile document, using defaults");
            return Ok(LoadedProfile {
                document: ProfileDocument::default(),
                corrupt: None,
            });
        };

        let decoded = Self::decode(&raw)
            .with_context(|| format!("cannot load '{}'", self.profile_key))?;
        Ok(match decoded {
            Decoded::Document(document) => {
                if !document.malformed_zones.is_empty() {
                    let ids: Vec<&str> =
                        document.malformed_zones.keys().map(String::as_str).collect();
                    warn!(
                        key = %self.profile_key,
                        ids = ?ids,
                        "Skipping malformed zone entries, kept as stored"
                    );
                }
                LoadedProfile {
                    document,
                    corrupt: None,
                }
            }
            Decoded::Corrupt(reason) => LoadedProfile {
                document: ProfileDocument::default(),
                corrupt: Some(CorruptState {
                    key: self.profile_key.clone(),
                    reason,
                }),
            },
        })
    }

    async fn save(&self, document: &ProfileDocument) -> anyhow::Result<SaveOutcome> {
        let current = self.read_raw().await?;
        let found = self
            .stored_revision(current.as_deref())
            .await
            .with_context(|| format!("refusing to overwrite '{}'", self.profile_key))?;
        if found != document.revision {
            return Ok(SaveOutcome::Conflict { found });
        }

        let revision = found + 1;
        let mut stored = StoredProfile::from(document);
        stored.revision = revision;
        let json = serde_json::to_string(&stored).context("failed to serialize profile document")?;

        let written = self
            .store
            .compare_and_set(&self.profile_key, current.as_deref(), &json)
            .await
            .with_context(|| format!("failed to write '{}'", self.profile_key))?;
        if !written {
            let latest = self.read_raw().await?;
            let found = self.stored_revision(latest.as_deref()).await?;
            return Ok(SaveOutcome::Conflict { found });
        }

        debug!(key = %self.profile_key, revision, "Profile document saved");
        Ok(SaveOutcome::Saved { revision })
    }
}

#[async_trait]
impl PreferenceRepository for KvProfileRepository {
    async fn load_theme(&self) -> anyhow::Result<Option<String>> {
        self.store
            .get(&self.theme_key)
            .await
            .with_context(|| format!("failed to read '{}'", self.theme_key))
    }

    async fn save_theme(&self, value: &str) -> anyhow::Result<()> {
        self.store
            .set(&self.theme_key, value)
            .await
            .with_context(|| format!("failed to write '{}'", self.theme_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::ZoneRecord;
    use crate::domain::proximity::Coordinates;
    use crate::infra::storage::kv::InMemoryKeyValueStore;

    fn repo_with(store: &Arc<InMemoryKeyValueStore>) -> KvProfileRepository {
        KvProfileRepository::new(
            store.clone(),
            "userData".to_owned(),
            "netswith:theme_mode".to_owned(),
        )
    }

    #[tokio::test]
    async fn test_missing_document_loads_defaults() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let loaded = repo_with(&store).load().await.unwrap();
        assert_eq!(loaded.document, ProfileDocument::default());
        assert!(loaded.corrupt.is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let repo = repo_with(&store);

        let mut document = ProfileDocument::default();
        document.zones.insert(
            "wifi-1".to_owned(),
            ZoneRecord {
                name: "Home".to_owned(),
                coordinates: Coordinates::new(26.9124, 75.7873),
            },
        );
        document.next_zone_seq = 2;

        let outcome = repo.save(&document).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Saved { revision: 1 });

        let loaded = repo.load().await.unwrap().document;
        assert_eq!(loaded.revision, 1);
        assert_eq!(loaded.zones, document.zones);
        assert_eq!(loaded.next_zone_seq, 2);
    }

    #[tokio::test]
    async fn test_stale_revision_is_a_conflict() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let repo = repo_with(&store);

        let document = ProfileDocument::default();
        repo.save(&document).await.unwrap();
        let outcome = repo.save(&document).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Conflict { found: 1 });
    }

    #[tokio::test]
    async fn test_corrupt_document_is_reported_and_backed_up() {
        let store = Arc::new(InMemoryKeyValueStore::with_entries([("userData", "{not json")]));
        let repo = repo_with(&store);

        let loaded = repo.load().await.unwrap();
        let corrupt = loaded.corrupt.unwrap();
        assert_eq!(corrupt.key, "userData");
        assert_eq!(loaded.document, ProfileDocument::default());
        assert!(store.snapshot("userData.corrupt").is_none());

        let outcome = repo.save(&loaded.document).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Saved { revision: 1 });
        assert_eq!(store.snapshot("userData.corrupt").as_deref(), Some("{not json"));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_corrupt_backup_is_logged() {
        let store = Arc::new(InMemoryKeyValueStore::with_entries([("userData", "[1, 2")]));
        let repo = repo_with(&store);

        repo.save(&ProfileDocument::default()).await.unwrap();
        assert!(logs_contain("Replacing corrupt profile document"));
        assert!(logs_contain("userData.corrupt"));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_malformed_zone_is_skipped_not_corrupt() {
        let raw = r#"{"displayName": "Asha", "location-wifi": {
            "wifi-1": {"name": "Home", "lat": 1.0, "long": 2.0},
            "wifi-2": {"name": "Office", "lat": null}
        }}"#;
        let store = Arc::new(InMemoryKeyValueStore::with_entries([("userData", raw)]));
        let repo = repo_with(&store);

        let loaded = repo.load().await.unwrap();
        assert!(loaded.corrupt.is_none());
        assert_eq!(loaded.document.display_name, "Asha");
        assert_eq!(loaded.document.zones.len(), 1);
        assert!(loaded.document.malformed_zones.contains_key("wifi-2"));
        assert!(logs_contain("Skipping malformed zone entries"));
        assert!(logs_contain("wifi-2"));

        repo.save(&loaded.document).await.unwrap();
        assert!(store.snapshot("userData.corrupt").is_none());
        let saved: serde_json::Value =
            serde_json::from_str(&store.snapshot("userData").unwrap()).unwrap();
        assert_eq!(
            saved["location-wifi"]["wifi-2"],
            serde_json::json!({"name": "Office", "lat": null})
        );
    }

    #[tokio::test]
    async fn test_newer_schema_is_never_overwritten() {
        let raw = r#"{"schemaVersion": 99, "displayName": "future"}"#;
        let store = Arc::new(InMemoryKeyValueStore::with_entries([("userData", raw)]));
        let repo = repo_with(&store);

        assert!(repo.load().await.is_err());
        assert!(repo.save(&ProfileDocument::default()).await.is_err());
        assert_eq!(store.snapshot("userData").as_deref(), Some(raw));
    }

    #[tokio::test]
    async fn test_theme_round_trip() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let repo = repo_with(&store);
        assert_eq!(repo.load_theme().await.unwrap(), None);
        repo.save_theme("light").await.unwrap();
        assert_eq!(repo.load_theme().await.unwrap().as_deref(), Some("light"));
        assert_eq!(store.snapshot("netswith:theme_mode").as_deref(), Some("light"));
    }
}
