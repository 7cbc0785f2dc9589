use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use trusted_zones_sdk::{NewZone, Profile, ProfilePatch, ThemeMode, Zone, ZoneList};

use super::document::{ProfileDocument, ZoneRecord};
use super::error::DomainError;
use super::fields::{ProfileFields, ZoneFields};
use super::proximity::{Coordinates, MAX_LATITUDE, MAX_LONGITUDE};
use super::repo::{LoadedProfile, PreferenceRepository, ProfileRepository, SaveOutcome};

// ============================================================================
// Service Configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_field_length: usize,
    pub max_message_length: usize,
    pub conflict_retries: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_field_length: 100,
            max_message_length: 500,
            conflict_retries: 1,
        }
    }
}

// ============================================================================
// Service Implementation
// ============================================================================

/// Outcome of applying an edit to a freshly loaded document.
enum Change<T> {
    /// The document was modified and must be persisted.
    Write(T),
    /// Nothing changed; no write is issued.
    Unchanged(T),
}

/// Trusted zone store.
///
/// Every mutation is a read-merge-write of the whole profile document. Writes
/// issued through one service are serialized by `write_gate`; writers outside
/// it are detected through the document revision and retried after a reload.
pub struct Service {
    profiles: Arc<dyn ProfileRepository>,
    preferences: Arc<dyn PreferenceRepository>,
    config: ServiceConfig,
    write_gate: Mutex<()>,
}

impl Service {
    #[must_use]
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        preferences: Arc<dyn PreferenceRepository>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            profiles,
            preferences,
            config,
            write_gate: Mutex::new(()),
        }
    }

    /// Zones in creation order. A corrupt document yields an empty list with
    /// `corrupt_state` set.
    ///
    /// # Errors
    /// Returns [`DomainError::Storage`] when the document cannot be read.
    #[instrument(skip(self))]
    pub async fn list_zones(&self) -> Result<ZoneList, DomainError> {
        let loaded = self.load().await?;
        Ok(ZoneList {
            zones: loaded.document.zones_in_order(),
            corrupt_state: loaded.corrupt,
        })
    }

    /// # Errors
    /// - [`DomainError::Validation`] for an empty or over-long name or out-of-range coordinates
    /// - [`DomainError::DuplicateName`] / [`DomainError::DuplicateLocation`] when the zone collides
    /// - [`DomainError::Conflict`] when concurrent writers exhaust the retries
    /// - [`DomainError::Storage`] when no zone id is left to allocate
    #[instrument(skip(self, new_zone), fields(name = %new_zone.name))]
    pub async fn add_zone(&self, new_zone: NewZone) -> Result<Zone, DomainError> {
        let (name, at) = self.validate_zone(&new_zone)?;

        let zone = self
            .read_merge_write(|doc| {
                Self::ensure_unique(doc, &name, at, None)?;
                let id = doc.allocate_zone_id()?;
                let record = ZoneRecord {
                    name: name.clone(),
                    coordinates: at,
                };
                let zone = record.to_zone(&id);
                doc.zones.insert(id, record);
                Ok(Change::Write(zone))
            })
            .await?;

        info!(zone_id = %zone.id, "trusted zone added");
        Ok(zone)
    }

    /// Same checks as [`Self::add_zone`], ignoring the zone being edited.
    ///
    /// # Errors
    /// Also returns [`DomainError::NotFound`] for an unknown id.
    #[instrument(skip(self, id, new_zone), fields(zone_id = %id))]
    pub async fn update_zone(&self, id: &str, new_zone: NewZone) -> Result<Zone, DomainError> {
        let (name, at) = self.validate_zone(&new_zone)?;

        let zone = self
            .read_merge_write(|doc| {
                let Some(record) = doc.zones.get(id) else {
                    return Err(DomainError::not_found(id));
                };
                if record.name == name && record.coordinates == at {
                    return Ok(Change::Unchanged(record.to_zone(id)));
                }
                Self::ensure_unique(doc, &name, at, Some(id))?;
                let record = ZoneRecord {
                    name: name.clone(),
                    coordinates: at,
                };
                let zone = record.to_zone(id);
                doc.zones.insert(id.to_owned(), record);
                Ok(Change::Write(zone))
            })
            .await?;

        info!("trusted zone updated");
        Ok(zone)
    }

    /// Removes the zone if present. A missing id is a no-op and issues no write.
    ///
    /// # Errors
    /// Returns [`DomainError::Storage`] or [`DomainError::Conflict`] when the write fails.
    #[instrument(skip(self, id), fields(zone_id = %id))]
    pub async fn delete_zone(&self, id: &str) -> Result<bool, DomainError> {
        let removed = self
            .read_merge_write(|doc| {
                Ok(if doc.remove_zone(id) {
                    Change::Write(true)
                } else {
                    Change::Unchanged(false)
                })
            })
            .await?;

        if removed {
            info!("trusted zone deleted");
        } else {
            debug!("no such zone, nothing to delete");
        }
        Ok(removed)
    }

    /// # Errors
    /// Returns [`DomainError::Storage`] when the document cannot be read.
    #[instrument(skip(self))]
    pub async fn get_profile(&self) -> Result<Profile, DomainError> {
        Ok(self.load().await?.document.profile())
    }

    /// # Errors
    /// Returns [`DomainError::Validation`] for over-long fields, otherwise as for writes.
    #[instrument(skip(self, patch))]
    pub async fn patch_profile(&self, patch: ProfilePatch) -> Result<Profile, DomainError> {
        if let Some(ref display_name) = patch.display_name {
            validate_length(
                ProfileFields::DISPLAY_NAME,
                display_name,
                self.config.max_field_length,
            )?;
        }
        if let Some(ref messages) = patch.notification_messages {
            for message in messages {
                validate_length(
                    ProfileFields::NOTIFICATION_MESSAGES,
                    message,
                    self.config.max_message_length,
                )?;
            }
        }

        self.read_merge_write(|doc| {
            if patch.is_empty() {
                return Ok(Change::Unchanged(doc.profile()));
            }
            doc.apply_profile_patch(patch.clone());
            Ok(Change::Write(doc.profile()))
        })
        .await
    }

    /// Stored theme; falls back to dark when unset or unreadable.
    #[instrument(skip(self))]
    pub async fn theme_mode(&self) -> ThemeMode {
        match self.preferences.load_theme().await {
            Ok(stored) => theme_from_stored(stored.as_deref()),
            Err(e) => {
                warn!(error = %e, "failed to load theme preference, using dark");
                ThemeMode::Dark
            }
        }
    }

    /// # Errors
    /// Returns [`DomainError::Storage`] when the preference cannot be written.
    #[instrument(skip(self))]
    pub async fn set_theme_mode(&self, mode: ThemeMode) -> Result<(), DomainError> {
        let _guard = self.write_gate.lock().await;
        self.preferences.save_theme(mode.as_str()).await?;
        debug!(%mode, "theme preference saved");
        Ok(())
    }

    /// # Errors
    /// Returns [`DomainError::Storage`] when the preference cannot be written.
    #[instrument(skip(self))]
    pub async fn toggle_theme(&self) -> Result<ThemeMode, DomainError> {
        let _guard = self.write_gate.lock().await;
        let current = self.theme_mode().await;
        let next = current.toggled();
        self.preferences.save_theme(next.as_str()).await?;
        debug!(from = %current, to = %next, "theme preference toggled");
        Ok(next)
    }

    async fn load(&self) -> Result<LoadedProfile, DomainError> {
        let loaded = self.profiles.load().await?;
        if let Some(ref corrupt) = loaded.corrupt {
            warn!(key = %corrupt.key, reason = %corrupt.reason, "profile document is corrupt, treating it as empty");
        }
        Ok(loaded)
    }

    /// Load the latest document, apply `edit`, and persist the whole document.
    ///
    /// On a revision conflict the document is reloaded and `edit` re-applied,
    /// up to `conflict_retries` times. Nothing is written when `edit` fails or
    /// reports no change.
    async fn read_merge_write<T, F>(&self, mut edit: F) -> Result<T, DomainError>
    where
        T: Send,
        F: FnMut(&mut ProfileDocument) -> Result<Change<T>, DomainError> + Send,
    {
        let _guard = self.write_gate.lock().await;
        let mut attempt: u32 = 0;

        loop {
            let mut document = self.load().await?.document;
            let expected = document.revision;

            let value = match edit(&mut document)? {
                Change::Write(value) => value,
                Change::Unchanged(value) => return Ok(value),
            };

            match self.profiles.save(&document).await? {
                SaveOutcome::Saved { revision } => {
                    debug!(revision, "profile document saved");
                    return Ok(value);
                }
                SaveOutcome::Conflict { found } => {
                    if attempt >= self.config.conflict_retries {
                        warn!(expected, found, "revision conflict, giving up");
                        return Err(DomainError::Conflict { expected, found });
                    }
                    attempt += 1;
                    warn!(expected, found, attempt, "revision conflict, reloading");
                }
            }
        }
    }

    fn ensure_unique(
        doc: &ProfileDocument,
        name: &str,
        at: Coordinates,
        exclude: Option<&str>,
    ) -> Result<(), DomainError> {
        if let Some(existing_id) = doc.find_duplicate_name(name, exclude) {
            return Err(DomainError::duplicate_name(name, existing_id));
        }
        if let Some(existing_id) = doc.find_duplicate_location(at, exclude) {
            return Err(DomainError::duplicate_location(existing_id));
        }
        Ok(())
    }

    /// Returns the trimmed name and the coordinates to store.
    fn validate_zone(&self, zone: &NewZone) -> Result<(String, Coordinates), DomainError> {
        let name = zone.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation(
                ZoneFields::NAME,
                "must not be empty",
            ));
        }
        validate_length(ZoneFields::NAME, name, self.config.max_field_length)?;
        validate_axis(ZoneFields::LATITUDE, zone.latitude, MAX_LATITUDE)?;
        validate_axis(ZoneFields::LONGITUDE, zone.longitude, MAX_LONGITUDE)?;

        Ok((
            name.to_owned(),
            Coordinates::new(zone.latitude, zone.longitude),
        ))
    }
}

fn validate_length(field: &str, value: &str, max: usize) -> Result<(), DomainError> {
    if value.chars().count() > max {
        return Err(DomainError::validation(
            field,
            format!("exceeds maximum length of {max}"),
        ));
    }
    Ok(())
}

fn validate_axis(field: &str, value: f64, limit: f64) -> Result<(), DomainError> {
    if !value.is_finite() {
        return Err(DomainError::validation(field, "must be a finite number"));
    }
    if value.abs() > limit {
        return Err(DomainError::validation(
            field,
            format!("must be between -{limit} and {limit}"),
        ));
    }
    Ok(())
}

/// Only the exact value `dark` selects dark once a preference has been stored.
fn theme_from_stored(stored: Option<&str>) -> ThemeMode {
    match stored {
        None | Some("dark") => ThemeMode::Dark,
        Some(_) => ThemeMode::Light,
    }
}
