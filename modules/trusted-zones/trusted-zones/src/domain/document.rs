//! Typed profile document.
//!
//! The document is the single unit of durability: display name, notification
//! messages and the zone collection are always loaded and saved together.

use std::collections::BTreeMap;

use trusted_zones_sdk::{Profile, ProfilePatch, Zone};

use super::error::DomainError;
use super::proximity::{Coordinates, same_location};

pub const ZONE_ID_PREFIX: &str = "wifi-";

/// A zone as held inside the document, keyed by its id.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneRecord {
    pub name: String,
    pub coordinates: Coordinates,
}

impl ZoneRecord {
    #[must_use]
    pub fn to_zone(&self, id: &str) -> Zone {
        Zone {
            id: id.to_owned(),
            name: self.name.clone(),
            latitude: self.coordinates.latitude,
            longitude: self.coordinates.longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileDocument {
    pub display_name: String,
    pub notification_messages: Vec<String>,
    pub zones: BTreeMap<String, ZoneRecord>,
    /// Stored zone entries that could not be read, written back verbatim.
    /// Their ids stay reserved.
    pub malformed_zones: BTreeMap<String, serde_json::Value>,
    /// Sequence number handed to the next created zone. Only ever grows.
    pub next_zone_seq: u64,
    /// Revision of the stored copy this document was read from.
    pub revision: u64,
    /// Top-level fields written by other collaborators, kept verbatim.
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for ProfileDocument {
    fn default() -> Self {
        Self {
            display_name: String::new(),
            notification_messages: Vec::new(),
            zones: BTreeMap::new(),
            malformed_zones: BTreeMap::new(),
            next_zone_seq: 1,
            revision: 0,
            extra: serde_json::Map::new(),
        }
    }
}

/// Name as compared for uniqueness: trimmed and case-folded.
#[must_use]
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Sequence number encoded in a `wifi-<n>` id.
#[must_use]
pub fn zone_seq(id: &str) -> Option<u64> {
    id.strip_prefix(ZONE_ID_PREFIX)?.parse().ok()
}

impl ProfileDocument {
    /// Zones ordered by creation: numbered ids ascending, then any foreign ids by id.
    #[must_use]
    pub fn zones_in_order(&self) -> Vec<Zone> {
        let mut entries: Vec<(&String, &ZoneRecord)> = self.zones.iter().collect();
        entries.sort_by(|(a, _), (b, _)| match (zone_seq(a), zone_seq(b)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.cmp(b),
        });
        entries
            .into_iter()
            .map(|(id, record)| record.to_zone(id))
            .collect()
    }

    #[must_use]
    pub fn zone(&self, id: &str) -> Option<Zone> {
        self.zones.get(id).map(|record| record.to_zone(id))
    }

    /// Id of a zone, other than `exclude`, whose name equals `name` after folding.
    #[must_use]
    pub fn find_duplicate_name(&self, name: &str, exclude: Option<&str>) -> Option<&str> {
        let key = name_key(name);
        self.others(exclude)
            .find(|(_, record)| name_key(&record.name) == key)
            .map(|(id, _)| id.as_str())
    }

    /// Id of a zone, other than `exclude`, at the same location as `at`.
    #[must_use]
    pub fn find_duplicate_location(&self, at: Coordinates, exclude: Option<&str>) -> Option<&str> {
        self.others(exclude)
            .find(|(_, record)| same_location(record.coordinates, at))
            .map(|(id, _)| id.as_str())
    }

    fn others<'a>(
        &'a self,
        exclude: Option<&str>,
    ) -> impl Iterator<Item = (&'a String, &'a ZoneRecord)> {
        self.zones
            .iter()
            .filter(move |(id, _)| Some(id.as_str()) != exclude)
    }

    /// Reserve a fresh zone id and advance the sequence.
    ///
    /// Ids already present (e.g. hand-edited documents) are skipped, so the
    /// returned id is never in the collection.
    ///
    /// # Errors
    /// Returns [`DomainError::Storage`] when the sequence is exhausted.
    pub fn allocate_zone_id(&mut self) -> Result<String, DomainError> {
        let exhausted = || DomainError::Storage(anyhow::anyhow!("zone id sequence exhausted"));

        let mut seq = self.next_zone_seq.max(self.minimum_next_seq());
        let mut id = format!("{ZONE_ID_PREFIX}{seq}");
        while self.has_zone_id(&id) {
            seq = seq.checked_add(1).ok_or_else(exhausted)?;
            id = format!("{ZONE_ID_PREFIX}{seq}");
        }
        self.next_zone_seq = seq.checked_add(1).ok_or_else(exhausted)?;
        Ok(id)
    }

    /// Whether `id` is taken, by a readable zone or a malformed entry.
    #[must_use]
    pub fn has_zone_id(&self, id: &str) -> bool {
        self.zones.contains_key(id) || self.malformed_zones.contains_key(id)
    }

    /// Remove the entry stored under `id`, readable or not.
    pub fn remove_zone(&mut self, id: &str) -> bool {
        let removed = self.zones.remove(id).is_some();
        self.malformed_zones.remove(id).is_some() || removed
    }

    /// Smallest sequence value that cannot collide with the stored ids.
    ///
    /// Documents written before the sequence was persisted derived ids from
    /// the collection size, so both the highest numbered id and the size are
    /// taken into account.
    #[must_use]
    pub fn minimum_next_seq(&self) -> u64 {
        let ids = self.zones.keys().chain(self.malformed_zones.keys());
        let highest = ids.filter_map(|id| zone_seq(id)).max().unwrap_or(0);
        let count = self.zones.len().saturating_add(self.malformed_zones.len());
        let count = u64::try_from(count).unwrap_or(u64::MAX);
        highest.max(count).saturating_add(1)
    }

    #[must_use]
    pub fn profile(&self) -> Profile {
        Profile {
            display_name: self.display_name.clone(),
            notification_messages: self.notification_messages.clone(),
        }
    }

    pub fn apply_profile_patch(&mut self, patch: ProfilePatch) {
        if let Some(display_name) = patch.display_name {
            self.display_name = display_name;
        }
        if let Some(messages) = patch.notification_messages {
            self.notification_messages = messages;
        }
    }
}
