//! Persisted layout of the profile document.
//!
//! Field names match the document written by the mobile app, so existing
//! `userData` values load unchanged. Bookkeeping fields introduced later
//! (`schemaVersion`, `revision`, `nextZoneSeq`) are optional on read.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Layout version written by this crate. Documents without a version are v1.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredZone {
    pub name: String,
    pub lat: f64,
    pub long: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub revision: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_zone_seq: Option<u64>,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub notification_messages: Vec<String>,
    #[serde(rename = "location-wifi", default)]
    pub zones: StoredZones,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `location-wifi` collection.
///
/// Each entry is read on its own. An entry that is not a valid zone is kept
/// verbatim in `malformed` and written back unchanged, so one damaged zone
/// never costs the rest of the document. A missing or non-object collection
/// reads as empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoredZones {
    pub valid: BTreeMap<String, StoredZone>,
    pub malformed: BTreeMap<String, Value>,
}

impl StoredZones {
    pub fn insert(&mut self, id: String, zone: StoredZone) {
        self.malformed.remove(&id);
        self.valid.insert(id, zone);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.valid.is_empty() && self.malformed.is_empty()
    }
}

impl<'de> Deserialize<'de> for StoredZones {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Value::Object(entries) = Value::deserialize(deserializer)? else {
            return Ok(Self::default());
        };

        let mut zones = Self::default();
        for (id, raw) in entries {
            match StoredZone::deserialize(&raw) {
                Ok(zone) => {
                    zones.valid.insert(id, zone);
                }
                Err(_) => {
                    zones.malformed.insert(id, raw);
                }
            }
        }
        Ok(zones)
    }
}

impl Serialize for StoredZones {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        for (id, zone) in &self.valid {
            map.serialize_entry(id, zone)?;
        }
        for (id, raw) in &self.malformed {
            if !self.valid.contains_key(id) {
                map.serialize_entry(id, raw)?;
            }
        }
        map.end()
    }
}

/// Bring a stored document up to [`CURRENT_SCHEMA_VERSION`].
///
/// # Errors
/// Fails for documents written by a newer layout; those must not be rewritten.
pub fn migrate(stored: &mut StoredProfile) -> anyhow::Result<()> {
    let version = stored.schema_version.unwrap_or(1);
    if version > CURRENT_SCHEMA_VERSION {
        anyhow::bail!(
            "stored schema version {version} is newer than supported version {CURRENT_SCHEMA_VERSION}"
        );
    }
    if version < 2 {
        // v1 ids were derived from the collection size; the sequence is
        // seeded from the zone ids when mapped.
        stored.next_zone_seq = None;
    }
    stored.schema_version = Some(CURRENT_SCHEMA_VERSION);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_mobile_app_document() {
        let raw = r#"{
            "displayName": "Asha",
            "notificationMessages": ["Welcome home"],
            "location-wifi": {
                "wifi-1": {"name": "Home", "lat": 26.9124, "long": 75.7873}
            },
            "avatar": "a.png"
        }"#;
        let mut stored: StoredProfile = serde_json::from_str(raw).unwrap();
        assert_eq!(stored.schema_version, None);
        assert_eq!(stored.zones.valid["wifi-1"].name, "Home");
        assert_eq!(stored.extra["avatar"], "a.png");

        migrate(&mut stored).unwrap();
        assert_eq!(stored.schema_version, Some(CURRENT_SCHEMA_VERSION));
        assert_eq!(stored.next_zone_seq, None);
    }

    #[test]
    fn test_non_object_zones_read_as_empty() {
        let stored: StoredProfile =
            serde_json::from_str(r#"{"location-wifi": null, "displayName": "A"}"#).unwrap();
        assert!(stored.zones.is_empty());

        let stored: StoredProfile = serde_json::from_str(r#"{"location-wifi": []}"#).unwrap();
        assert!(stored.zones.is_empty());
    }

    #[test]
    fn test_malformed_zone_entry_is_kept_apart() {
        let raw = r#"{
            "displayName": "Asha",
            "location-wifi": {
                "wifi-1": {"name": "Home", "lat": 26.9124, "long": 75.7873},
                "wifi-2": {"name": "Office"},
                "wifi-3": "cafe"
            }
        }"#;
        let stored: StoredProfile = serde_json::from_str(raw).unwrap();
        assert_eq!(stored.display_name, "Asha");
        assert_eq!(stored.zones.valid.len(), 1);
        assert_eq!(stored.zones.valid["wifi-1"].name, "Home");
        assert_eq!(stored.zones.malformed["wifi-2"], serde_json::json!({"name": "Office"}));
        assert_eq!(stored.zones.malformed["wifi-3"], "cafe");

        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(value["location-wifi"]["wifi-1"]["lat"], 26.9124);
        assert_eq!(value["location-wifi"]["wifi-2"], serde_json::json!({"name": "Office"}));
        assert_eq!(value["location-wifi"]["wifi-3"], "cafe");
    }

    #[test]
    fn test_insert_replaces_malformed_entry() {
        let mut zones = StoredZones::default();
        zones
            .malformed
            .insert("wifi-1".to_owned(), serde_json::json!(null));
        zones.insert(
            "wifi-1".to_owned(),
            StoredZone {
                name: "Home".to_owned(),
                lat: 1.0,
                long: 2.0,
            },
        );
        assert!(zones.malformed.is_empty());
        assert_eq!(zones.valid.len(), 1);
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let mut stored = StoredProfile {
            schema_version: Some(CURRENT_SCHEMA_VERSION + 1),
            ..StoredProfile::default()
        };
        let err = migrate(&mut stored).unwrap_err();
        assert!(err.to_string().contains("newer than supported"));
    }

    #[test]
    fn test_serializes_with_wire_names() {
        let mut stored = StoredProfile {
            schema_version: Some(2),
            revision: 3,
            next_zone_seq: Some(4),
            display_name: "Asha".to_owned(),
            ..StoredProfile::default()
        };
        stored.zones.insert(
            "wifi-3".to_owned(),
            StoredZone {
                name: "Cafe".to_owned(),
                lat: 1.5,
                long: -2.25,
            },
        );
        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(value["schemaVersion"], 2);
        assert_eq!(value["nextZoneSeq"], 4);
        assert_eq!(value["displayName"], "Asha");
        assert_eq!(value["location-wifi"]["wifi-3"]["long"], -2.25);
    }
}
