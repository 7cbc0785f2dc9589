use crate::domain::document::{ProfileDocument, ZoneRecord};
use crate::domain::proximity::Coordinates;

use super::entity::{CURRENT_SCHEMA_VERSION, StoredProfile, StoredZone, StoredZones};

impl From<StoredZone> for ZoneRecord {
    fn from(zone: StoredZone) -> Self {
        Self {
            name: zone.name,
            coordinates: Coordinates::new(zone.lat, zone.long),
        }
    }
}

impl From<&ZoneRecord> for StoredZone {
    fn from(record: &ZoneRecord) -> Self {
        Self {
            name: record.name.clone(),
            lat: record.coordinates.latitude,
            long: record.coordinates.longitude,
        }
    }
}

impl From<StoredProfile> for ProfileDocument {
    fn from(stored: StoredProfile) -> Self {
        let mut document = Self {
            display_name: stored.display_name,
            notification_messages: stored.notification_messages,
            zones: stored
                .zones
                .valid
                .into_iter()
                .map(|(id, zone)| (id, zone.into()))
                .collect(),
            malformed_zones: stored.zones.malformed,
            next_zone_seq: 1,
            revision: stored.revision,
            extra: stored.extra,
        };
        document.next_zone_seq = stored
            .next_zone_seq
            .unwrap_or(1)
            .max(document.minimum_next_seq());
        document
    }
}

impl From<&ProfileDocument> for StoredProfile {
    fn from(document: &ProfileDocument) -> Self {
        Self {
            schema_version: Some(CURRENT_SCHEMA_VERSION),
            revision: document.revision,
            next_zone_seq: Some(document.next_zone_seq),
            display_name: document.display_name.clone(),
            notification_messages: document.notification_messages.clone(),
            zones: StoredZones {
                valid: document
                    .zones
                    .iter()
                    .map(|(id, record)| (id.clone(), record.into()))
                    .collect(),
                malformed: document.malformed_zones.clone(),
            },
            extra: document.extra.clone(),
        }
    }
}
