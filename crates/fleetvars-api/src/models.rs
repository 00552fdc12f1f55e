// Wire types for the fleet API.
//
// Every collection response is wrapped in a `d` envelope. Variable,
// device, tag, and service records are typed directly; fleets arrive with
// nested navigation properties and are read through the flattener.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

/// The `{"d": [...]}` envelope around every collection response.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(rename = "d")]
    pub data: Vec<T>,
}

/// Reference to a related entity, serialized as `{"__id": N}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef {
    #[serde(rename = "__id")]
    pub id: u64,
}

// ── Environment variables ────────────────────────────────────────────

/// One row from any of the `*_environment_variable` collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRecord {
    pub id: u64,
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub created_at: String,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: u64,
    pub uuid: String,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub last_vpn_event: Option<String>,
    #[serde(default)]
    pub last_connectivity_event: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    /// Space-separated list, as the API returns it.
    #[serde(default, alias = "mac_addresses")]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub public_address: Option<String>,
    #[serde(default)]
    pub supervisor_version: Option<String>,
    #[serde(default)]
    pub os_version: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
    #[serde(default)]
    pub latitude: Option<String>,
    #[serde(default)]
    pub custom_longitude: Option<String>,
    #[serde(default)]
    pub custom_latitude: Option<String>,
    #[serde(default, rename = "is_of__device_type")]
    pub device_type: Option<IdRef>,
    #[serde(default, rename = "belongs_to__application")]
    pub fleet: Option<IdRef>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, rename = "is_running__release")]
    pub running_release: Option<IdRef>,
    #[serde(default, rename = "is_pinned_on__release")]
    pub pinned_release: Option<IdRef>,
}

impl DeviceRecord {
    /// MAC addresses split out of the space-separated wire field.
    pub fn mac_addresses(&self) -> Vec<String> {
        self.mac_address
            .as_deref()
            .map(|raw| raw.split_whitespace().map(String::from).collect())
            .unwrap_or_default()
    }
}

/// A device tag (`device_tag` collection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceTagRecord {
    pub id: u64,
    pub tag_key: String,
    #[serde(default)]
    pub value: String,
}

// ── Services ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub id: u64,
    pub service_name: String,
    #[serde(default)]
    pub created_at: String,
}

// ── Fleets ───────────────────────────────────────────────────────────

/// A fleet (an `application` in the API's vocabulary).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetRecord {
    pub id: u64,
    pub slug: Option<String>,
    pub app_name: Option<String>,
    pub organization_id: Option<u64>,
    pub device_type_id: Option<u64>,
    pub is_public: bool,
    pub is_host: bool,
    pub is_archived: bool,
    pub created_at: Option<String>,
    pub uuid: Option<String>,
    pub track_latest_release: bool,
    pub release_id: Option<u64>,
}

impl FleetRecord {
    /// Read a fleet out of a flattened (dotted-key) payload.
    pub fn from_flat(flat: &Map<String, Value>) -> Result<Self, Error> {
        let id = flat
            .get("id")
            .and_then(Value::as_u64)
            .ok_or_else(|| Error::Deserialization {
                message: "fleet payload has no numeric `id`".into(),
                body: Value::Object(flat.clone()).to_string(),
            })?;

        let string = |key: &str| flat.get(key).and_then(Value::as_str).map(String::from);
        let number = |key: &str| flat.get(key).and_then(Value::as_u64);
        let flag = |key: &str| flat.get(key).and_then(Value::as_bool).unwrap_or(false);

        Ok(Self {
            id,
            slug: string("slug"),
            app_name: string("app_name"),
            organization_id: number("organization.__id"),
            device_type_id: number("is_for__device_type.__id"),
            is_public: flag("is_public"),
            is_host: flag("is_host"),
            is_archived: flag("is_archived"),
            created_at: string("created_at"),
            uuid: string("uuid"),
            track_latest_release: flag("should_track_latest_release"),
            release_id: number("should_be_running__release.__id"),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::flatten::flatten_json;

    #[test]
    fn variable_envelope_parses() {
        let body = json!({
            "d": [
                { "id": 7, "name": "DEBUG", "value": "true", "created_at": "2024-01-01T00:00:00.000Z" },
                { "id": 8, "name": "EMPTY", "value": "" }
            ]
        });
        let parsed: ListResponse<VariableRecord> = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.data.len(), 2);
        assert_eq!(parsed.data[0].name, "DEBUG");
        assert_eq!(parsed.data[1].created_at, "");
    }

    #[test]
    fn device_nullable_fields() {
        let body = json!({
            "id": 1,
            "uuid": "abc",
            "mac_address": "aa:bb:cc:dd:ee:ff 11:22:33:44:55:66",
            "is_of__device_type": { "__id": 58 },
            "belongs_to__application": { "__id": 42 },
            "is_pinned_on__release": null
        });
        let device: DeviceRecord = serde_json::from_value(body).unwrap();
        assert_eq!(device.fleet, Some(IdRef { id: 42 }));
        assert_eq!(device.pinned_release, None);
        assert_eq!(
            device.mac_addresses(),
            vec!["aa:bb:cc:dd:ee:ff", "11:22:33:44:55:66"]
        );
    }

    #[test]
    fn fleet_from_flattened_payload() {
        let raw = json!({
            "id": 42,
            "slug": "acme/sensors",
            "app_name": "sensors",
            "organization": { "__id": 3 },
            "is_for__device_type": { "__id": 58 },
            "should_be_running__release": { "__id": 900 },
            "should_track_latest_release": true,
            "is_public": false,
            "is_host": false,
            "is_archived": false,
            "created_at": "2023-05-01T12:00:00.000Z",
            "uuid": "0123456789abcdef0123456789abcdef"
        });
        let flat = flatten_json(raw.as_object().unwrap());
        let fleet = FleetRecord::from_flat(&flat).unwrap();
        assert_eq!(fleet.id, 42);
        assert_eq!(fleet.organization_id, Some(3));
        assert_eq!(fleet.device_type_id, Some(58));
        assert_eq!(fleet.release_id, Some(900));
        assert!(fleet.track_latest_release);
    }

    #[test]
    fn fleet_without_id_is_rejected() {
        let flat = flatten_json(json!({ "slug": "x" }).as_object().unwrap());
        assert!(matches!(
            FleetRecord::from_flat(&flat),
            Err(Error::Deserialization { .. })
        ));
    }
}
