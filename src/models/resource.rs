use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::slot::TimeRange;

/// A resource (or resource group) advertised by a site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceInfo {
    pub resource_id: String,
    pub resource_name: String,
}

/// Free time ranges of one bookable unit on one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceAvailability {
    pub resource_id: String,
    pub resource_name: String,
    pub capacity: Option<u32>,
    pub free: Vec<TimeRange>,
}

// Wire format of `GET /sites/{id}/infos`
#[derive(Debug, Deserialize)]
pub struct SiteInfoResponse {
    #[serde(default)]
    pub types: Vec<SiteResourceType>,
}

#[derive(Debug, Deserialize)]
pub struct SiteResourceType {
    #[serde(deserialize_with = "string_or_number")]
    pub resource_type: String,
    pub localized_description: String,
}

impl From<SiteResourceType> for ResourceInfo {
    fn from(value: SiteResourceType) -> Self {
        Self {
            resource_id: value.resource_type,
            resource_name: value.localized_description,
        }
    }
}

// Wire format of one entry of `GET /resources/{site}/available`
#[derive(Debug, Deserialize)]
pub struct AvailableResource {
    #[serde(deserialize_with = "string_or_number")]
    pub resource_id: String,
    pub resource_name: String,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub hours: Vec<HourEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HourEntry {
    pub hour: String,
    pub state: String,
}

impl HourEntry {
    pub fn is_available(&self) -> bool {
        self.state == "available"
    }
}

// Affluences sends numeric ids in some payloads and strings in others
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_ids_become_strings() {
        let json = r#"{"types":[{"resource_type":3,"localized_description":"SALA PC"}]}"#;
        let info: SiteInfoResponse = serde_json::from_str(json).unwrap();
        let resource = ResourceInfo::from(info.types.into_iter().next().unwrap());
        assert_eq!(resource.resource_id, "3");
        assert_eq!(resource.resource_name, "SALA PC");
    }

    #[test]
    fn test_available_resource_without_hours() {
        let json = r#"{"resource_id":"R1","resource_name":"Seat 1"}"#;
        let resource: AvailableResource = serde_json::from_str(json).unwrap();
        assert!(resource.hours.is_empty());
        assert_eq!(resource.capacity, None);
    }
}
