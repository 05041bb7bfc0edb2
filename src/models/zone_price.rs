// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-zone, per-service fare rules.

use super::wire::{
    deserialize_id, deserialize_opt_f64, deserialize_opt_id, deserialize_ref_id, Status,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Display name used when the backend did not resolve a reference.
pub const MISSING_NAME: &str = "N/A";

/// A fare rule tying one zone and one service to its rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZonePrice {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Empty when the backend lost the reference
    #[serde(default, deserialize_with = "deserialize_ref_id")]
    pub zone_id: String,
    #[serde(default, deserialize_with = "deserialize_ref_id")]
    pub service_id: String,
    #[serde(default, deserialize_with = "deserialize_opt_f64")]
    pub base_fare: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_opt_f64")]
    pub per_km: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_opt_f64")]
    pub per_minute: Option<f64>,
    #[serde(default)]
    pub status: Status,
    /// Zone display object resolved by the backend
    #[serde(default)]
    pub zone: Option<NamedRef>,
    /// Service display object resolved by the backend
    #[serde(default)]
    pub service: Option<NamedRef>,
}

impl ZonePrice {
    pub fn zone_name(&self) -> &str {
        NamedRef::display(self.zone.as_ref())
    }

    pub fn service_name(&self) -> &str {
        NamedRef::display(self.service.as_ref())
    }

    /// Fare for a trip of `km` kilometres lasting `minutes`.
    ///
    /// Missing rates count as zero; negative trip figures are clamped to zero.
    pub fn estimate(&self, km: f64, minutes: f64) -> f64 {
        self.base_fare.unwrap_or(0.0)
            + self.per_km.unwrap_or(0.0) * km.max(0.0)
            + self.per_minute.unwrap_or(0.0) * minutes.max(0.0)
    }
}

/// Nested `{id, name}` display object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl NamedRef {
    fn display(named: Option<&NamedRef>) -> &str {
        named
            .and_then(|n| n.name.as_deref())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(MISSING_NAME)
    }
}

/// Editor form, also the body of the create/update calls.
///
/// Rates are forwarded as entered; the backend owns their validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ZonePriceForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "select a zone"))]
    pub zone_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "select a service"))]
    pub service_id: String,
    #[serde(default)]
    pub base_fare: Option<f64>,
    #[serde(default)]
    pub per_km: Option<f64>,
    #[serde(default)]
    pub per_minute: Option<f64>,
    #[serde(default)]
    pub status: Status,
}

impl ZonePriceForm {
    /// Strip surrounding whitespace from the selected ids.
    pub fn trimmed(mut self) -> Self {
        self.zone_id = self.zone_id.trim().to_string();
        self.service_id = self.service_id.trim().to_string();
        self
    }
}

impl From<&ZonePrice> for ZonePriceForm {
    fn from(price: &ZonePrice) -> Self {
        Self {
            zone_id: price.zone_id.clone(),
            service_id: price.service_id.clone(),
            base_fare: price.base_fare,
            per_km: price.per_km,
            per_minute: price.per_minute,
            status: price.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_names_fall_back() {
        let price: ZonePrice = serde_json::from_str(
            r#"{"id": 7, "zoneId": 3, "serviceId": "9", "baseFare": "10.00",
                "zone": {"id": 3, "name": "Downtown"}, "service": null}"#,
        )
        .unwrap();
        assert_eq!(price.zone_name(), "Downtown");
        assert_eq!(price.service_name(), MISSING_NAME);
        assert_eq!(price.base_fare, Some(10.0));
        assert_eq!(price.per_km, None);
    }

    #[test]
    fn test_unresolved_references_still_load() {
        let price: ZonePrice = serde_json::from_str(
            r#"{"id": 2, "zoneId": null, "zone": null, "serviceId": 4, "service": {"id": 4}}"#,
        )
        .unwrap();
        assert_eq!(price.zone_id, "");
        assert_eq!(price.service_id, "4");
        assert_eq!(price.zone_name(), MISSING_NAME);
        assert_eq!(price.service_name(), MISSING_NAME);

        let bare: ZonePrice = serde_json::from_str(r#"{"id": 3}"#).unwrap();
        assert_eq!(bare.zone_id, "");
        assert_eq!(bare.zone_name(), MISSING_NAME);
    }

    #[test]
    fn test_estimate() {
        let price: ZonePrice = serde_json::from_str(
            r#"{"id": 1, "zoneId": 1, "serviceId": 1, "baseFare": 10, "perKm": 2, "perMinute": 0.5}"#,
        )
        .unwrap();
        assert_eq!(price.estimate(3.0, 10.0), 21.0);
        assert_eq!(price.estimate(-1.0, 0.0), 10.0);

        let bare: ZonePrice =
            serde_json::from_str(r#"{"id": 2, "zoneId": 1, "serviceId": 1}"#).unwrap();
        assert_eq!(bare.estimate(5.0, 5.0), 0.0);
    }

    #[test]
    fn test_form_requires_selections() {
        let form = ZonePriceForm {
            service_id: "1".to_string(),
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("zone_id"));
        assert!(!errors.field_errors().contains_key("service_id"));
    }

    #[test]
    fn test_form_body_is_camel_case() {
        let form = ZonePriceForm {
            zone_id: "1".to_string(),
            service_id: "2".to_string(),
            base_fare: Some(10.0),
            per_km: Some(2.0),
            per_minute: Some(0.5),
            status: Status::Enabled,
        };
        let body = serde_json::to_value(&form).unwrap();
        assert_eq!(body["zoneId"], "1");
        assert_eq!(body["perMinute"], 0.5);
        assert_eq!(body["status"], 1);
    }
}
