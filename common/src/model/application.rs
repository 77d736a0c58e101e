//! The storage shape of a permit application.
//!
//! `ApplicationRecord` mirrors one row of the `applications` table. The codec
//! never produces full records: it produces an [`ApplicationPatch`], which the
//! persistence layer merges into an existing row, so every column in the patch
//! is optional and absent columns are left untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle status selected by the caller when an application is saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Draft,
    Submitted,
}

/// Service-level tracking state derived from the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaStatus {
    /// The clock has not started; the application is still a draft.
    Pending,
    OnTrack,
}

impl From<ApplicationStatus> for SlaStatus {
    fn from(status: ApplicationStatus) -> Self {
        match status {
            ApplicationStatus::Draft => SlaStatus::Pending,
            ApplicationStatus::Submitted => SlaStatus::OnTrack,
        }
    }
}

/// The five provinces accepted by the storage schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Province {
    Kigali,
    Northern,
    Southern,
    Eastern,
    Western,
}

impl Province {
    pub const ALL: [Province; 5] = [
        Province::Kigali,
        Province::Northern,
        Province::Southern,
        Province::Eastern,
        Province::Western,
    ];

    /// Canonical, capitalized name as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Province::Kigali => "Kigali",
            Province::Northern => "Northern",
            Province::Southern => "Southern",
            Province::Eastern => "Eastern",
            Province::Western => "Western",
        }
    }

    /// Case-insensitive lookup of a canonical name. Surrounding whitespace is ignored.
    pub fn from_name(name: &str) -> Option<Province> {
        let name = name.trim();
        Province::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(name))
    }
}

/// Category of permit, derived from the applicant's stated purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationType {
    WaterUse,
    ElectricityGeneration,
    Mining,
    WaterDiversion,
}

/// Use the water is put to, derived from the applicant's stated purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterPurpose {
    Domestic,
    Irrigation,
    Industrial,
    Commercial,
    Livestock,
    Aquaculture,
    ElectricityGeneration,
    Mining,
    Other,
}

/// A GeoJSON point. Axis order is `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<f64>,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        GeoPoint {
            kind: "Point".to_string(),
            coordinates: vec![longitude, latitude],
        }
    }

    /// Returns `(latitude, longitude)` when the point is well formed.
    pub fn lat_lon(&self) -> Option<(f64, f64)> {
        if self.kind != "Point" {
            return None;
        }
        match self.coordinates.as_slice() {
            [lon, lat] if lon.is_finite() && lat.is_finite() => Some((*lat, *lon)),
            _ => None,
        }
    }
}

/// Every writable column of the `applications` table.
///
/// Serialized with absent columns omitted, which is what makes it usable as a
/// partial update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sla_status: Option<SlaStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub permit_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_type: Option<ApplicationType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_purpose: Option<WaterPurpose>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_usage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_usage_unit: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<Province>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub village: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_description: Option<String>,
    /// A [`GeoPoint`] when written by the codec. Kept untyped so that a
    /// malformed stored value still loads and is rejected by the decoder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_taking_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_measuring_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_facilities: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_flow_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concession_duration: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub electricity_generation_capacity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mining_operations_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_diversion_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infrastructure_valves: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub potential_environmental_effects: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mitigation_actions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_notes: Option<String>,
}

impl ApplicationPatch {
    /// Column names, in table order. Matches the serialized field names.
    pub const COLUMNS: &'static [&'static str] = &[
        "status",
        "sla_status",
        "applicant_id",
        "permit_type",
        "applicant_type",
        "application_type",
        "water_purpose",
        "water_source",
        "water_usage",
        "water_usage_unit",
        "province",
        "district",
        "sector",
        "cell",
        "village",
        "location_description",
        "coordinates",
        "project_title",
        "project_description",
        "water_taking_method",
        "water_measuring_method",
        "storage_facilities",
        "return_flow_description",
        "concession_duration",
        "electricity_generation_capacity",
        "mining_operations_type",
        "water_diversion_details",
        "infrastructure_valves",
        "potential_environmental_effects",
        "mitigation_actions",
        "internal_notes",
    ];
}

/// One stored application: storage-owned identity and timestamps plus the
/// writable columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub fields: ApplicationPatch,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn province_lookup_ignores_case_and_padding() {
        assert_eq!(Province::from_name("kigali"), Some(Province::Kigali));
        assert_eq!(Province::from_name(" WESTERN "), Some(Province::Western));
        assert_eq!(Province::from_name("Atlantis"), None);
    }

    #[test]
    fn patch_omits_absent_columns() {
        let patch = ApplicationPatch {
            project_title: Some("Rusumo".to_string()),
            status: Some(ApplicationStatus::Draft),
            ..ApplicationPatch::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, json!({"status": "draft", "project_title": "Rusumo"}));
    }

    #[test]
    fn patch_fields_match_column_list() {
        let patch = ApplicationPatch {
            status: Some(ApplicationStatus::Submitted),
            sla_status: Some(SlaStatus::OnTrack),
            applicant_id: Some(String::new()),
            permit_type: Some(String::new()),
            applicant_type: Some(String::new()),
            application_type: Some(ApplicationType::Mining),
            water_purpose: Some(WaterPurpose::Mining),
            water_source: Some(String::new()),
            water_usage: Some(1.0),
            water_usage_unit: Some(String::new()),
            province: Some(Province::Eastern),
            district: Some(String::new()),
            sector: Some(String::new()),
            cell: Some(String::new()),
            village: Some(String::new()),
            location_description: Some(String::new()),
            coordinates: Some(json!(null)),
            project_title: Some(String::new()),
            project_description: Some(String::new()),
            water_taking_method: Some(String::new()),
            water_measuring_method: Some(String::new()),
            storage_facilities: Some(String::new()),
            return_flow_description: Some(String::new()),
            concession_duration: Some(String::new()),
            electricity_generation_capacity: Some(String::new()),
            mining_operations_type: Some(String::new()),
            water_diversion_details: Some(String::new()),
            infrastructure_valves: Some(String::new()),
            potential_environmental_effects: Some(String::new()),
            mitigation_actions: Some(String::new()),
            internal_notes: Some(String::new()),
        };
        let value = serde_json::to_value(&patch).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        let mut expected = ApplicationPatch::COLUMNS.to_vec();
        expected.sort_unstable();
        let mut keys = keys;
        keys.sort_unstable();
        assert_eq!(keys, expected);
    }

    #[test]
    fn record_flattens_columns() {
        let record: ApplicationRecord = serde_json::from_value(json!({
            "id": "a1",
            "status": "submitted",
            "province": "Northern",
            "water_usage": 40,
            "coordinates": {"type": "Point", "coordinates": [30.06, -1.95]}
        }))
        .unwrap();
        assert_eq!(record.id, "a1");
        assert_eq!(record.fields.status, Some(ApplicationStatus::Submitted));
        assert_eq!(record.fields.province, Some(Province::Northern));
        assert_eq!(record.fields.water_usage, Some(40.0));
        assert!(record.fields.coordinates.is_some());
    }

    #[test]
    fn geo_point_swaps_axes() {
        let point = GeoPoint::new(-1.95, 30.06);
        assert_eq!(point.coordinates, vec![30.06, -1.95]);
        assert_eq!(point.lat_lon(), Some((-1.95, 30.06)));
    }

    #[test]
    fn sla_follows_status() {
        assert_eq!(SlaStatus::from(ApplicationStatus::Draft), SlaStatus::Pending);
        assert_eq!(SlaStatus::from(ApplicationStatus::Submitted), SlaStatus::OnTrack);
    }
}
