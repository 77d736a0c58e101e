use serde::{Deserialize, Serialize};

/// The flat, UI-facing shape of a permit application.
///
/// Every field is optional: a new application starts from `FormModel::default()`
/// and widgets fill it in as the applicant works through the form. The groups
/// below are conceptual only; storage packs several of them into shared columns
/// (see `codec::schema`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormModel {
    // Identity and contact. Sourced from the session, never stored by the codec.
    pub applicant_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub organization: Option<String>,

    // Permit classification.
    pub permit_type: Option<String>,
    pub applicant_type: Option<String>,
    /// UI purpose term, e.g. `irrigation`, `hydropower`, `mining`, `diversion`.
    pub purpose: Option<String>,
    pub water_source: Option<String>,
    pub water_usage: Option<f64>,
    pub water_usage_unit: Option<String>,

    // Location.
    /// Lower-case free text; storage holds the capitalized canonical name.
    pub province: Option<String>,
    pub district: Option<String>,
    pub sector: Option<String>,
    pub cell: Option<String>,
    pub village: Option<String>,
    /// Decimal degrees as typed by the applicant.
    pub latitude: Option<String>,
    pub longitude: Option<String>,

    // Project.
    pub project_title: Option<String>,
    pub project_description: Option<String>,

    // Technical.
    pub water_taking_method: Option<String>,
    pub water_measuring_method: Option<String>,
    pub storage_facilities: Option<String>,
    /// Cubic metres.
    pub storage_capacity: Option<f64>,
    pub return_flow_quality: Option<String>,
    /// Cubic metres per day.
    pub return_flow_quantity: Option<f64>,
    pub concession_duration: Option<String>,

    // Electricity generation.
    pub power_generation_type: Option<String>,
    /// Megawatts.
    pub installed_capacity: Option<f64>,
    pub turbine_type: Option<String>,
    /// Metres.
    pub head_height: Option<f64>,

    // Mining.
    pub mining_type: Option<String>,
    pub mining_method: Option<String>,
    pub mineral_type: Option<String>,
    /// Hectares.
    pub mining_area: Option<f64>,

    // Water diversion.
    pub intake_location: Option<String>,
    pub intake_flow: Option<f64>,
    pub intake_latitude: Option<String>,
    pub intake_longitude: Option<String>,
    pub intake_elevation: Option<f64>,
    pub discharge_location: Option<String>,
    pub discharge_flow: Option<f64>,
    pub discharge_latitude: Option<String>,
    pub discharge_longitude: Option<String>,
    pub discharge_elevation: Option<f64>,
    pub stream_variation: Option<String>,
    pub structure_configuration: Option<String>,

    // Infrastructure.
    pub pipe_details: Option<String>,
    /// Cubic metres per hour.
    pub pump_capacity: Option<f64>,
    pub valve_details: Option<String>,
    pub backflow_control_devices: Option<String>,
    pub meter_details: Option<String>,

    // Environmental.
    pub potential_effects: Option<String>,
    pub mitigation_actions: Option<String>,

    // Metadata.
    pub industry_type: Option<String>,
    pub industry_details: Option<String>,
}

/// Identity of the signed-in applicant, supplied by the caller when a stored
/// application is reopened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserContext {
    pub applicant_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub organization: Option<String>,
}

impl FormModel {
    /// Copies identity and contact fields from the session.
    pub fn apply_user(&mut self, user: &UserContext) {
        self.applicant_name = user.applicant_name.clone();
        self.email = user.email.clone();
        self.phone = user.phone.clone();
        self.national_id = user.national_id.clone();
        self.organization = user.organization.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_with_missing_fields() {
        let form: FormModel = serde_json::from_str(
            r#"{"projectTitle":"Nyabarongo intake","miningArea":12.5,"province":"kigali"}"#,
        )
        .unwrap();
        assert_eq!(form.project_title.as_deref(), Some("Nyabarongo intake"));
        assert_eq!(form.mining_area, Some(12.5));
        assert_eq!(form.province.as_deref(), Some("kigali"));
        assert!(form.purpose.is_none());
    }

    #[test]
    fn apply_user_overwrites_identity_only() {
        let mut form = FormModel {
            project_title: Some("Kanzenze weir".to_string()),
            email: Some("stale@example.rw".to_string()),
            ..FormModel::default()
        };
        form.apply_user(&UserContext {
            applicant_name: Some("Aline Uwase".to_string()),
            email: Some("aline@example.rw".to_string()),
            ..UserContext::default()
        });
        assert_eq!(form.applicant_name.as_deref(), Some("Aline Uwase"));
        assert_eq!(form.email.as_deref(), Some("aline@example.rw"));
        assert_eq!(form.project_title.as_deref(), Some("Kanzenze weir"));
    }
}
