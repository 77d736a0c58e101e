//! # Application Record Codec
//!
//! Maps the flat [`FormModel`] edited in the portal onto the narrower
//! `applications` storage schema and back.
//!
//! ## Encoding
//! [`Codec::encode_application`] turns a form and a target status into an
//! [`ApplicationPatch`]:
//! - scalar fields are copied 1:1, blanks are left out of the patch;
//! - composite columns are packed by the generic grammar in `grammar`, following
//!   the layouts in `schema`;
//! - `storage_facilities`, `coordinates`, `province`, `application_type`,
//!   `water_purpose` and `location_description` go through the converters in
//!   `convert`.
//!
//! ## Decoding
//! [`Codec::decode_application`] rebuilds a form from a stored record and the
//! caller's [`UserContext`]. Missing or unreadable values come back as `None`;
//! nothing in a stored row can make decoding fail.
//!
//! Neither direction performs I/O or returns an error. Anomalies the applicant
//! may want to fix (an unknown province, half a coordinate pair) are reported as
//! [`CodecWarning`]s next to the patch and logged.

pub mod convert;
pub mod grammar;
pub mod schema;

use crate::model::application::{
    ApplicationPatch, ApplicationRecord, ApplicationStatus, Province, SlaStatus,
};
use crate::model::form::{FormModel, UserContext};
use convert::ProvinceMatch;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Values the encoder falls back on when the form does not provide them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Stored when the form names a province that does not exist.
    #[serde(default = "default_province")]
    pub default_province: Province,
    /// Written to `applicant_id` until applicant accounts are linked to records.
    #[serde(default = "default_applicant_id")]
    pub applicant_id: String,
}

fn default_province() -> Province {
    Province::Kigali
}

fn default_applicant_id() -> String {
    "00000000-0000-0000-0000-000000000000".to_string()
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            default_province: default_province(),
            applicant_id: default_applicant_id(),
        }
    }
}

/// Something in the form that could not be stored exactly as entered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CodecWarning {
    /// The province was not recognised and `stored` was written instead.
    ProvinceFallback { input: String, stored: Province },
    /// Latitude/longitude were not both valid numbers; `coordinates` was left out.
    InvalidCoordinates {
        latitude: Option<String>,
        longitude: Option<String>,
    },
    /// No category is known for this purpose; `application_type` and
    /// `water_purpose` were left out.
    UnknownPurpose { purpose: String },
    /// A `|` in the value was replaced with `/`.
    SeparatorRewritten {
        column: &'static str,
        label: Option<&'static str>,
    },
    /// Text the applicant typed would have been read back as the `label` part of
    /// `column`, so it was rewritten: an unlabeled value starting with a label
    /// gets ` -` for the colon, a storage description ending in its own capacity
    /// group gets square brackets.
    LabelCollision {
        column: &'static str,
        label: &'static str,
    },
}

impl fmt::Display for CodecWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecWarning::ProvinceFallback { input, stored } => write!(
                f,
                "unknown province '{}', stored '{}'",
                input,
                stored.as_str()
            ),
            CodecWarning::InvalidCoordinates {
                latitude,
                longitude,
            } => write!(
                f,
                "coordinates not stored: latitude={:?} longitude={:?}",
                latitude, longitude
            ),
            CodecWarning::UnknownPurpose { purpose } => {
                write!(f, "no permit category for purpose '{}'", purpose)
            }
            CodecWarning::SeparatorRewritten { column, label } => write!(
                f,
                "'|' replaced with '/' in {} {}",
                column,
                label.unwrap_or("(unlabeled)")
            ),
            CodecWarning::LabelCollision { column, label } => write!(
                f,
                "value in {} would be read back as '{}' and was rewritten",
                column, label
            ),
        }
    }
}

/// Result of encoding a form.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub patch: ApplicationPatch,
    pub warnings: Vec<CodecWarning>,
}

/// Stateless; share one instance freely between threads.
#[derive(Debug, Clone, Default)]
pub struct Codec {
    config: CodecConfig,
}

fn text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn has_text(value: &Option<String>) -> bool {
    text(value).is_some()
}

impl Codec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Builds the storage patch for `form` saved with `status`.
    pub fn encode_application(&self, form: &FormModel, status: ApplicationStatus) -> Encoded {
        let mut warnings = Vec::new();
        let mut patch = ApplicationPatch {
            status: Some(status),
            sla_status: Some(SlaStatus::from(status)),
            applicant_id: Some(self.config.applicant_id.clone()),

            permit_type: text(&form.permit_type),
            applicant_type: text(&form.applicant_type),
            water_source: text(&form.water_source),
            water_usage: form.water_usage.filter(|n| n.is_finite()),
            water_usage_unit: text(&form.water_usage_unit),

            district: text(&form.district),
            sector: text(&form.sector),
            cell: text(&form.cell),
            village: text(&form.village),
            location_description: convert::location_description([
                form.district.as_deref(),
                form.sector.as_deref(),
                form.cell.as_deref(),
                form.village.as_deref(),
            ]),

            project_title: text(&form.project_title),
            project_description: text(&form.project_description),

            water_taking_method: text(&form.water_taking_method),
            water_measuring_method: text(&form.water_measuring_method),
            storage_facilities: convert::encode_storage(
                form.storage_facilities.as_deref(),
                form.storage_capacity,
                &mut warnings,
            ),
            concession_duration: text(&form.concession_duration),

            potential_environmental_effects: text(&form.potential_effects),
            mitigation_actions: text(&form.mitigation_actions),
            ..ApplicationPatch::default()
        };

        match convert::encode_province(form.province.as_deref(), self.config.default_province) {
            Some(ProvinceMatch::Fallback(stored)) => {
                warnings.push(CodecWarning::ProvinceFallback {
                    input: form.province.clone().unwrap_or_default(),
                    stored,
                });
                patch.province = Some(stored);
            }
            matched => patch.province = matched.map(ProvinceMatch::province),
        }

        if let Some(purpose) = text(&form.purpose) {
            patch.application_type = convert::application_type_for(&purpose);
            patch.water_purpose = convert::water_purpose_for(&purpose);
            if patch.application_type.is_none() && patch.water_purpose.is_none() {
                warnings.push(CodecWarning::UnknownPurpose { purpose });
            }
        }

        let point =
            convert::encode_coordinates(form.latitude.as_deref(), form.longitude.as_deref());
        match point {
            Some(point) => patch.coordinates = serde_json::to_value(point).ok(),
            None if has_text(&form.latitude) || has_text(&form.longitude) => {
                warnings.push(CodecWarning::InvalidCoordinates {
                    latitude: form.latitude.clone(),
                    longitude: form.longitude.clone(),
                });
            }
            None => {}
        }

        for slot in schema::SLOTS {
            *slot.column.get_mut(&mut patch) = grammar::encode_slot(slot, form, &mut warnings);
        }

        for warning in &warnings {
            warn!("encoding application: {}", warning);
        }

        Encoded { patch, warnings }
    }

    /// Rebuilds the form for a stored application, filling identity from `user`.
    pub fn decode_application(&self, record: &ApplicationRecord, user: &UserContext) -> FormModel {
        let fields = &record.fields;
        let (storage_facilities, storage_capacity) =
            convert::decode_storage(fields.storage_facilities.as_deref());
        let (latitude, longitude) = convert::decode_coordinates(fields.coordinates.as_ref());

        let mut form = FormModel {
            permit_type: fields.permit_type.clone(),
            applicant_type: fields.applicant_type.clone(),
            water_source: fields.water_source.clone(),
            water_usage: fields.water_usage,
            water_usage_unit: fields.water_usage_unit.clone(),

            province: convert::decode_province(fields.province),
            district: fields.district.clone(),
            sector: fields.sector.clone(),
            cell: fields.cell.clone(),
            village: fields.village.clone(),
            latitude,
            longitude,

            project_title: fields.project_title.clone(),
            project_description: fields.project_description.clone(),

            water_taking_method: fields.water_taking_method.clone(),
            water_measuring_method: fields.water_measuring_method.clone(),
            storage_facilities,
            storage_capacity,
            concession_duration: fields.concession_duration.clone(),

            potential_effects: fields.potential_environmental_effects.clone(),
            mitigation_actions: fields.mitigation_actions.clone(),
            ..FormModel::default()
        };

        for slot in schema::SLOTS {
            grammar::decode_slot(slot, slot.column.get(fields), &mut form);
        }

        // Rows written before `Purpose:` was recorded only have the water_purpose column.
        if form.purpose.is_none() {
            form.purpose = fields
                .water_purpose
                .and_then(convert::purpose_for)
                .map(str::to_string);
        }

        form.apply_user(user);
        form
    }
}
