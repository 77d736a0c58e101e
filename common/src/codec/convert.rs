//! Converters for the columns that do not follow the label grammar.

use super::CodecWarning;
use super::grammar::{format_number, parse_decimal, parse_number};
use crate::model::application::{ApplicationType, GeoPoint, Province, WaterPurpose};
use log::debug;
use serde_json::Value;

const CAPACITY_LABEL: &str = "Capacity:";
const CAPACITY_OPEN: &str = "(Capacity: ";
const CAPACITY_CLOSE: &str = "m³)";

/// `storage_facilities`: the description, then ` (Capacity: <n>m³)` when a
/// capacity is known.
///
/// A description that already ends in a capacity group of its own would be
/// split on decode, so without a capacity that group is written in square
/// brackets and a warning is recorded.
pub fn encode_storage(
    facilities: Option<&str>,
    capacity: Option<f64>,
    warnings: &mut Vec<CodecWarning>,
) -> Option<String> {
    let facilities = facilities.map(str::trim).filter(|f| !f.is_empty());
    let capacity = capacity
        .filter(|c| c.is_finite())
        .map(|c| format!("{}{}{}", CAPACITY_OPEN, format_number(c), CAPACITY_CLOSE));

    match (facilities, capacity) {
        (Some(f), Some(c)) => Some(format!("{} {}", f, c)),
        (Some(f), None) => match split_capacity(f) {
            Some((start, _)) => {
                warnings.push(CodecWarning::LabelCollision {
                    column: "storage_facilities",
                    label: CAPACITY_LABEL,
                });
                let inner = &f[start + 1..f.len() - 1];
                Some(format!("{}[{}]", &f[..start], inner))
            }
            None => Some(f.to_string()),
        },
        (None, Some(c)) => Some(c),
        (None, None) => None,
    }
}

/// Byte offset of a trailing `(Capacity: <n>...)` group and its number.
fn split_capacity(raw: &str) -> Option<(usize, f64)> {
    let start = raw.rfind(CAPACITY_OPEN)?;
    let group = raw[start + CAPACITY_OPEN.len()..].strip_suffix(')')?;
    Some((start, parse_number(group)?))
}

/// Inverse of [`encode_storage`]. A trailing capacity group that does not
/// parse is kept as part of the description.
pub fn decode_storage(raw: Option<&str>) -> (Option<String>, Option<f64>) {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return (None, None);
    };

    match split_capacity(raw).map(|(start, capacity)| (raw[..start].trim(), capacity)) {
        Some((facilities, capacity)) => {
            let facilities = (!facilities.is_empty()).then(|| facilities.to_string());
            (facilities, Some(capacity))
        }
        None => (Some(raw.to_string()), None),
    }
}

/// Builds the stored point from the form's decimal strings. Both must parse.
pub fn encode_coordinates(latitude: Option<&str>, longitude: Option<&str>) -> Option<GeoPoint> {
    let lat = parse_decimal(latitude?)?;
    let lon = parse_decimal(longitude?)?;
    Some(GeoPoint::new(lat, lon))
}

/// Recovers `(latitude, longitude)` strings from a stored point.
///
/// Anything that is not a two-element `Point` is treated as absent.
pub fn decode_coordinates(value: Option<&Value>) -> (Option<String>, Option<String>) {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return (None, None);
    };

    let point = match serde_json::from_value::<GeoPoint>(value.clone()) {
        Ok(point) => point,
        Err(e) => {
            debug!("ignoring malformed coordinates {}: {}", value, e);
            return (None, None);
        }
    };

    match point.lat_lon() {
        Some((lat, lon)) => (Some(format_number(lat)), Some(format_number(lon))),
        None => {
            debug!("ignoring coordinates that are not a 2D point: {:?}", point);
            (None, None)
        }
    }
}

/// Outcome of mapping the free-text province onto the storage enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvinceMatch {
    Exact(Province),
    /// The input named no known province; the configured default was used.
    Fallback(Province),
}

impl ProvinceMatch {
    pub fn province(self) -> Province {
        match self {
            ProvinceMatch::Exact(p) | ProvinceMatch::Fallback(p) => p,
        }
    }
}

pub fn encode_province(input: Option<&str>, default: Province) -> Option<ProvinceMatch> {
    let input = input.map(str::trim).filter(|i| !i.is_empty())?;
    Some(match Province::from_name(input) {
        Some(p) => ProvinceMatch::Exact(p),
        None => ProvinceMatch::Fallback(default),
    })
}

pub fn decode_province(stored: Option<Province>) -> Option<String> {
    stored.map(|p| p.as_str().to_lowercase())
}

fn purpose_key(purpose: &str) -> String {
    purpose.trim().to_lowercase()
}

/// `purpose` to permit category.
pub fn application_type_for(purpose: &str) -> Option<ApplicationType> {
    match purpose_key(purpose).as_str() {
        "domestic" | "irrigation" | "industrial" | "commercial" | "livestock" | "aquaculture" => {
            Some(ApplicationType::WaterUse)
        }
        "hydropower" => Some(ApplicationType::ElectricityGeneration),
        "mining" => Some(ApplicationType::Mining),
        "diversion" => Some(ApplicationType::WaterDiversion),
        _ => None,
    }
}

/// `purpose` to water use. Not the inverse of [`purpose_for`]: `diversion`
/// has no water use of its own and lands in `other`.
pub fn water_purpose_for(purpose: &str) -> Option<WaterPurpose> {
    match purpose_key(purpose).as_str() {
        "domestic" => Some(WaterPurpose::Domestic),
        "irrigation" => Some(WaterPurpose::Irrigation),
        "industrial" => Some(WaterPurpose::Industrial),
        "commercial" => Some(WaterPurpose::Commercial),
        "livestock" => Some(WaterPurpose::Livestock),
        "aquaculture" => Some(WaterPurpose::Aquaculture),
        "hydropower" => Some(WaterPurpose::ElectricityGeneration),
        "mining" => Some(WaterPurpose::Mining),
        "diversion" => Some(WaterPurpose::Other),
        _ => None,
    }
}

/// Best-effort reverse of [`water_purpose_for`]. `other` is ambiguous and
/// yields `None`.
pub fn purpose_for(water_purpose: WaterPurpose) -> Option<&'static str> {
    match water_purpose {
        WaterPurpose::Domestic => Some("domestic"),
        WaterPurpose::Irrigation => Some("irrigation"),
        WaterPurpose::Industrial => Some("industrial"),
        WaterPurpose::Commercial => Some("commercial"),
        WaterPurpose::Livestock => Some("livestock"),
        WaterPurpose::Aquaculture => Some("aquaculture"),
        WaterPurpose::ElectricityGeneration => Some("hydropower"),
        WaterPurpose::Mining => Some("mining"),
        WaterPurpose::Other => None,
    }
}

/// Comma-joined district, sector, cell and village, skipping blanks.
pub fn location_description(parts: [Option<&str>; 4]) -> Option<String> {
    let parts: Vec<&str> = parts
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}
