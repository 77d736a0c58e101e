//! Generic encode/decode engine for composite columns described in `schema`.

use super::CodecWarning;
use super::schema::{Kind, SEPARATOR, SlotSchema, SubField};
use crate::model::form::FormModel;
use regex::Regex;
use std::sync::LazyLock;

/// Anything that is not part of a decimal number: units, thousands separators, spaces.
static NON_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9.\-]").expect("static regex"));

/// Renders a number without trailing zeros: `100`, `12.5`, `-1.95`.
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}

/// Parses a number out of a fragment value such as `2000m³` or `1,200 m`.
///
/// Every character other than ASCII digits, `.` and `-` is dropped before
/// parsing. Returns `None` rather than zero when nothing parsable is left.
pub fn parse_number(text: &str) -> Option<f64> {
    let digits = NON_NUMERIC.replace_all(text, "");
    digits.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parses a decimal string exactly as typed, e.g. a latitude.
pub fn parse_decimal(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Trims a text value and makes it safe to embed in a fragment.
///
/// Returns `None` for empty values. A `|` inside a value would be read back as
/// a fragment boundary, so it is replaced with `/`. A positional value that
/// starts with one of the slot's labels would be read back as that labeled
/// field, so the label's colon becomes ` -`. Both rewrites record a warning.
fn clean_text(
    value: Option<&str>,
    slot: &SlotSchema,
    label: Option<&'static str>,
    warnings: &mut Vec<CodecWarning>,
) -> Option<String> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }

    let mut value = value.to_string();
    if value.contains('|') {
        warnings.push(CodecWarning::SeparatorRewritten {
            column: slot.column.name(),
            label,
        });
        value = value.replace('|', "/");
    }

    if label.is_none() {
        if let Some(taken) = slot.labels().find(|l| value.starts_with(l)) {
            warnings.push(CodecWarning::LabelCollision {
                column: slot.column.name(),
                label: taken,
            });
            let stem = taken.trim_end_matches(':');
            value = format!("{} -{}", stem, &value[taken.len()..]);
        }
    }
    Some(value)
}

fn render_value(
    sub: &SubField,
    slot: &SlotSchema,
    form: &FormModel,
    warnings: &mut Vec<CodecWarning>,
) -> Option<String> {
    match sub.kind {
        Kind::Raw(field) => clean_text(field.get(form), slot, sub.label, warnings),
        Kind::Number { field, unit } => field
            .get(form)
            .filter(|n| n.is_finite())
            .map(|n| format!("{}{}", format_number(n), unit)),
        Kind::CoordPair {
            latitude,
            longitude,
        } => {
            let lat = latitude.get(form).and_then(parse_decimal)?;
            let lon = longitude.get(form).and_then(parse_decimal)?;
            Some(format!("{}, {}", format_number(lat), format_number(lon)))
        }
    }
}

/// Packs the slot's sub-fields from `form` into one column value.
///
/// Returns `None` when no sub-field has a value, so the column is left out of
/// the patch instead of being overwritten with an empty string.
pub fn encode_slot(
    slot: &SlotSchema,
    form: &FormModel,
    warnings: &mut Vec<CodecWarning>,
) -> Option<String> {
    let fragments: Vec<String> = slot
        .fields
        .iter()
        .filter_map(|sub| {
            let value = render_value(sub, slot, form, warnings)?;
            Some(match sub.label {
                Some(label) => format!("{} {}", label, value),
                None => value,
            })
        })
        .collect();

    if fragments.is_empty() {
        None
    } else {
        Some(fragments.join(SEPARATOR))
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Unpacks a column value into the slot's sub-fields on `form`.
///
/// Every sub-field of the slot is assigned, so sub-fields missing from `raw`
/// end up `None`. Fragments that match no label are ignored.
pub fn decode_slot(slot: &SlotSchema, raw: Option<&str>, form: &mut FormModel) {
    let parts: Vec<&str> = raw
        .map(|raw| raw.split(SEPARATOR).map(str::trim).collect())
        .unwrap_or_default();

    for sub in slot.fields {
        match (sub.label, sub.kind) {
            (None, Kind::Raw(field)) => {
                let value = parts
                    .first()
                    .filter(|first| !slot.labels().any(|label| first.starts_with(label)))
                    .and_then(|first| non_empty(first));
                *field.get_mut(form) = value;
            }
            (None, _) => {}
            (Some(label), kind) => {
                let value = parts
                    .iter()
                    .find_map(|part| part.strip_prefix(label))
                    .map(str::trim);
                assign(kind, value, form);
            }
        }
    }
}

fn assign(kind: Kind, value: Option<&str>, form: &mut FormModel) {
    match kind {
        Kind::Raw(field) => *field.get_mut(form) = value.and_then(non_empty),
        Kind::Number { field, .. } => *field.get_mut(form) = value.and_then(parse_number),
        Kind::CoordPair {
            latitude,
            longitude,
        } => {
            let pair = value.and_then(|v| {
                let (lat, lon) = v.split_once(',')?;
                Some((parse_number(lat)?, parse_number(lon)?))
            });
            *latitude.get_mut(form) = pair.map(|(lat, _)| format_number(lat));
            *longitude.get_mut(form) = pair.map(|(_, lon)| format_number(lon));
        }
    }
}
