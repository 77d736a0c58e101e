//! Declarative description of every composite storage column.
//!
//! A composite column packs several form fields into one string:
//!
//! ```text
//! slot     := fragment (" | " fragment)*
//! fragment := <label> " " <value> | <value>
//! ```
//!
//! Only the first sub-field of a slot may be positional (unlabeled). Labels end
//! with a colon, and the colon terminates the token, so `Intake:` never matches
//! a fragment that starts with `Intake Flow:`.
//!
//! The order of `SlotSchema::fields` is both the join order when encoding and
//! the scan order when decoding. Existing rows depend on the labels and units
//! below; change them only together with a data migration.

use crate::model::application::ApplicationPatch;
use crate::model::form::FormModel;

/// Separator between fragments of a composite column.
pub const SEPARATOR: &str = " | ";

/// A string-valued form field that can live inside a composite column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    ReturnFlowQuality,
    PowerGenerationType,
    TurbineType,
    MiningType,
    MiningMethod,
    MineralType,
    IntakeLocation,
    IntakeLatitude,
    IntakeLongitude,
    DischargeLocation,
    DischargeLatitude,
    DischargeLongitude,
    StreamVariation,
    StructureConfiguration,
    ValveDetails,
    PipeDetails,
    BackflowControlDevices,
    MeterDetails,
    IndustryType,
    IndustryDetails,
    Purpose,
}

impl TextField {
    pub fn get(self, form: &FormModel) -> Option<&str> {
        let value = match self {
            TextField::ReturnFlowQuality => &form.return_flow_quality,
            TextField::PowerGenerationType => &form.power_generation_type,
            TextField::TurbineType => &form.turbine_type,
            TextField::MiningType => &form.mining_type,
            TextField::MiningMethod => &form.mining_method,
            TextField::MineralType => &form.mineral_type,
            TextField::IntakeLocation => &form.intake_location,
            TextField::IntakeLatitude => &form.intake_latitude,
            TextField::IntakeLongitude => &form.intake_longitude,
            TextField::DischargeLocation => &form.discharge_location,
            TextField::DischargeLatitude => &form.discharge_latitude,
            TextField::DischargeLongitude => &form.discharge_longitude,
            TextField::StreamVariation => &form.stream_variation,
            TextField::StructureConfiguration => &form.structure_configuration,
            TextField::ValveDetails => &form.valve_details,
            TextField::PipeDetails => &form.pipe_details,
            TextField::BackflowControlDevices => &form.backflow_control_devices,
            TextField::MeterDetails => &form.meter_details,
            TextField::IndustryType => &form.industry_type,
            TextField::IndustryDetails => &form.industry_details,
            TextField::Purpose => &form.purpose,
        };
        value.as_deref()
    }

    pub fn get_mut(self, form: &mut FormModel) -> &mut Option<String> {
        match self {
            TextField::ReturnFlowQuality => &mut form.return_flow_quality,
            TextField::PowerGenerationType => &mut form.power_generation_type,
            TextField::TurbineType => &mut form.turbine_type,
            TextField::MiningType => &mut form.mining_type,
            TextField::MiningMethod => &mut form.mining_method,
            TextField::MineralType => &mut form.mineral_type,
            TextField::IntakeLocation => &mut form.intake_location,
            TextField::IntakeLatitude => &mut form.intake_latitude,
            TextField::IntakeLongitude => &mut form.intake_longitude,
            TextField::DischargeLocation => &mut form.discharge_location,
            TextField::DischargeLatitude => &mut form.discharge_latitude,
            TextField::DischargeLongitude => &mut form.discharge_longitude,
            TextField::StreamVariation => &mut form.stream_variation,
            TextField::StructureConfiguration => &mut form.structure_configuration,
            TextField::ValveDetails => &mut form.valve_details,
            TextField::PipeDetails => &mut form.pipe_details,
            TextField::BackflowControlDevices => &mut form.backflow_control_devices,
            TextField::MeterDetails => &mut form.meter_details,
            TextField::IndustryType => &mut form.industry_type,
            TextField::IndustryDetails => &mut form.industry_details,
            TextField::Purpose => &mut form.purpose,
        }
    }
}

/// A numeric form field that can live inside a composite column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberField {
    ReturnFlowQuantity,
    InstalledCapacity,
    HeadHeight,
    MiningArea,
    IntakeFlow,
    IntakeElevation,
    DischargeFlow,
    DischargeElevation,
    PumpCapacity,
}

impl NumberField {
    pub fn get(self, form: &FormModel) -> Option<f64> {
        match self {
            NumberField::ReturnFlowQuantity => form.return_flow_quantity,
            NumberField::InstalledCapacity => form.installed_capacity,
            NumberField::HeadHeight => form.head_height,
            NumberField::MiningArea => form.mining_area,
            NumberField::IntakeFlow => form.intake_flow,
            NumberField::IntakeElevation => form.intake_elevation,
            NumberField::DischargeFlow => form.discharge_flow,
            NumberField::DischargeElevation => form.discharge_elevation,
            NumberField::PumpCapacity => form.pump_capacity,
        }
    }

    pub fn get_mut(self, form: &mut FormModel) -> &mut Option<f64> {
        match self {
            NumberField::ReturnFlowQuantity => &mut form.return_flow_quantity,
            NumberField::InstalledCapacity => &mut form.installed_capacity,
            NumberField::HeadHeight => &mut form.head_height,
            NumberField::MiningArea => &mut form.mining_area,
            NumberField::IntakeFlow => &mut form.intake_flow,
            NumberField::IntakeElevation => &mut form.intake_elevation,
            NumberField::DischargeFlow => &mut form.discharge_flow,
            NumberField::DischargeElevation => &mut form.discharge_elevation,
            NumberField::PumpCapacity => &mut form.pump_capacity,
        }
    }
}

/// How a sub-field's value is rendered into, and recovered from, a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// The string value as typed.
    Raw(TextField),
    /// A number followed by `unit`, e.g. `12.5 hectares` or `45m`.
    Number { field: NumberField, unit: &'static str },
    /// Two decimal strings rendered `<lat>, <lon>`.
    CoordPair {
        latitude: TextField,
        longitude: TextField,
    },
}

/// One sub-field of a composite column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubField {
    /// Label token including the trailing colon, or `None` for the positional sub-field.
    pub label: Option<&'static str>,
    pub kind: Kind,
}

/// The composite columns handled by the generic grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    ReturnFlowDescription,
    ElectricityGenerationCapacity,
    MiningOperationsType,
    WaterDiversionDetails,
    InfrastructureValves,
    InternalNotes,
}

impl Column {
    pub fn name(self) -> &'static str {
        match self {
            Column::ReturnFlowDescription => "return_flow_description",
            Column::ElectricityGenerationCapacity => "electricity_generation_capacity",
            Column::MiningOperationsType => "mining_operations_type",
            Column::WaterDiversionDetails => "water_diversion_details",
            Column::InfrastructureValves => "infrastructure_valves",
            Column::InternalNotes => "internal_notes",
        }
    }

    pub fn get(self, patch: &ApplicationPatch) -> Option<&str> {
        let value = match self {
            Column::ReturnFlowDescription => &patch.return_flow_description,
            Column::ElectricityGenerationCapacity => &patch.electricity_generation_capacity,
            Column::MiningOperationsType => &patch.mining_operations_type,
            Column::WaterDiversionDetails => &patch.water_diversion_details,
            Column::InfrastructureValves => &patch.infrastructure_valves,
            Column::InternalNotes => &patch.internal_notes,
        };
        value.as_deref()
    }

    pub fn get_mut(self, patch: &mut ApplicationPatch) -> &mut Option<String> {
        match self {
            Column::ReturnFlowDescription => &mut patch.return_flow_description,
            Column::ElectricityGenerationCapacity => &mut patch.electricity_generation_capacity,
            Column::MiningOperationsType => &mut patch.mining_operations_type,
            Column::WaterDiversionDetails => &mut patch.water_diversion_details,
            Column::InfrastructureValves => &mut patch.infrastructure_valves,
            Column::InternalNotes => &mut patch.internal_notes,
        }
    }
}

/// Layout of one composite column.
#[derive(Debug, Clone, Copy)]
pub struct SlotSchema {
    pub column: Column,
    pub fields: &'static [SubField],
}

const fn positional(field: TextField) -> SubField {
    SubField {
        label: None,
        kind: Kind::Raw(field),
    }
}

const fn raw(label: &'static str, field: TextField) -> SubField {
    SubField {
        label: Some(label),
        kind: Kind::Raw(field),
    }
}

const fn number(label: &'static str, field: NumberField, unit: &'static str) -> SubField {
    SubField {
        label: Some(label),
        kind: Kind::Number { field, unit },
    }
}

const fn coord_pair(label: &'static str, latitude: TextField, longitude: TextField) -> SubField {
    SubField {
        label: Some(label),
        kind: Kind::CoordPair {
            latitude,
            longitude,
        },
    }
}

pub const RETURN_FLOW: SlotSchema = SlotSchema {
    column: Column::ReturnFlowDescription,
    fields: &[
        positional(TextField::ReturnFlowQuality),
        number("Quantity:", NumberField::ReturnFlowQuantity, "m³/day"),
    ],
};

pub const ELECTRICITY: SlotSchema = SlotSchema {
    column: Column::ElectricityGenerationCapacity,
    fields: &[
        raw("Type:", TextField::PowerGenerationType),
        number("Capacity:", NumberField::InstalledCapacity, " MW"),
        raw("Turbine:", TextField::TurbineType),
        number("Head:", NumberField::HeadHeight, "m"),
    ],
};

pub const MINING: SlotSchema = SlotSchema {
    column: Column::MiningOperationsType,
    fields: &[
        raw("Type:", TextField::MiningType),
        raw("Method:", TextField::MiningMethod),
        raw("Mineral:", TextField::MineralType),
        number("Area:", NumberField::MiningArea, " hectares"),
    ],
};

pub const DIVERSION: SlotSchema = SlotSchema {
    column: Column::WaterDiversionDetails,
    fields: &[
        raw("Intake:", TextField::IntakeLocation),
        number("Intake Flow:", NumberField::IntakeFlow, " m³/s"),
        coord_pair(
            "Intake Coordinates:",
            TextField::IntakeLatitude,
            TextField::IntakeLongitude,
        ),
        number("Intake Elevation:", NumberField::IntakeElevation, "m"),
        raw("Discharge:", TextField::DischargeLocation),
        number("Discharge Flow:", NumberField::DischargeFlow, " m³/s"),
        coord_pair(
            "Discharge Coordinates:",
            TextField::DischargeLatitude,
            TextField::DischargeLongitude,
        ),
        number("Discharge Elevation:", NumberField::DischargeElevation, "m"),
        raw("Stream Variation:", TextField::StreamVariation),
        raw("Structure:", TextField::StructureConfiguration),
    ],
};

pub const INFRASTRUCTURE: SlotSchema = SlotSchema {
    column: Column::InfrastructureValves,
    fields: &[
        positional(TextField::ValveDetails),
        raw("Pipes:", TextField::PipeDetails),
        number("Pump:", NumberField::PumpCapacity, " m³/h"),
        raw("Backflow:", TextField::BackflowControlDevices),
        raw("Meter:", TextField::MeterDetails),
    ],
};

/// `Purpose:` keeps the applicant's own term so that purposes sharing a
/// `water_purpose` value can still be told apart on decode.
pub const NOTES: SlotSchema = SlotSchema {
    column: Column::InternalNotes,
    fields: &[
        raw("Industry:", TextField::IndustryType),
        raw("Details:", TextField::IndustryDetails),
        raw("Purpose:", TextField::Purpose),
    ],
};

/// Every composite column driven by the generic grammar.
pub const SLOTS: &[SlotSchema] = &[
    RETURN_FLOW,
    ELECTRICITY,
    MINING,
    DIVERSION,
    INFRASTRUCTURE,
    NOTES,
];

impl SlotSchema {
    /// Labels of every labeled sub-field, in schema order.
    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().filter_map(|f| f.label)
    }

    /// The positional sub-field's target, if the slot has one.
    pub fn positional(&self) -> Option<TextField> {
        match self.fields.first() {
            Some(SubField {
                label: None,
                kind: Kind::Raw(field),
            }) => Some(*field),
            _ => None,
        }
    }

    /// Checks the layout rules the grammar relies on.
    pub fn validate(&self) -> Result<(), String> {
        for (idx, field) in self.fields.iter().enumerate() {
            match (field.label, field.kind) {
                (None, Kind::Raw(_)) if idx == 0 => {}
                (None, _) => {
                    return Err(format!(
                        "{}: positional sub-field must be raw and declared first (index {})",
                        self.column.name(),
                        idx
                    ));
                }
                (Some(label), _) => {
                    if !label.ends_with(':') || label.len() < 2 {
                        return Err(format!(
                            "{}: label '{}' must end with ':'",
                            self.column.name(),
                            label
                        ));
                    }
                    if label.contains(SEPARATOR.trim()) {
                        return Err(format!(
                            "{}: label '{}' contains the separator",
                            self.column.name(),
                            label
                        ));
                    }
                }
            }
        }

        let labels: Vec<&str> = self.labels().collect();
        for (i, a) in labels.iter().enumerate() {
            for b in &labels[i + 1..] {
                if a == b {
                    return Err(format!("{}: duplicate label '{}'", self.column.name(), a));
                }
                if a.starts_with(b) || b.starts_with(a) {
                    return Err(format!(
                        "{}: labels '{}' and '{}' share a prefix",
                        self.column.name(),
                        a,
                        b
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_slot_is_valid() {
        for slot in SLOTS {
            assert_eq!(slot.validate(), Ok(()), "{}", slot.column.name());
        }
    }

    #[test]
    fn every_slot_names_a_patch_column() {
        for slot in SLOTS {
            assert!(ApplicationPatch::COLUMNS.contains(&slot.column.name()));
        }
    }

    #[test]
    fn rejects_late_positional() {
        const LATE: SlotSchema = SlotSchema {
            column: Column::InternalNotes,
            fields: &[
                raw("Industry:", TextField::IndustryType),
                positional(TextField::IndustryDetails),
            ],
        };
        assert!(LATE.validate().is_err());
    }

    #[test]
    fn rejects_duplicate_and_unterminated_labels() {
        const DUPLICATE: SlotSchema = SlotSchema {
            column: Column::InternalNotes,
            fields: &[
                raw("Industry:", TextField::IndustryType),
                raw("Industry:", TextField::IndustryDetails),
            ],
        };
        assert!(DUPLICATE.validate().is_err());

        const UNTERMINATED: SlotSchema = SlotSchema {
            column: Column::InternalNotes,
            fields: &[raw("Industry", TextField::IndustryType)],
        };
        assert!(UNTERMINATED.validate().is_err());
    }

    #[test]
    fn rejects_label_that_prefixes_another() {
        const NESTED: SlotSchema = SlotSchema {
            column: Column::InternalNotes,
            fields: &[
                raw("Industry:", TextField::IndustryType),
                raw("Industry: Details:", TextField::IndustryDetails),
            ],
        };
        assert_eq!(
            NESTED.validate(),
            Err(
                "internal_notes: labels 'Industry:' and 'Industry: Details:' share a prefix"
                    .to_string()
            )
        );
    }

    #[test]
    fn positional_is_reported_only_when_first() {
        assert_eq!(RETURN_FLOW.positional(), Some(TextField::ReturnFlowQuality));
        assert_eq!(INFRASTRUCTURE.positional(), Some(TextField::ValveDetails));
        assert_eq!(MINING.positional(), None);
    }

    #[test]
    fn field_accessors_write_through() {
        let mut form = FormModel::default();
        *TextField::MiningType.get_mut(&mut form) = Some("Open Pit".to_string());
        *NumberField::MiningArea.get_mut(&mut form) = Some(12.5);
        assert_eq!(form.mining_type.as_deref(), Some("Open Pit"));
        assert_eq!(NumberField::MiningArea.get(&form), Some(12.5));
        assert_eq!(TextField::MiningType.get(&form), Some("Open Pit"));
    }
}
