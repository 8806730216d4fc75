use serde::Serialize;
use serde_json::Value;

use super::normalizer::NormalizedRecord;
use super::scoring::{numeric_value, BloodPressure};

/// Placeholder texts the upstream uses instead of leaving a field out.
pub const SENTINELS: &[&str] = &["", "null", "n/a", "invalid", "unknown"];

pub fn is_sentinel(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    SENTINELS.contains(&lowered.as_str())
}

/// Absent values and sentinel texts are unusable for any field.
pub fn is_invalid(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => is_sentinel(text),
        Some(_) => false,
    }
}

pub fn is_invalid_blood_pressure(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(text) if is_sentinel(text) => true,
        Some(text) => BloodPressure::parse(text).is_none(),
    }
}

/// Temperature and age: must parse to a number above zero.
pub fn is_invalid_measurement(value: Option<&Value>) -> bool {
    if is_invalid(value) {
        return true;
    }
    match value.and_then(numeric_value) {
        Some(number) => number <= 0.0,
        None => true,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldValidity {
    pub bp_valid: bool,
    pub temp_valid: bool,
    pub age_valid: bool,
}

impl FieldValidity {
    pub fn classify(record: &NormalizedRecord) -> Self {
        Self {
            bp_valid: !is_invalid_blood_pressure(record.blood_pressure.as_deref()),
            temp_valid: !is_invalid_measurement(record.temperature.as_ref()),
            age_valid: !is_invalid_measurement(record.age.as_ref()),
        }
    }

    pub fn has_issue(&self) -> bool {
        !(self.bp_valid && self.temp_valid && self.age_valid)
    }

    pub fn invalid_fields(&self) -> Vec<&'static str> {
        [
            (self.bp_valid, "blood_pressure"),
            (self.temp_valid, "temperature"),
            (self.age_valid, "age"),
        ]
        .into_iter()
        .filter(|(valid, _)| !valid)
        .map(|(_, name)| name)
        .collect()
    }
}
