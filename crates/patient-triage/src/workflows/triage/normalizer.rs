use serde_json::Value;

use super::mapping::{aliases_for, PatientField};
use crate::workflows::intake::RawRecord;

/// Canonical view of one patient record.
///
/// Temperature and age are carried as delivered; the scoring engine and the
/// validity classifier both tolerate non-numeric values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedRecord {
    pub id: Option<String>,
    pub blood_pressure: Option<String>,
    pub temperature: Option<Value>,
    pub age: Option<Value>,
}

/// Never fails: unknown shapes simply produce absent fields.
pub fn normalize(raw: &RawRecord) -> NormalizedRecord {
    NormalizedRecord {
        id: resolve(raw, PatientField::Id).and_then(text_value),
        blood_pressure: resolve(raw, PatientField::BloodPressure).and_then(text_value),
        temperature: resolve(raw, PatientField::Temperature).cloned(),
        age: resolve(raw, PatientField::Age).cloned(),
    }
}

/// First alias holding something other than null or a blank string.
fn resolve(raw: &RawRecord, field: PatientField) -> Option<&Value> {
    aliases_for(field)
        .iter()
        .filter_map(|key| raw.get(*key))
        .find(|value| !is_blank(value))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            other => panic!("fixture must be an object, got {other}"),
        }
    }

    #[test]
    fn resolves_canonical_keys() {
        let record = normalize(&raw(json!({
            "patient_id": "DEMO001",
            "blood_pressure": "120/80",
            "temperature": 98.6,
            "age": 45
        })));
        assert_eq!(record.id.as_deref(), Some("DEMO001"));
        assert_eq!(record.blood_pressure.as_deref(), Some("120/80"));
        assert_eq!(record.temperature, Some(json!(98.6)));
        assert_eq!(record.age, Some(json!(45)));
    }

    #[test]
    fn falls_back_to_misspelled_keys() {
        let record = normalize(&raw(json!({
            "patient id": "DEMO002",
            "blood_prcssure": "140/90"
        })));
        assert_eq!(record.id.as_deref(), Some("DEMO002"));
        assert_eq!(record.blood_pressure.as_deref(), Some("140/90"));
        assert_eq!(record.temperature, None);
        assert_eq!(record.age, None);
    }

    #[test]
    fn blank_canonical_value_defers_to_alias() {
        let record = normalize(&raw(json!({
            "patient_id": "  ",
            "patient id": "DEMO003",
            "blood_pressure": null,
            "blood_prcssure": "110/70"
        })));
        assert_eq!(record.id.as_deref(), Some("DEMO003"));
        assert_eq!(record.blood_pressure.as_deref(), Some("110/70"));
    }

    #[test]
    fn numeric_ids_become_strings_and_objects_are_dropped() {
        let record = normalize(&raw(json!({ "patient_id": 17, "blood_pressure": { "s": 1 } })));
        assert_eq!(record.id.as_deref(), Some("17"));
        assert_eq!(record.blood_pressure, None);
    }

    #[test]
    fn sentinel_text_is_preserved_for_the_classifier() {
        let record = normalize(&raw(json!({ "patient_id": "X", "temperature": "N/A" })));
        assert_eq!(record.temperature, Some(json!("N/A")));
    }
}
