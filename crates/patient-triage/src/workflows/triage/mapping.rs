use std::collections::HashMap;
use std::sync::OnceLock;

/// Logical fields the normalizer resolves from loosely named keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum PatientField {
    Id,
    BloodPressure,
    Temperature,
    Age,
}

static FIELD_ALIASES: OnceLock<HashMap<PatientField, &'static [&'static str]>> = OnceLock::new();

/// Keys to try for `field`, most canonical first.
pub(crate) fn aliases_for(field: PatientField) -> &'static [&'static str] {
    field_aliases().get(&field).copied().unwrap_or(&[])
}

fn field_aliases() -> &'static HashMap<PatientField, &'static [&'static str]> {
    FIELD_ALIASES.get_or_init(|| {
        const FIELD_TO_KEYS: &[(PatientField, &[&str])] = &[
            (PatientField::Id, &["patient_id", "patient id", "patientId"]),
            (
                PatientField::BloodPressure,
                // "blood_prcssure" shows up in live upstream data.
                &["blood_pressure", "blood_prcssure", "blood pressure"],
            ),
            (PatientField::Temperature, &["temperature"]),
            (PatientField::Age, &["age"]),
        ];

        FIELD_TO_KEYS.iter().copied().collect()
    })
}
