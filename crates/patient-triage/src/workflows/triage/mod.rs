//! Rule-based triage of normalized patient records into alert lists.

mod mapping;
pub mod normalizer;
pub mod scoring;
pub mod validity;

pub use normalizer::{normalize, NormalizedRecord};
pub use scoring::{
    age_points, score_age, score_blood_pressure, score_temperature, temperature_points,
    BloodPressure, BloodPressureStage, ScoreSet,
};
pub use validity::{is_invalid, FieldValidity};

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::workflows::intake::RawRecord;
use scoring::numeric_value;

pub const HIGH_RISK_THRESHOLD: u8 = 4;
pub const FEVER_THRESHOLD: f64 = scoring::FEVER_LOW_GRADE;

/// Outcome of triaging one attributable record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordAssessment {
    pub patient_id: String,
    pub scores: ScoreSet,
    pub validity: FieldValidity,
    pub fever: bool,
}

impl RecordAssessment {
    pub fn is_high_risk(&self) -> bool {
        self.scores.total >= HIGH_RISK_THRESHOLD
    }
}

/// Triage a single raw record; `None` when it carries no patient id.
pub fn assess(raw: &RawRecord) -> Option<RecordAssessment> {
    let record = normalize(raw);
    let patient_id = record.id.clone()?;

    let scores = ScoreSet::for_record(&record);
    let validity = FieldValidity::classify(&record);
    let fever = record
        .temperature
        .as_ref()
        .and_then(numeric_value)
        .is_some_and(|temperature| temperature >= FEVER_THRESHOLD);

    Some(RecordAssessment {
        patient_id,
        scores,
        validity,
        fever,
    })
}

/// Three deduplicated, ascending id lists; the only artifact submitted upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlertReport {
    high_risk_patients: BTreeSet<String>,
    fever_patients: BTreeSet<String>,
    data_quality_issues: BTreeSet<String>,
}

/// List sizes for logging and CLI summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlertTotals {
    pub high_risk: usize,
    pub fever: usize,
    pub data_quality: usize,
}

impl AlertReport {
    pub fn high_risk_patients(&self) -> Vec<&str> {
        self.high_risk_patients.iter().map(String::as_str).collect()
    }

    pub fn fever_patients(&self) -> Vec<&str> {
        self.fever_patients.iter().map(String::as_str).collect()
    }

    pub fn data_quality_issues(&self) -> Vec<&str> {
        self.data_quality_issues.iter().map(String::as_str).collect()
    }

    pub fn totals(&self) -> AlertTotals {
        AlertTotals {
            high_risk: self.high_risk_patients.len(),
            fever: self.fever_patients.len(),
            data_quality: self.data_quality_issues.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.high_risk_patients.is_empty()
            && self.fever_patients.is_empty()
            && self.data_quality_issues.is_empty()
    }

    fn record(&mut self, assessment: &RecordAssessment) {
        if assessment.is_high_risk() {
            self.high_risk_patients
                .insert(assessment.patient_id.clone());
        }
        if assessment.fever {
            self.fever_patients.insert(assessment.patient_id.clone());
        }
        if assessment.validity.has_issue() {
            self.data_quality_issues
                .insert(assessment.patient_id.clone());
        }
    }
}

impl<'a> FromIterator<&'a RecordAssessment> for AlertReport {
    fn from_iter<I: IntoIterator<Item = &'a RecordAssessment>>(iter: I) -> Self {
        let mut report = AlertReport::default();
        for assessment in iter {
            report.record(assessment);
        }
        report
    }
}

pub fn assess_all(records: &[RawRecord]) -> Vec<RecordAssessment> {
    records
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| {
            let assessment = assess(raw);
            if assessment.is_none() {
                debug!(index, "skipping record without a patient id");
            }
            assessment
        })
        .collect()
}

pub fn build_report(records: &[RawRecord]) -> AlertReport {
    let assessments = assess_all(records);
    for assessment in &assessments {
        debug!(
            patient_id = %assessment.patient_id,
            total = assessment.scores.total,
            fever = assessment.fever,
            invalid = ?assessment.validity.invalid_fields(),
            "record triaged"
        );
    }

    let report: AlertReport = assessments.iter().collect();
    let totals = report.totals();
    info!(
        records = records.len(),
        attributed = assessments.len(),
        high_risk = totals.high_risk,
        fever = totals.fever,
        data_quality = totals.data_quality,
        "alert report built"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn raw(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            other => panic!("fixture must be an object, got {other}"),
        }
    }

    #[test]
    fn typical_record_is_not_flagged() {
        let assessment = assess(&raw(json!({
            "patient_id": "DEMO001",
            "blood_pressure": "120/80",
            "temperature": 98.6,
            "age": 45
        })))
        .expect("attributable");
        assert!(!assessment.validity.has_issue());
        assert!(!assessment.is_high_risk());
        assert!(!assessment.fever);
        assert_eq!(assessment.scores.temp_score, 0);
        assert_eq!(assessment.scores.age_score, 1);
    }

    #[test]
    fn bad_blood_pressure_is_a_quality_issue_scored_zero() {
        let assessment = assess(&raw(json!({
            "patient_id": "DEMO002",
            "blood_pressure": "bad",
            "temperature": 98.6,
            "age": 45
        })))
        .expect("attributable");
        assert_eq!(assessment.scores.bp_score, 0);
        assert!(assessment.validity.has_issue());
    }

    #[test]
    fn fever_ignores_other_invalid_fields() {
        let assessment = assess(&raw(json!({
            "patient_id": "DEMO003",
            "blood_pressure": "N/A",
            "temperature": "99.6",
            "age": null
        })))
        .expect("attributable");
        assert!(assessment.fever);
        assert!(assessment.validity.has_issue());
    }

    #[test]
    fn records_without_ids_are_dropped() {
        assert!(assess(&raw(json!({ "blood_pressure": "150/95" }))).is_none());
        let report = build_report(&[raw(json!({ "patient_id": "", "temperature": 104 }))]);
        assert!(report.is_empty());
    }

    #[test]
    fn lists_are_deduplicated_and_sorted() {
        let sick = |id: &str| {
            raw(json!({
                "patient_id": id,
                "blood_pressure": "160/100",
                "temperature": 102.1,
                "age": 80
            }))
        };
        let records = vec![sick("DEMO009"), sick("DEMO001"), sick("DEMO009"), sick("DEMO004")];
        let report = build_report(&records);
        assert_eq!(
            report.high_risk_patients(),
            vec!["DEMO001", "DEMO004", "DEMO009"]
        );
        assert_eq!(report.fever_patients(), report.high_risk_patients());
        assert!(report.data_quality_issues().is_empty());
    }

    #[test]
    fn serializes_exactly_three_keys() {
        let report = build_report(&[raw(json!({
            "patient_id": "DEMO005",
            "blood_pressure": "INVALID",
            "temperature": 101.0,
            "age": 70
        }))]);
        let value = serde_json::to_value(&report).expect("serializes");
        assert_eq!(
            value,
            json!({
                "high_risk_patients": ["DEMO005"],
                "fever_patients": ["DEMO005"],
                "data_quality_issues": ["DEMO005"]
            })
        );
    }
}
