use serde::Serialize;
use serde_json::Value;

use super::normalizer::NormalizedRecord;
use super::validity::is_sentinel;

pub const FEVER_LOW_GRADE: f64 = 99.6;
pub const FEVER_HIGH: f64 = 101.0;
pub const AGE_MIDDLE: f64 = 40.0;
pub const AGE_SENIOR: f64 = 65.0;

/// Systolic over diastolic, both strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BloodPressure {
    pub systolic: u32,
    pub diastolic: u32,
}

impl BloodPressure {
    /// Accepts `<digits>/<digits>`, ignoring any non-digit noise on either side
    /// of the slash (`"120 mmHg/80"`). Zero readings do not parse.
    pub fn parse(raw: &str) -> Option<Self> {
        let (systolic, diastolic) = raw.split_once('/')?;
        if diastolic.contains('/') {
            return None;
        }

        let systolic = digits_only(systolic)?;
        let diastolic = digits_only(diastolic)?;
        if systolic == 0 || diastolic == 0 {
            return None;
        }

        Some(Self {
            systolic,
            diastolic,
        })
    }

    pub fn stage(&self) -> BloodPressureStage {
        let Self {
            systolic,
            diastolic,
        } = *self;

        if systolic >= 140 || diastolic >= 90 {
            BloodPressureStage::Stage2
        } else if (130..=139).contains(&systolic) || (80..=89).contains(&diastolic) {
            BloodPressureStage::Stage1
        } else if (120..=129).contains(&systolic) && diastolic < 80 {
            BloodPressureStage::Elevated
        } else if systolic < 120 && diastolic < 80 {
            BloodPressureStage::Normal
        } else {
            BloodPressureStage::Unclassified
        }
    }
}

fn digits_only(part: &str) -> Option<u32> {
    let digits: String = part.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BloodPressureStage {
    Normal,
    Elevated,
    Stage1,
    Stage2,
    Unclassified,
}

impl BloodPressureStage {
    pub fn points(self) -> u8 {
        match self {
            BloodPressureStage::Stage2 => 3,
            BloodPressureStage::Stage1 => 2,
            BloodPressureStage::Elevated => 1,
            BloodPressureStage::Normal | BloodPressureStage::Unclassified => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BloodPressureStage::Normal => "Normal",
            BloodPressureStage::Elevated => "Elevated",
            BloodPressureStage::Stage1 => "Stage 1",
            BloodPressureStage::Stage2 => "Stage 2",
            BloodPressureStage::Unclassified => "Unclassified",
        }
    }
}

/// Finite number from a JSON number or numeric text; sentinels and junk give `None`.
pub fn numeric_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) if !is_sentinel(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

pub fn score_blood_pressure(reading: Option<BloodPressure>) -> u8 {
    reading.map_or(0, |bp| bp.stage().points())
}

pub fn score_temperature(value: &Value) -> u8 {
    numeric_value(value).map_or(0, temperature_points)
}

pub fn score_age(value: &Value) -> u8 {
    numeric_value(value).map_or(0, age_points)
}

/// `>= 101.0` scores 2, `>= 99.6` scores 1, anything lower 0.
pub fn temperature_points(temperature: f64) -> u8 {
    if temperature >= FEVER_HIGH {
        2
    } else if temperature >= FEVER_LOW_GRADE {
        1
    } else {
        0
    }
}

/// Over 65 scores 2; 40 through 65 inclusive scores 1.
pub fn age_points(age: f64) -> u8 {
    if age > AGE_SENIOR {
        2
    } else if age >= AGE_MIDDLE {
        1
    } else {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ScoreSet {
    pub bp_score: u8,
    pub temp_score: u8,
    pub age_score: u8,
    pub total: u8,
}

impl ScoreSet {
    pub fn new(bp_score: u8, temp_score: u8, age_score: u8) -> Self {
        Self {
            bp_score,
            temp_score,
            age_score,
            total: bp_score + temp_score + age_score,
        }
    }

    pub fn for_record(record: &NormalizedRecord) -> Self {
        let bp_score = score_blood_pressure(
            record
                .blood_pressure
                .as_deref()
                .and_then(BloodPressure::parse),
        );
        let temp_score = record.temperature.as_ref().map_or(0, score_temperature);
        let age_score = record.age.as_ref().map_or(0, score_age);

        Self::new(bp_score, temp_score, age_score)
    }
}
