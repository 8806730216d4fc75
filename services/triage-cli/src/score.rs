use clap::Args;
use patient_triage::error::AppError;
use patient_triage::workflows::triage::{BloodPressure, FieldValidity, NormalizedRecord, ScoreSet};
use serde_json::Value;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Blood pressure as systolic/diastolic, e.g. 135/85
    #[arg(long)]
    pub(crate) bp: Option<String>,
    /// Body temperature in Fahrenheit
    #[arg(long)]
    pub(crate) temp: Option<String>,
    /// Age in years
    #[arg(long)]
    pub(crate) age: Option<String>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let record = NormalizedRecord {
        id: None,
        blood_pressure: args.bp,
        temperature: args.temp.map(Value::String),
        age: args.age.map(Value::String),
    };

    let scores = ScoreSet::for_record(&record);
    let validity = FieldValidity::classify(&record);
    let stage = record
        .blood_pressure
        .as_deref()
        .and_then(BloodPressure::parse)
        .map(|reading| reading.stage().label())
        .unwrap_or("unreadable");

    println!("Blood pressure: {} ({stage})", scores.bp_score);
    println!("Temperature:    {}", scores.temp_score);
    println!("Age:            {}", scores.age_score);
    println!("Total:          {}", scores.total);

    let invalid = validity.invalid_fields();
    if invalid.is_empty() {
        println!("Data quality:   ok");
    } else {
        println!("Data quality:   invalid {}", invalid.join(", "));
    }

    Ok(())
}
