use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use patient_triage::config::{ApiConfig, AppConfig};
use patient_triage::error::AppError;
use patient_triage::telemetry;
use patient_triage::workflows::intake::{records_from_value, HttpPatientGateway, RawRecord};
use patient_triage::{build_report, AlertReport, PaginatedFetcher, Submitter};
use tracing::{error, info};

#[derive(Args, Debug, Default)]
pub(crate) struct AssessArgs {
    /// Submit the alert lists to the assessment endpoint
    #[arg(long)]
    pub(crate) submit: bool,
    /// Read patient records from a saved JSON payload instead of the API
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
    /// Also write the report JSON to this file
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Override the configured page size
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub(crate) page_size: Option<u32>,
    /// Override the configured page cap
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub(crate) max_pages: Option<u32>,
    /// Override the configured retries per page
    #[arg(long)]
    pub(crate) retry_limit: Option<u32>,
}

pub(crate) fn run_assessment(mut args: AssessArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(page_size) = args.page_size.take() {
        config.intake.page_size = page_size;
    }
    if let Some(max_pages) = args.max_pages.take() {
        config.intake.max_pages = max_pages;
    }
    if let Some(retry_limit) = args.retry_limit.take() {
        config.intake.retry_limit = retry_limit;
    }
    config.intake.validate()?;

    telemetry::init(&config.telemetry)?;
    info!(?config.environment, base_url = %config.api.base_url, "starting patient triage");

    let gateway = if args.input.is_none() || args.submit {
        Some(connect(&config.api)?)
    } else {
        None
    };

    let records = match (&args.input, &gateway) {
        (Some(path), _) => load_records(path)?,
        (None, Some(gateway)) => PaginatedFetcher::new(gateway, &config.intake).fetch_all(),
        (None, None) => Vec::new(),
    };

    let report = build_report(&records);
    render_report(&report)?;

    if let Some(path) = &args.output {
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
        info!(path = %path.display(), "report written");
    }

    match (&gateway, args.submit) {
        (Some(gateway), true) => {
            info!("submitting results");
            match Submitter::new(gateway).submit(&report) {
                Ok(receipt) => {
                    info!(status = receipt.status, response = %receipt.body, "submission response")
                }
                Err(err) => error!(%err, "submission failed; the report above is still valid"),
            }
        }
        _ => info!("submission skipped; pass --submit to send the report"),
    }

    Ok(())
}

fn connect(api: &ApiConfig) -> Result<HttpPatientGateway, AppError> {
    let key = api.require_key()?;
    Ok(HttpPatientGateway::new(
        &api.base_url,
        key,
        api.request_timeout,
    )?)
}

fn load_records(path: &Path) -> Result<Vec<RawRecord>, AppError> {
    let contents = fs::read_to_string(path)?;
    let payload: serde_json::Value = serde_json::from_str(&contents)?;
    let records = records_from_value(payload);
    info!(path = %path.display(), records = records.len(), "loaded saved patient payload");
    Ok(records)
}

fn render_report(report: &AlertReport) -> Result<(), AppError> {
    info!("high_risk_patients: {:?}", report.high_risk_patients());
    info!("fever_patients: {:?}", report.fever_patients());
    info!("data_quality_issues: {:?}", report.data_quality_issues());

    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
