pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;

pub use workflows::intake::{Harvest, PaginatedFetcher, RawRecord, StopReason};
pub use workflows::submission::{SubmissionError, SubmissionReceipt, Submitter};
pub use workflows::triage::{build_report, AlertReport};
