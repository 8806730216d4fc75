pub mod intake;
pub mod submission;
pub mod triage;
