use serde_json::Value;
use tracing::{error, info};

use crate::workflows::intake::{GatewayError, PatientGateway};
use crate::workflows::triage::AlertReport;

pub const SUBMISSION_PATH: &str = "/submit-assessment";

/// What the upstream said about an accepted report. The body is opaque.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub status: u16,
    pub body: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("report could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Transport(#[from] GatewayError),
    #[error("submission rejected with status {status}: {body}")]
    Rejected { status: u16, body: Value },
}

/// Posts the alert report back to the clinical API.
#[derive(Debug)]
pub struct Submitter<'a, G: PatientGateway + ?Sized> {
    gateway: &'a G,
}

impl<'a, G: PatientGateway + ?Sized> Submitter<'a, G> {
    pub fn new(gateway: &'a G) -> Self {
        Self { gateway }
    }

    /// Failures come back as values; the computed report stays valid either way.
    pub fn submit(&self, report: &AlertReport) -> Result<SubmissionReceipt, SubmissionError> {
        let body = serde_json::to_value(report)?;

        let response = self.gateway.post(SUBMISSION_PATH, &body).map_err(|err| {
            error!(%err, "assessment submission failed to send");
            SubmissionError::from(err)
        })?;

        if !response.is_success() {
            error!(
                status = response.status,
                body = %response.body,
                "assessment submission rejected"
            );
            return Err(SubmissionError::Rejected {
                status: response.status,
                body: response.body,
            });
        }

        info!(status = response.status, body = %response.body, "assessment submitted");
        Ok(SubmissionReceipt {
            status: response.status,
            body: response.body,
        })
    }
}
