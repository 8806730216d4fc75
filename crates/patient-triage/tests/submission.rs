mod support;

use patient_triage::workflows::intake::records_from_value;
use patient_triage::workflows::submission::{SubmissionError, Submitter, SUBMISSION_PATH};
use patient_triage::workflows::triage::build_report;
use serde_json::json;
use support::{patient, ScriptedGateway};

fn report() -> patient_triage::AlertReport {
    build_report(&records_from_value(json!([
        patient("DEMO002", "150/95", json!(101.2), json!(70)),
        patient("DEMO001", "bad", json!(98.6), json!(45))
    ])))
}

#[test]
fn posts_the_three_lists_and_echoes_the_response() {
    let gateway = ScriptedGateway::new().respond(200, json!({ "success": true, "score": 91 }));

    let receipt = Submitter::new(&gateway)
        .submit(&report())
        .expect("submission accepted");

    assert_eq!(receipt.status, 200);
    assert_eq!(receipt.body["score"], json!(91));
    assert_eq!(gateway.requests(), vec![SUBMISSION_PATH.to_string()]);
    assert_eq!(
        gateway.posted(),
        vec![json!({
            "high_risk_patients": ["DEMO002"],
            "fever_patients": ["DEMO002"],
            "data_quality_issues": ["DEMO001"]
        })]
    );
}

#[test]
fn non_success_status_is_a_rejection_value() {
    let gateway = ScriptedGateway::new().respond(401, json!({ "error": "invalid api key" }));

    let error = Submitter::new(&gateway)
        .submit(&report())
        .expect_err("rejected");

    match error {
        SubmissionError::Rejected { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body["error"], json!("invalid api key"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn transport_failure_is_returned_not_raised() {
    let gateway = ScriptedGateway::new().fail("dns lookup failed");

    let error = Submitter::new(&gateway)
        .submit(&report())
        .expect_err("transport failure");

    assert!(matches!(error, SubmissionError::Transport(_)));
    assert!(error.to_string().contains("dns lookup failed"));
}
