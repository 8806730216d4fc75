use std::collections::VecDeque;
use std::sync::Mutex;

use patient_triage::workflows::intake::{GatewayError, GatewayResponse, PatientGateway};
use serde_json::{json, Value};

/// Replays canned responses in order and records every request it sees.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    responses: Mutex<VecDeque<Result<GatewayResponse, GatewayError>>>,
    requests: Mutex<Vec<String>>,
    posted: Mutex<Vec<Value>>,
}

#[allow(dead_code)]
impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: Value) -> Self {
        self.push(Ok(GatewayResponse::new(status, body)));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.push(Err(GatewayError::Transport {
            url: "scripted".to_string(),
            message: message.to_string(),
        }));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests mutex").clone()
    }

    pub fn posted(&self) -> Vec<Value> {
        self.posted.lock().expect("posted mutex").clone()
    }

    fn push(&self, response: Result<GatewayResponse, GatewayError>) {
        self.responses
            .lock()
            .expect("responses mutex")
            .push_back(response);
    }

    fn next(&self, path: &str) -> Result<GatewayResponse, GatewayError> {
        self.requests
            .lock()
            .expect("requests mutex")
            .push(path.to_string());
        self.responses
            .lock()
            .expect("responses mutex")
            .pop_front()
            .unwrap_or_else(|| Ok(GatewayResponse::new(200, json!({ "data": [] }))))
    }
}

impl PatientGateway for ScriptedGateway {
    fn get(&self, path: &str) -> Result<GatewayResponse, GatewayError> {
        self.next(path)
    }

    fn post(&self, path: &str, body: &Value) -> Result<GatewayResponse, GatewayError> {
        self.posted.lock().expect("posted mutex").push(body.clone());
        self.next(path)
    }
}

#[allow(dead_code)]
pub fn patient(id: &str, bp: &str, temperature: Value, age: Value) -> Value {
    json!({
        "patient_id": id,
        "blood_pressure": bp,
        "temperature": temperature,
        "age": age
    })
}

#[allow(dead_code)]
pub fn page(records: Vec<Value>, has_next: bool) -> Value {
    json!({
        "data": records,
        "pagination": { "hasNext": has_next }
    })
}
