use std::fmt::Debug;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::Value;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Status code and decoded body of an upstream response.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    pub status: u16,
    pub body: Value,
}

impl GatewayResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Rate limiting and server-side failures are worth another attempt.
    pub fn is_transient(&self) -> bool {
        self.status == 429 || (500..600).contains(&self.status)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("http client could not be built: {0}")]
    Client(String),
    #[error("invalid api key header: {0}")]
    InvalidKey(String),
}

/// Blocking access to the clinical API. Paths are relative to the configured base URL.
pub trait PatientGateway: Debug {
    fn get(&self, path: &str) -> Result<GatewayResponse, GatewayError>;
    fn post(&self, path: &str, body: &Value) -> Result<GatewayResponse, GatewayError>;
}

/// `reqwest` backed gateway carrying the api key header on every request.
pub struct HttpPatientGateway {
    client: Client,
    base_url: String,
}

impl HttpPatientGateway {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|err| GatewayError::InvalidKey(err.to_string()))?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| GatewayError::Client(err.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn send(&self, url: String, request: RequestBuilder) -> Result<GatewayResponse, GatewayError> {
        let response = request.send().map_err(|err| GatewayError::Transport {
            url: url.clone(),
            message: err.to_string(),
        })?;

        let status = response.status().as_u16();
        let text = response.text().map_err(|err| GatewayError::Transport {
            url,
            message: err.to_string(),
        })?;

        Ok(GatewayResponse::new(status, decode_body(&text)))
    }
}

impl Debug for HttpPatientGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPatientGateway")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl PatientGateway for HttpPatientGateway {
    fn get(&self, path: &str) -> Result<GatewayResponse, GatewayError> {
        let url = self.url(path);
        let request = self.client.get(&url);
        self.send(url, request)
    }

    fn post(&self, path: &str, body: &Value) -> Result<GatewayResponse, GatewayError> {
        let url = self.url(path);
        let request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        self.send(url, request)
    }
}

fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
