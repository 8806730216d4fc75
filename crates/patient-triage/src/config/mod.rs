use std::env;
use std::fmt;
use std::time::Duration;

use crate::workflows::intake::RetryPolicy;

pub const DEFAULT_BASE_URL: &str = "https://assessment.ksensetech.com/api";

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub api: ApiConfig,
    pub intake: IntakeConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let base_url = env::var("TRIAGE_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();
        let api_key = non_blank_var("TRIAGE_API_KEY").or_else(|| non_blank_var("API_KEY"));
        let request_timeout = Duration::from_secs(number_var("TRIAGE_REQUEST_TIMEOUT_SECS", 30)?);

        let page_size = number_var("TRIAGE_PAGE_SIZE", 5)?;
        let max_pages = number_var("TRIAGE_MAX_PAGES", 20)?;
        let retry_limit = number_var("TRIAGE_RETRY_LIMIT", 3)?;
        let retry_delay = Duration::from_millis(number_var("TRIAGE_RETRY_DELAY_MS", 1_000)?);
        let max_backoff = Duration::from_millis(number_var("TRIAGE_MAX_BACKOFF_MS", 30_000)?);

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let intake = IntakeConfig {
            page_size,
            max_pages,
            retry_limit,
            retry_delay,
            max_backoff,
        };
        intake.validate()?;

        Ok(Self {
            environment,
            api: ApiConfig {
                base_url,
                api_key,
                request_timeout,
            },
            intake,
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn non_blank_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn number_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
        _ => Ok(default),
    }
}

/// Connection settings for the upstream clinical API.
#[derive(Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub request_timeout: Duration,
}

impl ApiConfig {
    pub fn require_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Pagination and retry controls for patient intake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeConfig {
    pub page_size: u32,
    pub max_pages: u32,
    pub retry_limit: u32,
    pub retry_delay: Duration,
    pub max_backoff: Duration,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            page_size: 5,
            max_pages: 20,
            retry_limit: 3,
            retry_delay: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl IntakeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::OutOfRange {
                key: "TRIAGE_PAGE_SIZE",
            });
        }
        if self.max_pages == 0 {
            return Err(ConfigError::OutOfRange {
                key: "TRIAGE_MAX_PAGES",
            });
        }
        if self.max_backoff < self.retry_delay {
            return Err(ConfigError::OutOfRange {
                key: "TRIAGE_MAX_BACKOFF_MS",
            });
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_limit, self.retry_delay, self.max_backoff)
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { key: &'static str },
    OutOfRange { key: &'static str },
    MissingApiKey,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { key } => write!(f, "{key} must be a non-negative integer"),
            ConfigError::OutOfRange { key } => write!(f, "{key} is outside the accepted range"),
            ConfigError::MissingApiKey => {
                write!(f, "TRIAGE_API_KEY (or API_KEY) must be set to reach the patient API")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
