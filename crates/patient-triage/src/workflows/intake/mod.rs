//! Paginated patient intake from the clinical API.
//!
//! Pages are requested strictly one after another. Rate limiting and server
//! errors are retried with bounded backoff; anything unrecoverable ends the
//! harvest early and the records gathered so far are returned.

mod gateway;
mod retry;

pub use gateway::{
    GatewayError, GatewayResponse, HttpPatientGateway, PatientGateway, API_KEY_HEADER,
};
pub use retry::RetryPolicy;

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::config::IntakeConfig;

/// A patient record exactly as the API delivered it.
pub type RawRecord = Map<String, Value>;

pub const PATIENTS_PATH: &str = "/patients";

#[derive(Debug, Default, Deserialize)]
struct PatientPage {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Debug, Default, Deserialize)]
struct Pagination {
    #[serde(default, rename = "hasNext")]
    has_next: Option<bool>,
}

/// Why a harvest stopped requesting pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    EmptyPage { page: u32 },
    NoMorePages { page: u32 },
    PageCap { max_pages: u32 },
    RetriesExhausted { page: u32, last_status: Option<u16> },
    Rejected { page: u32, status: u16 },
    MalformedPage { page: u32 },
}

impl StopReason {
    /// True when the upstream signalled the end of data rather than failing.
    pub fn is_clean(&self) -> bool {
        matches!(
            self,
            StopReason::EmptyPage { .. }
                | StopReason::NoMorePages { .. }
                | StopReason::PageCap { .. }
        )
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::EmptyPage { page } => write!(f, "page {page} returned no records"),
            StopReason::NoMorePages { page } => write!(f, "page {page} reported no further pages"),
            StopReason::PageCap { max_pages } => write!(f, "reached the {max_pages} page cap"),
            StopReason::RetriesExhausted {
                page,
                last_status: Some(status),
            } => write!(f, "page {page} still failing with status {status} after retries"),
            StopReason::RetriesExhausted {
                page,
                last_status: None,
            } => write!(f, "page {page} unreachable after retries"),
            StopReason::Rejected { page, status } => {
                write!(f, "page {page} rejected with status {status}")
            }
            StopReason::MalformedPage { page } => {
                write!(f, "page {page} body was not a page payload")
            }
        }
    }
}

/// Records gathered by a harvest plus how it ended.
#[derive(Debug, Clone, PartialEq)]
pub struct Harvest {
    pub records: Vec<RawRecord>,
    pub pages_fetched: u32,
    pub stop: StopReason,
}

enum PageOutcome {
    Loaded {
        records: Vec<RawRecord>,
        /// The upstream `data` array was absent or had no entries at all.
        exhausted: bool,
        has_next: Option<bool>,
    },
    Stopped(StopReason),
}

type Sleeper = Box<dyn Fn(Duration) + Send + Sync>;

/// Walks `/patients?page=N&limit=L` until the upstream runs dry or fails.
pub struct PaginatedFetcher<'a, G: PatientGateway + ?Sized> {
    gateway: &'a G,
    page_size: u32,
    max_pages: u32,
    retry: RetryPolicy,
    sleeper: Sleeper,
}

impl<'a, G: PatientGateway + ?Sized> PaginatedFetcher<'a, G> {
    pub fn new(gateway: &'a G, config: &IntakeConfig) -> Self {
        Self {
            gateway,
            page_size: config.page_size.max(1),
            max_pages: config.max_pages,
            retry: config.retry_policy(),
            sleeper: Box::new(std::thread::sleep),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replaces the blocking sleep between retries.
    pub fn with_sleeper<F>(mut self, sleeper: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.sleeper = Box::new(sleeper);
        self
    }

    /// All records the upstream would give us. Never fails; see [`Self::harvest`].
    pub fn fetch_all(&self) -> Vec<RawRecord> {
        self.harvest().records
    }

    pub fn harvest(&self) -> Harvest {
        let mut records = Vec::new();
        let mut pages_fetched = 0;
        debug!(
            page_size = self.page_size,
            max_pages = self.max_pages,
            max_attempts = self.retry.max_attempts(),
            worst_case_wait_ms = self.retry.worst_case_wait().as_millis() as u64,
            "starting patient harvest"
        );

        for page in 1..=self.max_pages {
            match self.fetch_page(page) {
                PageOutcome::Loaded {
                    records: page_records,
                    exhausted,
                    has_next,
                } => {
                    if exhausted {
                        return self.finish(records, pages_fetched, StopReason::EmptyPage { page });
                    }

                    pages_fetched += 1;
                    debug!(page, count = page_records.len(), "page loaded");
                    records.extend(page_records);

                    if has_next == Some(false) {
                        return self.finish(
                            records,
                            pages_fetched,
                            StopReason::NoMorePages { page },
                        );
                    }
                }
                PageOutcome::Stopped(reason) => {
                    return self.finish(records, pages_fetched, reason);
                }
            }
        }

        let stop = StopReason::PageCap {
            max_pages: self.max_pages,
        };
        self.finish(records, pages_fetched, stop)
    }

    fn finish(&self, records: Vec<RawRecord>, pages_fetched: u32, stop: StopReason) -> Harvest {
        if stop.is_clean() {
            info!(pages_fetched, records = records.len(), %stop, "patient intake complete");
        } else {
            warn!(
                pages_fetched,
                records = records.len(),
                %stop,
                "patient intake ended early; continuing with partial data"
            );
        }

        Harvest {
            records,
            pages_fetched,
            stop,
        }
    }

    fn fetch_page(&self, page: u32) -> PageOutcome {
        let path = format!("{PATIENTS_PATH}?page={page}&limit={}", self.page_size);
        let mut last_status = None;

        for attempt in 0..self.retry.max_attempts() {
            debug!(page, attempt, "requesting patient page");

            match self.gateway.get(&path) {
                Ok(response) if response.is_success() => return parse_page(page, response.body),
                Ok(response) if response.is_transient() => {
                    last_status = Some(response.status);
                    self.back_off(page, attempt, &format!("status {}", response.status));
                }
                Ok(response) => {
                    error!(page, status = response.status, "patient page request rejected");
                    return PageOutcome::Stopped(StopReason::Rejected {
                        page,
                        status: response.status,
                    });
                }
                Err(err) => {
                    last_status = None;
                    self.back_off(page, attempt, &err.to_string());
                }
            }
        }

        PageOutcome::Stopped(StopReason::RetriesExhausted { page, last_status })
    }

    fn back_off(&self, page: u32, attempt: u32, cause: &str) {
        if attempt >= self.retry.retry_limit {
            return;
        }
        let wait = self.retry.delay_for(attempt);
        warn!(
            page,
            attempt,
            wait_ms = wait.as_millis() as u64,
            cause,
            "transient failure, retrying"
        );
        (self.sleeper)(wait);
    }
}

fn parse_page(page: u32, body: Value) -> PageOutcome {
    let parsed: PatientPage = match serde_json::from_value(body) {
        Ok(parsed) => parsed,
        Err(err) => {
            error!(page, %err, "patient page body could not be decoded");
            return PageOutcome::Stopped(StopReason::MalformedPage { page });
        }
    };

    let items = match parsed.data {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => Vec::new(),
        Some(_) => {
            error!(page, "patient page data is not an array");
            return PageOutcome::Stopped(StopReason::MalformedPage { page });
        }
    };

    let exhausted = items.is_empty();
    let records = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(record) => Some(record),
            other => {
                debug!(page, item = %other, "skipping non-object patient entry");
                None
            }
        })
        .collect();

    PageOutcome::Loaded {
        records,
        exhausted,
        has_next: parsed.pagination.and_then(|pagination| pagination.has_next),
    }
}

/// Pulls records out of a page payload or a bare array, as saved from the API.
pub fn records_from_value(value: Value) -> Vec<RawRecord> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut payload) => match payload.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(record) => Some(record),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_page_reads_records_and_has_next() {
        let body = json!({
            "data": [{ "patient_id": "DEMO001" }, "noise", { "patient_id": "DEMO002" }],
            "pagination": { "hasNext": false }
        });
        match parse_page(1, body) {
            PageOutcome::Loaded {
                records,
                exhausted,
                has_next,
            } => {
                assert_eq!(records.len(), 2);
                assert!(!exhausted);
                assert_eq!(has_next, Some(false));
            }
            PageOutcome::Stopped(reason) => panic!("unexpected stop: {reason}"),
        }
    }

    #[test]
    fn parse_page_treats_missing_data_as_empty() {
        match parse_page(3, json!({ "pagination": { "hasNext": true } })) {
            PageOutcome::Loaded {
                records, exhausted, ..
            } => {
                assert!(records.is_empty());
                assert!(exhausted);
            }
            PageOutcome::Stopped(reason) => panic!("unexpected stop: {reason}"),
        }
    }

    #[test]
    fn parse_page_flags_non_object_bodies() {
        assert!(matches!(
            parse_page(2, json!("upstream hiccup")),
            PageOutcome::Stopped(StopReason::MalformedPage { page: 2 })
        ));
        assert!(matches!(
            parse_page(2, json!({ "data": "oops" })),
            PageOutcome::Stopped(StopReason::MalformedPage { page: 2 })
        ));
    }

    #[test]
    fn records_from_value_accepts_page_or_array() {
        let page = json!({ "data": [{ "patient_id": "A" }] });
        let bare = json!([{ "patient_id": "A" }, 7]);
        assert_eq!(records_from_value(page).len(), 1);
        assert_eq!(records_from_value(bare).len(), 1);
        assert!(records_from_value(json!(null)).is_empty());
    }
}
