use crate::config::TelemetryConfig;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// HTTP client crates log every connection at debug; keep them at warn unless asked for.
const QUIET_TRANSPORT: [&str; 2] = ["hyper", "reqwest"];

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{value}'")]
    Filter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("log subscriber already installed or unusable: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
///
/// Output goes to stderr so the report printed on stdout stays machine readable.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => configured_filter(&config.log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

fn configured_filter(level: &str) -> Result<EnvFilter, TelemetryError> {
    let directives = directives_for(level);
    EnvFilter::try_new(&directives).map_err(|source| TelemetryError::Filter {
        value: level.to_string(),
        source,
    })
}

/// Appends `<crate>=warn` for transport crates the level does not already mention.
fn directives_for(level: &str) -> String {
    let level = level.trim();
    let mut directives = vec![level.to_string()];
    directives.extend(
        QUIET_TRANSPORT
            .iter()
            .copied()
            .filter(|target| !level.contains(target))
            .map(|target| format!("{target}=warn")),
    );
    directives.join(",")
}
