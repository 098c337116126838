//! Process setup: layered configuration and the tracing subscriber.

use std::path::Path;

use folio_core::config::{AppConfig, LogConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment prefix; `FOLIO__SERVER__PORT=9000` sets `server.port`.
const ENV_PREFIX: &str = "FOLIO";
const ENV_SEPARATOR: &str = "__";
const DEFAULT_FILTER: &str = "info,tower_http=warn";

/// # Summary
/// Loads `AppConfig` from an optional file plus environment overrides.
///
/// # Logic
/// 1. Defaults from `AppConfig::default()`.
/// 2. `path`, if it exists (format picked from the extension).
/// 3. `FOLIO__*` variables; lists are comma separated.
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::from(path.as_ref()).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .list_separator(",")
                .with_list_parse_key("radio.visible_networks")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

/// # Summary
/// Installs the global subscriber: console output plus a daily rolling file.
///
/// # Returns
/// The file writer guard; dropping it flushes and stops file logging, so the
/// caller keeps it for the life of the process.
pub fn init_tracing(log: &LogConfig) -> anyhow::Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&log.dir, &log.file_prefix);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .try_init()?;
    Ok(guard)
}
