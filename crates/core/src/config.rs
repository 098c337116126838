use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Process-level configuration, loaded by the binary from `folio.toml`
/// and `FOLIO__` environment overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub log: LogConfig,
    pub radio: RadioConfig,
    pub monitor: Timings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub dir: String,
    pub file_prefix: String,
}

/// Host radio behaviour.
///
/// # Invariants
/// - An empty `visible_networks` means every profile is reachable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioConfig {
    pub visible_networks: Vec<String>,
    /// Signal strength reported for a joined network.
    pub signal_dbm: Option<i32>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: "logs".to_string(),
            file_prefix: "folio.log".to_string(),
        }
    }
}

/// # Summary
/// Fixed intervals and timeouts used by the monitor loop and its components.
///
/// # Invariants
/// - All values are in milliseconds and strictly positive.
/// - `association_timeout_ms` is the budget for a single `Connecting` phase;
///   it is only observed at link check boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub link_check_ms: u64,
    pub association_timeout_ms: u64,
    pub refresh_interval_ms: u64,
    pub fetch_timeout_ms: u64,
    pub alert_display_ms: u64,
    pub indicator_hold_ms: u64,
    pub blink_ms: u64,
    pub dashboard_redraw_ms: u64,
    pub loop_cadence_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            link_check_ms: 10_000,
            association_timeout_ms: 20_000,
            refresh_interval_ms: 15_000,
            fetch_timeout_ms: 10_000,
            alert_display_ms: 8_000,
            indicator_hold_ms: 30_000,
            blink_ms: 500,
            dashboard_redraw_ms: 2_000,
            loop_cadence_ms: 100,
        }
    }
}

impl Timings {
    pub fn link_check(&self) -> TimeDelta {
        millis(self.link_check_ms)
    }

    pub fn association_timeout(&self) -> TimeDelta {
        millis(self.association_timeout_ms)
    }

    pub fn refresh_interval(&self) -> TimeDelta {
        millis(self.refresh_interval_ms)
    }

    pub fn alert_display(&self) -> TimeDelta {
        millis(self.alert_display_ms)
    }

    pub fn indicator_hold(&self) -> TimeDelta {
        millis(self.indicator_hold_ms)
    }

    pub fn blink(&self) -> TimeDelta {
        millis(self.blink_ms)
    }

    pub fn dashboard_redraw(&self) -> TimeDelta {
        millis(self.dashboard_redraw_ms)
    }
}

/// Converts a millisecond count into a `TimeDelta`, saturating at `i64::MAX`.
pub fn millis(ms: u64) -> TimeDelta {
    TimeDelta::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX))
}
