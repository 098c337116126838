use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// # Summary
/// Externally visible connectivity mode.
///
/// # Invariants
/// - Exactly one value at any time, owned by the connectivity manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ConnectivityState {
    Disconnected,
    Connecting,
    Connected,
    AccessPointOnly,
    AccessPointPlusStation,
}

impl std::fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ConnectivityState::Disconnected => "disconnected",
            ConnectivityState::Connecting => "connecting",
            ConnectivityState::Connected => "connected",
            ConnectivityState::AccessPointOnly => "ap-only",
            ConnectivityState::AccessPointPlusStation => "ap+sta",
        };
        f.write_str(label)
    }
}

/// Station-side link as reported by the radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationStatus {
    /// Joined a network; signal strength when the radio knows it.
    Associated { signal_dbm: Option<i32> },
    /// Not joined (idle, still trying, or failed).
    Down,
}

impl StationStatus {
    pub fn is_up(&self) -> bool {
        matches!(self, StationStatus::Associated { .. })
    }
}

/// # Summary
/// Transition notifications published by the connectivity manager.
///
/// # Invariants
/// - Emitted at most once per actual transition, never for no-op ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// An association attempt started on the named profile.
    AttemptStarted { ssid: String },
    /// The station joined a network.
    Associated { ssid: String, at: DateTime<Utc> },
    /// The attempt ran out of time.
    AttemptTimedOut { fallback_to_ap: bool },
    /// The station link dropped after having been up.
    StationLost { at: DateTime<Utc>, lost_count: u64 },
    /// The station link came back while the access point kept serving.
    StationRestored { at: DateTime<Utc> },
    /// The local access point was started as the only channel.
    AccessPointStarted,
}
