use chrono::{DateTime, Utc};
use folio_core::alert::entity::AlertEvent;
use folio_core::link::entity::ConnectivityState;
use folio_core::portfolio::entity::PortfolioSummary;
use serde::Serialize;
use utoipa::ToSchema;

use crate::stats::FetchStats;

/// Journal entries included per mode.
pub const RECENT_ALERTS: usize = 10;

/// Per-mode part of the status report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct ModeReport {
    pub positions: usize,
    /// Positions the provider sent beyond capacity.
    pub truncated: usize,
    pub alerted: usize,
    pub summary: PortfolioSummary,
    pub last_refresh: Option<DateTime<Utc>>,
}

/// # Summary
/// Read-only view of the monitor, published after every tick and command.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StatusReport {
    pub connectivity: ConnectivityState,
    pub online: bool,
    pub ap_active: bool,
    pub lost_connection_count: u64,
    pub last_loss_at: Option<DateTime<Utc>>,
    pub volume: u8,
    pub entry: ModeReport,
    pub exit: ModeReport,
    pub fetch: FetchStats,
    pub active_alert: Option<AlertEvent>,
    pub pending_alerts: usize,
    /// Newest first, entry mode then exit mode.
    pub recent_alerts: Vec<AlertEvent>,
    pub uptime_secs: i64,
    pub generated_at: DateTime<Utc>,
}

impl StatusReport {
    /// Placeholder published before the loop's first tick.
    pub fn starting(now: DateTime<Utc>) -> Self {
        Self {
            connectivity: ConnectivityState::Disconnected,
            online: false,
            ap_active: false,
            lost_connection_count: 0,
            last_loss_at: None,
            volume: 0,
            entry: ModeReport::default(),
            exit: ModeReport::default(),
            fetch: FetchStats::default(),
            active_alert: None,
            pending_alerts: 0,
            recent_alerts: Vec::new(),
            uptime_secs: 0,
            generated_at: now,
        }
    }
}
