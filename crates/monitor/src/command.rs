use folio_core::settings::entity::NetworkProfile;
use serde::Serialize;
use utoipa::ToSchema;

/// # Summary
/// External requests applied by the loop between ticks.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Fetch both portfolios on the next tick.
    Refresh,
    /// Clear every alert latch, the alert slot and the indicators.
    ResetAlerts,
    /// Flip the access-point fallback and re-run link evaluation.
    ToggleAccessPoint,
    SetVolume(u8),
    SetBrightness(u8),
    AddNetwork(NetworkProfile),
    RemoveNetwork(String),
    /// Play every motif once.
    SelfTest,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Refresh => "refresh",
            Command::ResetAlerts => "reset-alerts",
            Command::ToggleAccessPoint => "toggle-access-point",
            Command::SetVolume(_) => "set-volume",
            Command::SetBrightness(_) => "set-brightness",
            Command::AddNetwork(_) => "add-network",
            Command::RemoveNetwork(_) => "remove-network",
            Command::SelfTest => "self-test",
        }
    }
}

/// What a command changed, as reported back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// `scheduled` is false when offline; nothing will be fetched.
    Refresh { scheduled: bool },
    AlertsReset,
    AccessPoint { enabled: bool },
    Volume { volume: u8 },
    Brightness { brightness: u8 },
    NetworkSaved { ssid: String },
    NetworkRemoved { ssid: String, removed: bool },
    SelfTest { motifs: usize },
}
