use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::settings::error::StoreError;

/// Maximum number of stored network profiles.
pub const MAX_NETWORK_PROFILES: usize = 5;
/// Lowest and highest accepted profile priority.
pub const PRIORITY_RANGE: (u8, u8) = (1, 10);

/// # Summary
/// A known network the station radio may join.
///
/// # Invariants
/// - `ssid` is non-empty and unique within `Settings::networks`.
/// - `priority` lies in 1..=10, higher wins.
/// - Annotation fields (`last_connected`, `attempts`, `signal_dbm`) are only
///   written through `ConfigStore::record_association`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NetworkProfile {
    pub ssid: String,
    #[serde(default)]
    pub secret: String,
    pub priority: u8,
    pub auto_connect: bool,
    #[serde(default)]
    pub last_connected: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub signal_dbm: Option<i32>,
}

impl NetworkProfile {
    pub fn new(ssid: impl Into<String>, secret: impl Into<String>, priority: u8, auto_connect: bool) -> Self {
        Self {
            ssid: ssid.into(),
            secret: secret.into(),
            priority: clamp_priority(priority),
            auto_connect,
            last_connected: None,
            attempts: 0,
            signal_dbm: None,
        }
    }
}

fn clamp_priority(priority: u8) -> u8 {
    priority.clamp(PRIORITY_RANGE.0, PRIORITY_RANGE.1)
}

/// Where portfolio data comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct FeedSettings {
    pub server: String,
    pub username: String,
    pub password: String,
    pub entry_portfolio: String,
    pub exit_portfolio: String,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            server: String::new(),
            username: String::new(),
            password: String::new(),
            entry_portfolio: "MainPortfolio".to_string(),
            exit_portfolio: "ExitPortfolio".to_string(),
        }
    }
}

impl FeedSettings {
    pub fn is_configured(&self) -> bool {
        !self.server.is_empty() && !self.username.is_empty()
    }
}

/// # Summary
/// Thresholds consumed by the alert engine.
///
/// # Invariants
/// - Thresholds are P/L percentages; entry thresholds are negative.
/// - `severe_alert_threshold <= alert_threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct AlertSettings {
    pub alert_threshold: f64,
    pub severe_alert_threshold: f64,
    pub portfolio_alert_threshold: f64,
    pub cooldown_secs: u32,
    pub exit_alert_percent: f64,
    pub exit_alerts_enabled: bool,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            alert_threshold: -5.0,
            severe_alert_threshold: -10.0,
            portfolio_alert_threshold: -7.0,
            cooldown_secs: 300,
            exit_alert_percent: 3.0,
            exit_alerts_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct BuzzerSettings {
    pub enabled: bool,
    /// 0..=100, 0 mutes every motif.
    pub volume: u8,
}

impl Default for BuzzerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct DisplaySettings {
    /// 0..=100, 0 turns the backlight off.
    pub brightness: u8,
    /// Backlight goes dark after this many idle seconds, 0 disables.
    pub timeout_secs: u32,
    /// Show the dedicated connection-lost screen.
    pub show_details: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            brightness: 100,
            timeout_secs: 30,
            show_details: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct IndicatorSettings {
    pub enabled: bool,
    pub link_lamp: bool,
    pub portfolio_lamp: bool,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            link_lamp: true,
            portfolio_lamp: true,
        }
    }
}

/// # Summary
/// The full device settings record held by a `ConfigStore`.
///
/// # Invariants
/// - `networks.len() <= MAX_NETWORK_PROFILES`, identifiers unique.
/// - Stores substitute `Settings::default()` for unreadable data, so the
///   core always sees a fully populated record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Settings {
    pub networks: Vec<NetworkProfile>,
    pub access_point_enabled: bool,
    pub feed: FeedSettings,
    pub alerts: AlertSettings,
    pub buzzer: BuzzerSettings,
    pub display: DisplaySettings,
    pub indicators: IndicatorSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            networks: Vec::new(),
            access_point_enabled: true,
            feed: FeedSettings::default(),
            alerts: AlertSettings::default(),
            buzzer: BuzzerSettings::default(),
            display: DisplaySettings::default(),
            indicators: IndicatorSettings::default(),
        }
    }
}

impl Settings {
    /// # Summary
    /// Adds a profile or updates the one with the same identifier.
    ///
    /// # Logic
    /// 1. Reject an empty identifier.
    /// 2. Existing identifier: replace secret, priority and auto-connect,
    ///    keep the association annotations.
    /// 3. New identifier with a full table: evict the first profile holding
    ///    the lowest priority, then append.
    ///
    /// # Returns
    /// The evicted profile, if any.
    pub fn upsert_network(&mut self, profile: NetworkProfile) -> Result<Option<NetworkProfile>, StoreError> {
        if profile.ssid.trim().is_empty() {
            return Err(StoreError::Invalid("network identifier is empty".into()));
        }
        let priority = clamp_priority(profile.priority);

        if let Some(existing) = self.networks.iter_mut().find(|n| n.ssid == profile.ssid) {
            existing.secret = profile.secret;
            existing.priority = priority;
            existing.auto_connect = profile.auto_connect;
            return Ok(None);
        }

        let mut evicted = None;
        if self.networks.len() >= MAX_NETWORK_PROFILES {
            let mut lowest = 0;
            for (idx, candidate) in self.networks.iter().enumerate() {
                if candidate.priority < self.networks[lowest].priority {
                    lowest = idx;
                }
            }
            evicted = Some(self.networks.remove(lowest));
        }

        self.networks.push(NetworkProfile {
            priority,
            last_connected: None,
            attempts: 0,
            signal_dbm: None,
            ..profile
        });
        Ok(evicted)
    }

    /// Removes a profile, returning whether anything was deleted.
    pub fn remove_network(&mut self, ssid: &str) -> bool {
        let before = self.networks.len();
        self.networks.retain(|n| n.ssid != ssid);
        before != self.networks.len()
    }

    /// Highest-priority auto-connect profile; ties go to the first found.
    pub fn best_network(&self) -> Option<&NetworkProfile> {
        let mut best: Option<&NetworkProfile> = None;
        for candidate in self.networks.iter().filter(|n| n.auto_connect) {
            match best {
                Some(current) if candidate.priority <= current.priority => {}
                _ => best = Some(candidate),
            }
        }
        best
    }

    /// Annotates the profile that just associated.
    pub fn annotate_association(&mut self, ssid: &str, at: DateTime<Utc>, signal_dbm: Option<i32>) -> bool {
        match self.networks.iter_mut().find(|n| n.ssid == ssid) {
            Some(profile) => {
                profile.last_connected = Some(at);
                profile.attempts = profile.attempts.saturating_add(1);
                profile.signal_dbm = signal_dbm;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_updates_in_place() {
        let mut settings = Settings::default();
        settings.upsert_network(NetworkProfile::new("home", "a", 5, true)).unwrap();
        settings.upsert_network(NetworkProfile::new("home", "b", 9, false)).unwrap();

        assert_eq!(settings.networks.len(), 1);
        assert_eq!(settings.networks[0].secret, "b");
        assert_eq!(settings.networks[0].priority, 9);
        assert!(!settings.networks[0].auto_connect);
    }

    #[test]
    fn test_upsert_evicts_lowest_priority_when_full() {
        let mut settings = Settings::default();
        for (ssid, prio) in [("a", 5), ("b", 2), ("c", 7), ("d", 2), ("e", 9)] {
            settings.upsert_network(NetworkProfile::new(ssid, "", prio, true)).unwrap();
        }
        let evicted = settings
            .upsert_network(NetworkProfile::new("f", "", 4, true))
            .unwrap()
            .unwrap();

        assert_eq!(evicted.ssid, "b");
        assert_eq!(settings.networks.len(), MAX_NETWORK_PROFILES);
        assert_eq!(settings.networks.last().unwrap().ssid, "f");
    }

    #[test]
    fn test_upsert_rejects_empty_identifier() {
        let mut settings = Settings::default();
        let result = settings.upsert_network(NetworkProfile::new("  ", "x", 5, true));
        assert!(matches!(result, Err(StoreError::Invalid(_))));
    }

    #[test]
    fn test_priority_is_clamped() {
        let mut settings = Settings::default();
        settings.upsert_network(NetworkProfile::new("x", "", 0, true)).unwrap();
        settings.upsert_network(NetworkProfile::new("y", "", 42, true)).unwrap();
        assert_eq!(settings.networks[0].priority, 1);
        assert_eq!(settings.networks[1].priority, 10);
    }

    #[test]
    fn test_best_network_prefers_priority_then_order() {
        let mut settings = Settings::default();
        settings.upsert_network(NetworkProfile::new("low", "", 3, true)).unwrap();
        settings.upsert_network(NetworkProfile::new("first", "", 8, true)).unwrap();
        settings.upsert_network(NetworkProfile::new("second", "", 8, true)).unwrap();
        settings.upsert_network(NetworkProfile::new("manual", "", 10, false)).unwrap();

        assert_eq!(settings.best_network().unwrap().ssid, "first");
    }
}
