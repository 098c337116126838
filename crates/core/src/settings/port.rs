use chrono::{DateTime, Utc};

use crate::settings::entity::{NetworkProfile, Settings};
use crate::settings::error::StoreError;

/// # Summary
/// Holder of the device settings record.
///
/// # Invariants
/// - `settings()` always returns a fully populated record.
/// - Every write either commits durably and returns `Ok`, or leaves the
///   committed state untouched and returns `Err`. In-memory state may
///   already reflect the change when the commit fails; callers only log.
/// - Only explicit external commands (and association annotations from the
///   connectivity manager) write.
pub trait ConfigStore: Send {
    /// Current settings.
    fn settings(&self) -> &Settings;

    /// Adds or updates a network profile, see `Settings::upsert_network`.
    fn add_or_update_network(&mut self, profile: NetworkProfile) -> Result<(), StoreError>;

    /// Deletes a network profile by identifier.
    ///
    /// # Returns
    /// `Ok(false)` when no profile matched.
    fn remove_network(&mut self, ssid: &str) -> Result<bool, StoreError>;

    /// Records a successful association on the winning profile.
    fn record_association(
        &mut self,
        ssid: &str,
        at: DateTime<Utc>,
        signal_dbm: Option<i32>,
    ) -> Result<(), StoreError>;

    /// Flips the access-point fallback flag and returns the new value.
    fn toggle_access_point(&mut self) -> Result<bool, StoreError>;

    /// Sets the buzzer volume, clamped to 0..=100.
    fn set_volume(&mut self, volume: u8) -> Result<u8, StoreError>;

    /// Sets the display brightness, clamped to 0..=100.
    fn set_display_brightness(&mut self, brightness: u8) -> Result<u8, StoreError>;
}
