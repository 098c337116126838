use chrono::{DateTime, Utc};
use folio_core::settings::entity::{NetworkProfile, Settings};
use folio_core::settings::error::StoreError;
use folio_core::settings::port::ConfigStore;
use tracing::info;

/// # Summary
/// Volatile `ConfigStore`; every write commits immediately and cannot fail
/// except on validation.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    settings: Settings,
}

impl MemoryConfigStore {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }
}

impl ConfigStore for MemoryConfigStore {
    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn add_or_update_network(&mut self, profile: NetworkProfile) -> Result<(), StoreError> {
        let ssid = profile.ssid.clone();
        if let Some(evicted) = self.settings.upsert_network(profile)? {
            info!(evicted = %evicted.ssid, added = %ssid, "Network table full, evicted lowest priority");
        }
        Ok(())
    }

    fn remove_network(&mut self, ssid: &str) -> Result<bool, StoreError> {
        Ok(self.settings.remove_network(ssid))
    }

    fn record_association(&mut self, ssid: &str, at: DateTime<Utc>, signal_dbm: Option<i32>) -> Result<(), StoreError> {
        self.settings.annotate_association(ssid, at, signal_dbm);
        Ok(())
    }

    fn toggle_access_point(&mut self) -> Result<bool, StoreError> {
        self.settings.access_point_enabled = !self.settings.access_point_enabled;
        Ok(self.settings.access_point_enabled)
    }

    fn set_volume(&mut self, volume: u8) -> Result<u8, StoreError> {
        self.settings.buzzer.volume = volume.min(100);
        Ok(self.settings.buzzer.volume)
    }

    fn set_display_brightness(&mut self, brightness: u8) -> Result<u8, StoreError> {
        self.settings.display.brightness = brightness.min(100);
        Ok(self.settings.display.brightness)
    }
}
