use chrono::{DateTime, Utc};
use folio_core::settings::entity::{NetworkProfile, Settings};
use folio_core::settings::error::StoreError;
use folio_core::settings::port::ConfigStore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Settings file name inside the data directory.
const SETTINGS_FILE: &str = "settings.json";
/// Bumped whenever the on-disk layout changes incompatibly.
const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct SettingsFile {
    schema: u32,
    settings: Settings,
}

/// # Summary
/// `ConfigStore` backed by a JSON file.
///
/// # Invariants
/// - A missing, unreadable or foreign-schema file yields `Settings::default()`;
///   the core never sees a partially populated record.
/// - Commits write a sibling temp file and rename it over the target, so a
///   crash mid-write leaves the previous file intact.
/// - On a failed commit the in-memory record keeps the change and the error is
///   returned to the caller.
pub struct JsonConfigStore {
    path: PathBuf,
    settings: Settings,
}

impl JsonConfigStore {
    /// # Summary
    /// Opens (or initialises) the settings file under `data_dir`.
    ///
    /// # Logic
    /// 1. Ensure the data directory exists.
    /// 2. Load and validate the file; fall back to defaults on any problem.
    ///
    /// # Returns
    /// * `Err(StoreError::Io)` only when the directory cannot be created.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = data_dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| StoreError::Io(e.to_string()))?;
        let path = dir.join(SETTINGS_FILE);
        let settings = load(&path);
        Ok(Self { path, settings })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn commit(&self) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(&SettingsFileRef {
            schema: SCHEMA_VERSION,
            settings: &self.settings,
        })
        .map_err(|e| StoreError::Serialize(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(|e| StoreError::Io(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }
}

#[derive(Serialize)]
struct SettingsFileRef<'a> {
    schema: u32,
    settings: &'a Settings,
}

fn load(path: &Path) -> Settings {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "No settings file, using defaults");
            return Settings::default();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Settings file unreadable, using defaults");
            return Settings::default();
        }
    };
    match serde_json::from_slice::<SettingsFile>(&raw) {
        Ok(file) if file.schema == SCHEMA_VERSION => file.settings,
        Ok(file) => {
            warn!(found = file.schema, expected = SCHEMA_VERSION, "Settings schema mismatch, using defaults");
            Settings::default()
        }
        Err(e) => {
            warn!(error = %e, "Settings file invalid, using defaults");
            Settings::default()
        }
    }
}

impl ConfigStore for JsonConfigStore {
    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn add_or_update_network(&mut self, profile: NetworkProfile) -> Result<(), StoreError> {
        let ssid = profile.ssid.clone();
        if let Some(evicted) = self.settings.upsert_network(profile)? {
            info!(evicted = %evicted.ssid, added = %ssid, "Network table full, evicted lowest priority");
        }
        self.commit()
    }

    fn remove_network(&mut self, ssid: &str) -> Result<bool, StoreError> {
        let removed = self.settings.remove_network(ssid);
        if removed {
            self.commit()?;
        }
        Ok(removed)
    }

    fn record_association(&mut self, ssid: &str, at: DateTime<Utc>, signal_dbm: Option<i32>) -> Result<(), StoreError> {
        if self.settings.annotate_association(ssid, at, signal_dbm) {
            self.commit()?;
        }
        Ok(())
    }

    fn toggle_access_point(&mut self) -> Result<bool, StoreError> {
        self.settings.access_point_enabled = !self.settings.access_point_enabled;
        self.commit()?;
        Ok(self.settings.access_point_enabled)
    }

    fn set_volume(&mut self, volume: u8) -> Result<u8, StoreError> {
        self.settings.buzzer.volume = volume.min(100);
        self.commit()?;
        Ok(self.settings.buzzer.volume)
    }

    fn set_display_brightness(&mut self, brightness: u8) -> Result<u8, StoreError> {
        self.settings.display.brightness = brightness.min(100);
        self.commit()?;
        Ok(self.settings.display.brightness)
    }
}
