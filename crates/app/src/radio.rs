//! Radio adapter for hosts whose network link is managed by the operating
//! system. Association succeeds when the profile is listed as visible; the
//! access point is bookkeeping only.

use folio_core::config::RadioConfig;
use folio_core::link::entity::StationStatus;
use folio_core::link::port::Radio;
use folio_core::settings::entity::NetworkProfile;
use tracing::info;

pub struct HostRadio {
    config: RadioConfig,
    joined: Option<String>,
    ap_running: bool,
}

impl HostRadio {
    pub fn new(config: RadioConfig) -> Self {
        Self {
            config,
            joined: None,
            ap_running: false,
        }
    }

    fn visible(&self, ssid: &str) -> bool {
        self.config.visible_networks.is_empty() || self.config.visible_networks.iter().any(|s| s == ssid)
    }
}

impl Radio for HostRadio {
    fn begin_association(&mut self, profile: &NetworkProfile) {
        self.joined = self.visible(&profile.ssid).then(|| profile.ssid.clone());
        info!(ssid = %profile.ssid, joined = self.joined.is_some(), "Host radio association");
    }

    fn station_status(&self) -> StationStatus {
        match self.joined {
            Some(_) => StationStatus::Associated {
                signal_dbm: self.config.signal_dbm,
            },
            None => StationStatus::Down,
        }
    }

    fn start_access_point(&mut self, keep_station: bool) -> bool {
        if !keep_station {
            self.joined = None;
        }
        self.ap_running = true;
        info!(keep_station, "Host radio access point up");
        true
    }

    fn stop_access_point(&mut self) {
        if self.ap_running {
            info!("Host radio access point down");
        }
        self.ap_running = false;
    }
}
