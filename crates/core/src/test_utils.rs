//! Recording fakes for every port, shared by the behavioural tests of the
//! adapter crates. Enabled with the `test-utils` feature.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::link::entity::StationStatus;
use crate::link::port::Radio;
use crate::notify::entity::{Cue, IndicatorColor, Lamp, LampColor, ViewModel};
use crate::notify::port::{AudibleChannel, IndicatorChannel, VisualChannel};
use crate::portfolio::entity::{PortfolioSnapshot, TrackingMode};
use crate::portfolio::error::FeedError;
use crate::portfolio::port::SnapshotProvider;
use crate::settings::entity::NetworkProfile;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Debug, Default)]
pub struct RadioLog {
    pub status: Option<StationStatus>,
    /// Associate immediately when an attempt begins.
    pub join_on_begin: bool,
    pub attempts: Vec<String>,
    pub ap_starts: Vec<bool>,
    pub ap_stops: usize,
    pub ap_running: bool,
}

/// # Summary
/// Radio whose station link is driven by the test.
///
/// # Invariants
/// - Clones share state, so a test keeps one handle while the manager owns
///   the other.
#[derive(Clone, Default)]
pub struct ScriptedRadio {
    inner: Arc<Mutex<RadioLog>>,
}

impl ScriptedRadio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn joining() -> Self {
        let radio = Self::default();
        lock(&radio.inner).join_on_begin = true;
        radio
    }

    pub fn set_up(&self, signal_dbm: Option<i32>) {
        lock(&self.inner).status = Some(StationStatus::Associated { signal_dbm });
    }

    pub fn set_down(&self) {
        lock(&self.inner).status = Some(StationStatus::Down);
    }

    pub fn log(&self) -> MutexGuard<'_, RadioLog> {
        lock(&self.inner)
    }
}

impl Radio for ScriptedRadio {
    fn begin_association(&mut self, profile: &NetworkProfile) {
        let mut log = lock(&self.inner);
        log.attempts.push(profile.ssid.clone());
        log.status = Some(if log.join_on_begin {
            StationStatus::Associated { signal_dbm: Some(-55) }
        } else {
            StationStatus::Down
        });
    }

    fn station_status(&self) -> StationStatus {
        lock(&self.inner).status.unwrap_or(StationStatus::Down)
    }

    fn start_access_point(&mut self, keep_station: bool) -> bool {
        let mut log = lock(&self.inner);
        log.ap_starts.push(keep_station);
        log.ap_running = true;
        true
    }

    fn stop_access_point(&mut self) {
        let mut log = lock(&self.inner);
        log.ap_stops += 1;
        log.ap_running = false;
    }
}

/// Snapshot source serving whatever the test queued per mode.
#[derive(Default)]
pub struct StaticSnapshotProvider {
    snapshots: Mutex<HashMap<TrackingMode, Result<PortfolioSnapshot, String>>>,
    calls: Mutex<Vec<TrackingMode>>,
}

impl StaticSnapshotProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, mode: TrackingMode, snapshot: PortfolioSnapshot) {
        lock(&self.snapshots).insert(mode, Ok(snapshot));
    }

    pub fn fail(&self, mode: TrackingMode, reason: &str) {
        lock(&self.snapshots).insert(mode, Err(reason.to_string()));
    }

    pub fn calls(&self) -> Vec<TrackingMode> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl SnapshotProvider for StaticSnapshotProvider {
    async fn fetch(&self, mode: TrackingMode, online: bool) -> Result<PortfolioSnapshot, FeedError> {
        lock(&self.calls).push(mode);
        if !online {
            return Err(FeedError::Offline);
        }
        match lock(&self.snapshots).get(&mode) {
            Some(Ok(snapshot)) => Ok(snapshot.clone()),
            Some(Err(reason)) => Err(FeedError::Network(reason.clone())),
            None => Err(FeedError::NotConfigured),
        }
    }
}

#[derive(Default)]
pub struct RecordingAudible {
    cues: Mutex<Vec<Cue>>,
}

impl RecordingAudible {
    pub fn cues(&self) -> Vec<Cue> {
        lock(&self.cues).clone()
    }

    pub fn clear(&self) {
        lock(&self.cues).clear();
    }
}

impl AudibleChannel for RecordingAudible {
    fn play(&self, cue: &Cue) {
        lock(&self.cues).push(cue.clone());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorCall {
    State {
        mode: TrackingMode,
        color: Option<IndicatorColor>,
        blinking: bool,
    },
    Blink(bool),
    Lamp(Lamp, LampColor),
}

#[derive(Default)]
pub struct RecordingIndicator {
    calls: Mutex<Vec<IndicatorCall>>,
}

impl RecordingIndicator {
    pub fn calls(&self) -> Vec<IndicatorCall> {
        lock(&self.calls).clone()
    }

    /// State changes only, blink phases filtered out.
    pub fn states(&self) -> Vec<IndicatorCall> {
        lock(&self.calls)
            .iter()
            .filter(|c| matches!(c, IndicatorCall::State { .. }))
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        lock(&self.calls).clear();
    }
}

impl IndicatorChannel for RecordingIndicator {
    fn set_state(&self, mode: TrackingMode, color: Option<IndicatorColor>, blinking: bool) {
        lock(&self.calls).push(IndicatorCall::State { mode, color, blinking });
    }

    fn blink_phase(&self, lit: bool) {
        lock(&self.calls).push(IndicatorCall::Blink(lit));
    }

    fn set_lamp(&self, lamp: Lamp, color: LampColor) {
        lock(&self.calls).push(IndicatorCall::Lamp(lamp, color));
    }
}

#[derive(Default)]
pub struct RecordingVisual {
    views: Mutex<Vec<ViewModel>>,
    backlight: Mutex<Vec<u8>>,
}

impl RecordingVisual {
    pub fn views(&self) -> Vec<ViewModel> {
        lock(&self.views).clone()
    }

    pub fn last_view(&self) -> Option<ViewModel> {
        lock(&self.views).last().cloned()
    }

    pub fn backlight(&self) -> Vec<u8> {
        lock(&self.backlight).clone()
    }

    pub fn clear(&self) {
        lock(&self.views).clear();
        lock(&self.backlight).clear();
    }
}

impl VisualChannel for RecordingVisual {
    fn render(&self, view: &ViewModel) {
        lock(&self.views).push(view.clone());
    }

    fn set_backlight(&self, level: u8) {
        lock(&self.backlight).push(level);
    }
}
