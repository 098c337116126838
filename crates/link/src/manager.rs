use chrono::{DateTime, TimeDelta, Utc};
use folio_core::common::time::IntervalGate;
use folio_core::config::Timings;
use folio_core::link::entity::{ConnectivityState, LinkEvent, StationStatus};
use folio_core::link::port::Radio;
use folio_core::settings::port::ConfigStore;
use tracing::{debug, info, warn};

use crate::transition::{Effect, LinkInput, LinkPhase, Step, transition};

/// # Summary
/// Station / access-point state machine.
///
/// # Invariants
/// - State is evaluated at most once per check interval; every other `tick`
///   is a no-op with no radio or store side effects.
/// - `lost_count` never decreases.
/// - The radio and the store are borrowed per tick, never owned, so the
///   monitor context stays the only owner of hardware handles.
pub struct ConnectivityManager {
    phase: LinkPhase,
    gate: IntervalGate,
    association_timeout: TimeDelta,
    lost_count: u64,
    last_loss_at: Option<DateTime<Utc>>,
}

impl ConnectivityManager {
    pub fn new(timings: &Timings) -> Self {
        Self {
            phase: LinkPhase::Disconnected,
            gate: IntervalGate::new(timings.link_check()),
            association_timeout: timings.association_timeout(),
            lost_count: 0,
            last_loss_at: None,
        }
    }

    pub fn state(&self) -> ConnectivityState {
        self.phase.state()
    }

    pub fn phase(&self) -> &LinkPhase {
        &self.phase
    }

    /// True only in `Connected`, or in `AccessPointPlusStation` with the
    /// station link up.
    pub fn is_online(&self) -> bool {
        self.phase.is_online()
    }

    pub fn is_ap_active(&self) -> bool {
        self.phase.is_ap_active()
    }

    pub fn lost_connection_count(&self) -> u64 {
        self.lost_count
    }

    pub fn last_loss_at(&self) -> Option<DateTime<Utc>> {
        self.last_loss_at
    }

    /// # Summary
    /// Restarts evaluation from `Disconnected` on the next tick.
    ///
    /// # Logic
    /// Called after the access point is toggled or a profile is added. Any
    /// running access point is stopped; the next evaluation decides whether
    /// to start it again.
    pub fn request_reevaluation(&mut self, now: DateTime<Utc>, radio: &mut dyn Radio, store: &mut dyn ConfigStore) {
        let ap_fallback = store.settings().access_point_enabled;
        match transition(&self.phase, LinkInput::Reevaluate, ap_fallback, now) {
            Ok(step) => {
                info!(from = %self.phase.state(), "Link re-evaluation requested");
                self.apply(step, now, radio, store);
            }
            Err(e) => warn!(error = %e, "Link re-evaluation rejected"),
        }
        self.gate.force();
    }

    /// # Summary
    /// Runs one state evaluation if the check interval has elapsed.
    ///
    /// # Logic
    /// 1. Return immediately when the interval gate is closed.
    /// 2. Turn the radio status and the current phase into at most one input.
    /// 3. Feed it through the transition table and apply the resulting effects.
    ///
    /// # Arguments
    /// * `now` - loop time.
    /// * `radio` - station / AP radio.
    /// * `store` - settings holder; annotated on successful association.
    ///
    /// # Returns
    /// The transition events produced by this evaluation (often none).
    pub fn tick(&mut self, now: DateTime<Utc>, radio: &mut dyn Radio, store: &mut dyn ConfigStore) -> Vec<LinkEvent> {
        if !self.gate.should_run(now) {
            return Vec::new();
        }

        let ap_fallback = store.settings().access_point_enabled;
        let Some(input) = self.observe(now, &*radio, &*store) else {
            debug!(state = %self.phase.state(), "Link check: no change");
            return Vec::new();
        };

        match transition(&self.phase, input, ap_fallback, now) {
            Ok(step) => self.apply(step, now, radio, store),
            Err(e) => {
                warn!(error = %e, "Link transition rejected");
                Vec::new()
            }
        }
    }

    fn observe(&self, now: DateTime<Utc>, radio: &dyn Radio, store: &dyn ConfigStore) -> Option<LinkInput> {
        let status = radio.station_status();
        match &self.phase {
            LinkPhase::Disconnected => match store.settings().best_network() {
                Some(profile) => Some(LinkInput::Attempt {
                    ssid: profile.ssid.clone(),
                }),
                None if store.settings().access_point_enabled => Some(LinkInput::FallBack),
                None => None,
            },
            LinkPhase::Connecting { since, .. } => {
                if let StationStatus::Associated { signal_dbm } = status {
                    Some(LinkInput::Joined { signal_dbm })
                } else if now - *since >= self.association_timeout {
                    Some(LinkInput::Expired)
                } else {
                    None
                }
            }
            LinkPhase::Connected { .. } => (!status.is_up()).then_some(LinkInput::Dropped),
            LinkPhase::AccessPointOnly => None,
            LinkPhase::AccessPointPlusStation { station_up: true, .. } => {
                (!status.is_up()).then_some(LinkInput::Dropped)
            }
            LinkPhase::AccessPointPlusStation { station_up: false, ssid } => {
                if let StationStatus::Associated { signal_dbm } = status {
                    Some(LinkInput::Joined { signal_dbm })
                } else {
                    let retry = store
                        .settings()
                        .best_network()
                        .map(|p| p.ssid.clone())
                        .unwrap_or_else(|| ssid.clone());
                    Some(LinkInput::Attempt { ssid: retry })
                }
            }
        }
    }

    fn apply(
        &mut self,
        step: Step,
        now: DateTime<Utc>,
        radio: &mut dyn Radio,
        store: &mut dyn ConfigStore,
    ) -> Vec<LinkEvent> {
        let from = self.phase.state();
        let mut events = Vec::new();

        for effect in step.effects {
            match effect {
                Effect::BeginAssociation { ssid } => {
                    match store.settings().networks.iter().find(|n| n.ssid == ssid) {
                        Some(profile) => {
                            info!(ssid = %ssid, "Starting association");
                            radio.begin_association(profile);
                        }
                        None => warn!(ssid = %ssid, "Association target vanished from settings"),
                    }
                }
                Effect::StartAccessPoint { keep_station } => {
                    if !radio.start_access_point(keep_station) {
                        warn!(keep_station, "Access point failed to start");
                    }
                }
                Effect::StopAccessPoint => radio.stop_access_point(),
                Effect::RecordAssociation { ssid, signal_dbm } => {
                    if let Err(e) = store.record_association(&ssid, now, signal_dbm) {
                        warn!(ssid = %ssid, error = %e, "Failed to persist association annotation");
                    }
                }
                Effect::CountLoss => {
                    self.lost_count += 1;
                    self.last_loss_at = Some(now);
                    events.push(LinkEvent::StationLost {
                        at: now,
                        lost_count: self.lost_count,
                    });
                }
            }
        }

        self.phase = step.next;
        events.extend(step.event);

        let to = self.phase.state();
        if from != to {
            info!(from = %from, to = %to, lost = self.lost_count, "Link state changed");
        }
        events
    }
}
