use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use folio_alert::engine::{evaluate_entry, evaluate_exit, reset_all};
use folio_alert::journal::AlertJournal;
use folio_core::alert::entity::AlertEvent;
use folio_core::common::format_percent;
use folio_core::common::time::IntervalGate;
use folio_core::config::Timings;
use folio_core::link::entity::LinkEvent;
use folio_core::link::port::Radio;
use folio_core::notify::entity::{DashboardView, ModeLine, Motif};
use folio_core::portfolio::entity::{POSITION_CAPACITY, PortfolioSnapshot, TrackingMode};
use folio_core::portfolio::error::FeedError;
use folio_core::portfolio::port::SnapshotProvider;
use folio_core::settings::error::StoreError;
use folio_core::settings::port::ConfigStore;
use folio_link::manager::ConnectivityManager;
use folio_link::transition::LinkPhase;
use folio_notify::dispatcher::{NotificationDispatcher, Outputs, Presentation};
use tracing::{debug, info, warn};

use crate::command::{Command, CommandOutcome};
use crate::error::MonitorError;
use crate::report::{ModeReport, RECENT_ALERTS, StatusReport};
use crate::stats::FetchStats;

/// Last good snapshot of one tracking mode.
struct Book {
    mode: TrackingMode,
    snapshot: PortfolioSnapshot,
    last_refresh: Option<DateTime<Utc>>,
}

impl Book {
    fn new(mode: TrackingMode) -> Self {
        Self {
            mode,
            snapshot: PortfolioSnapshot::empty(POSITION_CAPACITY),
            last_refresh: None,
        }
    }

    fn alerted(&self) -> usize {
        self.snapshot.positions().iter().filter(|p| p.latch.alerted).count()
    }

    fn line(&self) -> Option<ModeLine> {
        self.last_refresh?;
        Some(ModeLine {
            mode: self.mode,
            positions: self.snapshot.len(),
            pnl_percent: format_percent(self.snapshot.summary().total_pnl_percent),
            alerted: self.alerted(),
        })
    }

    fn report(&self) -> ModeReport {
        ModeReport {
            positions: self.snapshot.len(),
            truncated: self.snapshot.truncated(),
            alerted: self.alerted(),
            summary: self.snapshot.summary().clone(),
            last_refresh: self.last_refresh,
        }
    }
}

/// # Summary
/// The explicit context object of the device: every piece of mutable state
/// lives here and is only touched from one task.
///
/// # Invariants
/// - A tick runs its stages in a fixed order: link check, gated refresh,
///   evaluation, dispatch, output refresh.
/// - A failed fetch leaves that mode's snapshot untouched and skips its
///   evaluation for the tick.
/// - Commands are applied between ticks, never during one.
pub struct Monitor {
    store: Box<dyn ConfigStore>,
    radio: Box<dyn Radio>,
    provider: Arc<dyn SnapshotProvider>,
    link: ConnectivityManager,
    entry: Book,
    exit: Book,
    journal: AlertJournal,
    dispatcher: NotificationDispatcher,
    refresh_gate: IntervalGate,
    fetch_timeout: Duration,
    stats: FetchStats,
    started_at: DateTime<Utc>,
}

impl Monitor {
    /// # Summary
    /// Wires the collaborators into a monitor at rest (`Disconnected`, no data).
    ///
    /// # Arguments
    /// * `store` - device settings holder.
    /// * `radio` - station / access-point radio.
    /// * `provider` - snapshot source.
    /// * `outputs` - the three output channels.
    /// * `timings` - intervals and timeouts.
    /// * `now` - construction time, used for uptime and backlight activity.
    pub fn new(
        store: Box<dyn ConfigStore>,
        radio: Box<dyn Radio>,
        provider: Arc<dyn SnapshotProvider>,
        outputs: Outputs,
        timings: &Timings,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            store,
            radio,
            provider,
            link: ConnectivityManager::new(timings),
            entry: Book::new(TrackingMode::Entry),
            exit: Book::new(TrackingMode::Exit),
            journal: AlertJournal::default(),
            dispatcher: NotificationDispatcher::new(outputs, timings, now),
            refresh_gate: IntervalGate::new(timings.refresh_interval()),
            fetch_timeout: Duration::from_millis(timings.fetch_timeout_ms),
            stats: FetchStats::default(),
            started_at: now,
        }
    }

    pub fn link(&self) -> &ConnectivityManager {
        &self.link
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    pub fn journal(&self) -> &AlertJournal {
        &self.journal
    }

    pub fn snapshot(&self, mode: TrackingMode) -> &PortfolioSnapshot {
        &self.book(mode).snapshot
    }

    pub fn store(&self) -> &dyn ConfigStore {
        self.store.as_ref()
    }

    pub fn stats(&self) -> &FetchStats {
        &self.stats
    }

    fn book(&self, mode: TrackingMode) -> &Book {
        match mode {
            TrackingMode::Entry => &self.entry,
            TrackingMode::Exit => &self.exit,
        }
    }

    /// Startup motif and splash message.
    pub fn start(&mut self, now: DateTime<Utc>) {
        info!(state = %self.link.state(), "Monitor starting");
        self.dispatcher.play(Motif::Startup, self.store.settings());
        self.dispatcher.show_message("FOLIO", "Starting...", now);
        self.refresh_outputs(now);
    }

    /// # Summary
    /// Runs one pass of the loop.
    ///
    /// # Logic
    /// 1. Connectivity check; transitions go to the dispatcher.
    /// 2. When the refresh interval has elapsed and the station is online,
    ///    fetch both modes (each bounded by the fetch timeout).
    /// 3. Every successfully fetched mode replaces its snapshot, inherits
    ///    alert memory slot by slot and is evaluated; events are journaled
    ///    and dispatched.
    /// 4. Output refresh.
    pub async fn tick(&mut self, now: DateTime<Utc>) {
        let events = self.link.tick(now, self.radio.as_mut(), self.store.as_mut());
        for event in &events {
            if matches!(event, LinkEvent::Associated { .. }) {
                self.refresh_gate.force();
            }
            self.dispatcher.on_link_event(event, self.store.settings(), now);
        }

        if self.refresh_gate.is_due(now) {
            if self.link.is_online() {
                self.refresh_gate.should_run(now);
                for mode in [TrackingMode::Entry, TrackingMode::Exit] {
                    if let Some(snapshot) = self.fetch(mode, now).await {
                        self.absorb(mode, snapshot, now);
                    }
                }
            } else {
                debug!(state = %self.link.state(), "Refresh due but offline, skipped");
            }
        }

        self.refresh_outputs(now);
    }

    async fn fetch(&mut self, mode: TrackingMode, now: DateTime<Utc>) -> Option<PortfolioSnapshot> {
        let started = Instant::now();
        let result = tokio::time::timeout(self.fetch_timeout, self.provider.fetch(mode, self.link.is_online()))
            .await
            .unwrap_or(Err(FeedError::Timeout));
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(snapshot) => {
                self.stats.record_success(elapsed_ms, now);
                Some(snapshot)
            }
            Err(e) => {
                warn!(%mode, error = %e, elapsed_ms, "Portfolio fetch failed, keeping last snapshot");
                self.stats.record_error(e.to_string(), elapsed_ms, now);
                None
            }
        }
    }

    fn absorb(&mut self, mode: TrackingMode, mut snapshot: PortfolioSnapshot, now: DateTime<Utc>) {
        let book = match mode {
            TrackingMode::Entry => &mut self.entry,
            TrackingMode::Exit => &mut self.exit,
        };
        let carried = snapshot.inherit_alert_memory(&book.snapshot);
        if snapshot.truncated() > 0 {
            warn!(%mode, kept = snapshot.len(), dropped = snapshot.truncated(), "Snapshot truncated to capacity");
        }
        debug!(%mode, positions = snapshot.len(), carried, "Snapshot replaced");
        book.snapshot = snapshot;
        book.last_refresh = Some(now);

        let rules = &self.store.settings().alerts;
        let events = match mode {
            TrackingMode::Entry => evaluate_entry(&mut book.snapshot, rules, now),
            TrackingMode::Exit => evaluate_exit(&mut book.snapshot, rules, now),
        };
        self.publish(events, now);
    }

    fn publish(&mut self, events: Vec<AlertEvent>, now: DateTime<Utc>) {
        for event in events {
            self.journal.record(&event);
            self.dispatcher.dispatch(event, self.store.settings(), now);
        }
    }

    fn presentation(&self) -> Presentation {
        Presentation {
            dashboard: DashboardView {
                connectivity: self.link.state(),
                entry: self.entry.line(),
                exit: self.exit.line(),
                volume: self.store.settings().buzzer.volume,
            },
            online: self.link.is_online(),
            ap_active: self.link.is_ap_active(),
            mean_entry_pnl: self.entry.snapshot.mean_pnl_percent(),
        }
    }

    fn refresh_outputs(&mut self, now: DateTime<Utc>) {
        let presentation = self.presentation();
        self.dispatcher.refresh(&presentation, self.store.settings(), now);
    }

    /// # Summary
    /// Applies one external command.
    ///
    /// # Logic
    /// - `Refresh`: online plays `Success` and forces the next fetch, offline
    ///   plays `Error`.
    /// - `ResetAlerts`: clears entry latches, reseeds exit baselines, empties
    ///   the alert slot and indicators, plays `Reset`.
    /// - `ToggleAccessPoint` / `AddNetwork`: persist, then restart link
    ///   evaluation. `RemoveNetwork` restarts it only when the removed
    ///   profile is the one in use. Evaluation restarts even when the commit
    ///   failed, as long as the change reached memory.
    /// - `SetVolume` plays the volume feedback motif at the new level.
    /// - `SelfTest` plays every motif in order.
    ///
    /// # Returns
    /// What changed, or the store error when the change could not be committed.
    pub fn apply(&mut self, command: Command, now: DateTime<Utc>) -> Result<CommandOutcome, MonitorError> {
        info!(command = command.name(), "Applying command");
        self.dispatcher.touch(now);
        let outcome = match command {
            Command::Refresh => {
                let scheduled = self.link.is_online();
                if scheduled {
                    self.refresh_gate.force();
                    self.dispatcher.play(Motif::Success, self.store.settings());
                    self.dispatcher.show_message("REFRESH", "Fetching data...", now);
                } else {
                    self.dispatcher.play(Motif::Error, self.store.settings());
                    self.dispatcher.show_message("OFFLINE", "No network connection", now);
                }
                CommandOutcome::Refresh { scheduled }
            }
            Command::ResetAlerts => {
                reset_all(&mut self.entry.snapshot, &mut self.exit.snapshot);
                self.dispatcher.clear_alerts();
                self.dispatcher.play(Motif::Reset, self.store.settings());
                self.dispatcher.show_message("ALERTS RESET", "All alerts cleared", now);
                CommandOutcome::AlertsReset
            }
            Command::ToggleAccessPoint => {
                let result = self.store.toggle_access_point();
                self.reevaluate_after(&result, true, now);
                CommandOutcome::AccessPoint { enabled: result? }
            }
            Command::SetVolume(volume) => {
                let volume = self.store.set_volume(volume)?;
                self.dispatcher.play(Motif::VolumeFeedback { volume }, self.store.settings());
                self.dispatcher.invalidate_view();
                CommandOutcome::Volume { volume }
            }
            Command::SetBrightness(brightness) => {
                let brightness = self.store.set_display_brightness(brightness)?;
                CommandOutcome::Brightness { brightness }
            }
            Command::AddNetwork(profile) => {
                let ssid = profile.ssid.clone();
                let result = self.store.add_or_update_network(profile);
                self.reevaluate_after(&result, true, now);
                result?;
                CommandOutcome::NetworkSaved { ssid }
            }
            Command::RemoveNetwork(ssid) => {
                let in_use = self.link_ssid() == Some(ssid.as_str());
                let result = self.store.remove_network(&ssid);
                let gone = !self.store.settings().networks.iter().any(|p| p.ssid == ssid);
                self.reevaluate_after(&result, in_use && gone, now);
                CommandOutcome::NetworkRemoved { removed: result?, ssid }
            }
            Command::SelfTest => {
                self.dispatcher.show_message("SELF TEST", "Playing all tones", now);
                for motif in Motif::SELF_TEST {
                    self.dispatcher.play(motif, self.store.settings());
                }
                CommandOutcome::SelfTest {
                    motifs: Motif::SELF_TEST.len(),
                }
            }
        };
        self.refresh_outputs(now);
        Ok(outcome)
    }

    /// # Summary
    /// Restarts link evaluation after a network-related settings change.
    ///
    /// # Invariants
    /// - A change the store rejected (`Invalid`) never reached memory and
    ///   triggers nothing.
    /// - A change that reached memory but failed to commit is acted on like a
    ///   committed one; the caller still reports the commit error.
    fn reevaluate_after<T>(&mut self, result: &Result<T, StoreError>, wanted: bool, now: DateTime<Utc>) {
        match result {
            Err(StoreError::Invalid(_)) => return,
            Err(e) => warn!(error = %e, "Settings change kept in memory but not committed"),
            Ok(_) => {}
        }
        if wanted {
            self.link.request_reevaluation(now, self.radio.as_mut(), self.store.as_mut());
        }
    }

    fn link_ssid(&self) -> Option<&str> {
        match self.link.phase() {
            LinkPhase::Connecting { ssid, .. }
            | LinkPhase::Connected { ssid }
            | LinkPhase::AccessPointPlusStation { ssid, .. } => Some(ssid.as_str()),
            LinkPhase::Disconnected | LinkPhase::AccessPointOnly => None,
        }
    }

    /// Current status snapshot for outside observers.
    pub fn report(&self, now: DateTime<Utc>) -> StatusReport {
        let mut recent_alerts = self.journal.recent(TrackingMode::Entry, RECENT_ALERTS);
        recent_alerts.extend(self.journal.recent(TrackingMode::Exit, RECENT_ALERTS));
        StatusReport {
            connectivity: self.link.state(),
            online: self.link.is_online(),
            ap_active: self.link.is_ap_active(),
            lost_connection_count: self.link.lost_connection_count(),
            last_loss_at: self.link.last_loss_at(),
            volume: self.store.settings().buzzer.volume,
            entry: self.entry.report(),
            exit: self.exit.report(),
            fetch: self.stats.clone(),
            active_alert: self.dispatcher.active().map(|a| a.event.clone()),
            pending_alerts: self.dispatcher.pending_len(),
            recent_alerts,
            uptime_secs: (now - self.started_at).num_seconds().max(0),
            generated_at: now,
        }
    }
}
