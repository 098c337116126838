use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use folio_core::alert::entity::AlertKind;
use folio_core::common::time::ManualClock;
use folio_core::config::Timings;
use folio_core::link::entity::ConnectivityState;
use folio_core::notify::entity::Motif;
use folio_core::portfolio::entity::{PortfolioSnapshot, Position, Side, TrackingMode};
use folio_core::settings::entity::{NetworkProfile, Settings};
use folio_core::settings::error::StoreError;
use folio_core::settings::port::ConfigStore;
use folio_core::test_utils::{RecordingAudible, RecordingIndicator, RecordingVisual, ScriptedRadio, StaticSnapshotProvider};
use folio_monitor::command::{Command, CommandOutcome};
use folio_monitor::context::Monitor;
use folio_monitor::error::MonitorError;
use folio_monitor::runtime::MonitorRuntime;
use folio_notify::dispatcher::Outputs;
use folio_store::memory::MemoryConfigStore;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 14, 7, 0, 0).unwrap()
}

fn secs(s: i64) -> TimeDelta {
    TimeDelta::seconds(s)
}

struct Rig {
    monitor: Monitor,
    radio: ScriptedRadio,
    provider: Arc<StaticSnapshotProvider>,
    audible: Arc<RecordingAudible>,
}

fn rig(settings: Settings) -> Rig {
    rig_with(Box::new(MemoryConfigStore::new(settings)))
}

fn rig_with(store: Box<dyn ConfigStore>) -> Rig {
    let radio = ScriptedRadio::joining();
    let provider = Arc::new(StaticSnapshotProvider::new());
    let audible = Arc::new(RecordingAudible::default());
    let outputs = Outputs {
        audible: audible.clone(),
        indicator: Arc::new(RecordingIndicator::default()),
        visual: Arc::new(RecordingVisual::default()),
    };
    let monitor = Monitor::new(
        store,
        Box::new(radio.clone()),
        provider.clone(),
        outputs,
        &Timings::default(),
        t0(),
    );
    Rig {
        monitor,
        radio,
        provider,
        audible,
    }
}

/// Applies every change in memory, then fails to commit it.
#[derive(Default)]
struct UncommittedStore {
    inner: MemoryConfigStore,
}

fn disk_full() -> StoreError {
    StoreError::Io("No space left on device".into())
}

impl ConfigStore for UncommittedStore {
    fn settings(&self) -> &Settings {
        self.inner.settings()
    }

    fn add_or_update_network(&mut self, profile: NetworkProfile) -> Result<(), StoreError> {
        self.inner.add_or_update_network(profile)?;
        Err(disk_full())
    }

    fn remove_network(&mut self, ssid: &str) -> Result<bool, StoreError> {
        self.inner.remove_network(ssid)?;
        Err(disk_full())
    }

    fn record_association(&mut self, ssid: &str, at: DateTime<Utc>, signal_dbm: Option<i32>) -> Result<(), StoreError> {
        self.inner.record_association(ssid, at, signal_dbm)
    }

    fn toggle_access_point(&mut self) -> Result<bool, StoreError> {
        self.inner.toggle_access_point()?;
        Err(disk_full())
    }

    fn set_volume(&mut self, volume: u8) -> Result<u8, StoreError> {
        self.inner.set_volume(volume)
    }

    fn set_display_brightness(&mut self, brightness: u8) -> Result<u8, StoreError> {
        self.inner.set_display_brightness(brightness)
    }
}

fn station_only() -> Settings {
    let mut settings = Settings::default();
    settings.access_point_enabled = false;
    settings.networks.push(NetworkProfile::new("home", "pw", 5, true));
    settings
}

fn entry_book(price: f64) -> PortfolioSnapshot {
    PortfolioSnapshot::bounded(vec![Position::new("BTCUSDT", Side::Long, 1.0, 100.0, price)], 100)
}

fn exit_book(price: f64) -> PortfolioSnapshot {
    PortfolioSnapshot::bounded(vec![Position::new("ETHUSDT", Side::Long, 1.0, 100.0, price)], 100)
}

/// Connects (two link checks) and performs the first refresh.
async fn connected(settings: Settings) -> Rig {
    let mut rig = rig(settings);
    rig.provider.serve(TrackingMode::Entry, entry_book(94.0));
    rig.provider.serve(TrackingMode::Exit, exit_book(100.0));
    rig.monitor.tick(t0()).await;
    rig.monitor.tick(t0() + secs(10)).await;
    rig
}

#[tokio::test]
async fn test_no_fetch_until_online() {
    let mut rig = rig(station_only());
    rig.monitor.tick(t0()).await;

    assert_eq!(rig.monitor.link().state(), ConnectivityState::Connecting);
    assert!(rig.provider.calls().is_empty());
    assert_eq!(rig.monitor.stats().error_count, 0);
}

#[tokio::test]
async fn test_first_refresh_after_association_evaluates_both_modes() {
    let rig = connected(station_only()).await;
    let monitor = &rig.monitor;

    assert_eq!(monitor.link().state(), ConnectivityState::Connected);
    assert_eq!(rig.provider.calls(), vec![TrackingMode::Entry, TrackingMode::Exit]);

    let entry = monitor.snapshot(TrackingMode::Entry);
    assert!(entry.positions()[0].latch.alerted);
    assert_eq!(monitor.snapshot(TrackingMode::Exit).positions()[0].exit.last_price, Some(100.0));

    assert_eq!(monitor.journal().len(TrackingMode::Entry), 1);
    assert_eq!(monitor.journal().len(TrackingMode::Exit), 0);
    let active = monitor.dispatcher().active().unwrap();
    assert_eq!(active.event.kind, AlertKind::Position);
    assert_eq!(active.event.symbol, "BTC");
    assert!(
        rig.audible
            .cues()
            .iter()
            .any(|c| c.motif == Motif::EntryLong { severe: false })
    );

    let report = monitor.report(t0() + secs(10));
    assert!(report.online);
    assert_eq!(report.entry.positions, 1);
    assert_eq!(report.entry.alerted, 1);
    assert_eq!(report.fetch.success_count, 2);
    assert_eq!(report.recent_alerts.len(), 1);
    assert_eq!(report.uptime_secs, 10);
}

#[tokio::test]
async fn test_failed_fetch_keeps_last_snapshot() {
    let mut rig = connected(station_only()).await;
    rig.provider.fail(TrackingMode::Entry, "connection reset");

    rig.monitor.tick(t0() + secs(25)).await;

    let entry = rig.monitor.snapshot(TrackingMode::Entry);
    assert_eq!(entry.len(), 1);
    assert_eq!(entry.positions()[0].current_price, 94.0);
    assert!(entry.positions()[0].latch.alerted);
    let stats = rig.monitor.stats();
    assert_eq!(stats.error_count, 1);
    assert_eq!(stats.success_count, 3);
    assert!(stats.last_error.as_deref().unwrap().contains("connection reset"));
}

#[tokio::test]
async fn test_refresh_respects_interval() {
    let mut rig = connected(station_only()).await;
    rig.monitor.tick(t0() + secs(20)).await;
    assert_eq!(rig.provider.calls().len(), 2);
    rig.monitor.tick(t0() + secs(25)).await;
    assert_eq!(rig.provider.calls().len(), 4);
}

#[tokio::test]
async fn test_latches_survive_refresh_of_same_symbol() {
    let mut rig = connected(station_only()).await;
    rig.provider.serve(TrackingMode::Entry, entry_book(89.0));

    rig.monitor.tick(t0() + secs(25)).await;

    let pos = &rig.monitor.snapshot(TrackingMode::Entry).positions()[0];
    assert_eq!(pos.current_price, 89.0);
    assert!(pos.latch.alerted);
    assert!(!pos.latch.severe);
    let position_alerts = rig
        .monitor
        .journal()
        .recent(TrackingMode::Entry, 10)
        .iter()
        .filter(|e| e.kind == AlertKind::Position)
        .count();
    assert_eq!(position_alerts, 1);
}

#[tokio::test]
async fn test_exit_price_move_after_refresh() {
    let mut rig = connected(station_only()).await;
    rig.provider.serve(TrackingMode::Exit, exit_book(96.0));

    rig.monitor.tick(t0() + secs(25)).await;

    let recent = rig.monitor.journal().recent(TrackingMode::Exit, 5);
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].kind, AlertKind::PriceMove);
    assert!(rig.audible.cues().iter().any(|c| c.motif == Motif::ExitLoss));
}

#[tokio::test]
async fn test_station_loss_plays_connection_lost() {
    let mut rig = connected(station_only()).await;
    rig.radio.set_down();

    rig.monitor.tick(t0() + secs(20)).await;

    assert_eq!(rig.monitor.link().state(), ConnectivityState::Disconnected);
    assert_eq!(rig.monitor.link().lost_connection_count(), 1);
    assert!(rig.audible.cues().iter().any(|c| c.motif == Motif::ConnectionLost));
}

#[tokio::test]
async fn test_volume_command() {
    let mut rig = rig(station_only());
    let outcome = rig.monitor.apply(Command::SetVolume(40), t0()).unwrap();
    assert_eq!(outcome, CommandOutcome::Volume { volume: 40 });
    assert_eq!(rig.monitor.store().settings().buzzer.volume, 40);
    assert_eq!(rig.audible.cues().last().unwrap().motif, Motif::VolumeFeedback { volume: 40 });

    rig.audible.clear();
    rig.monitor.apply(Command::SetVolume(0), t0()).unwrap();
    assert!(rig.audible.cues().is_empty());
}

#[tokio::test]
async fn test_reset_alerts_command() {
    let mut rig = connected(station_only()).await;
    rig.audible.clear();

    let outcome = rig.monitor.apply(Command::ResetAlerts, t0() + secs(12)).unwrap();

    assert_eq!(outcome, CommandOutcome::AlertsReset);
    assert!(!rig.monitor.snapshot(TrackingMode::Entry).positions()[0].latch.alerted);
    assert!(rig.monitor.dispatcher().active().is_none());
    assert_eq!(rig.audible.cues()[0].motif, Motif::Reset);
}

#[tokio::test]
async fn test_refresh_command_online_and_offline() {
    let mut rig = rig(station_only());
    let outcome = rig.monitor.apply(Command::Refresh, t0()).unwrap();
    assert_eq!(outcome, CommandOutcome::Refresh { scheduled: false });
    assert_eq!(rig.audible.cues().last().unwrap().motif, Motif::Error);

    let mut rig = connected(station_only()).await;
    let outcome = rig.monitor.apply(Command::Refresh, t0() + secs(11)).unwrap();
    assert_eq!(outcome, CommandOutcome::Refresh { scheduled: true });
    assert_eq!(rig.audible.cues().last().unwrap().motif, Motif::Success);

    rig.monitor.tick(t0() + secs(12)).await;
    assert_eq!(rig.provider.calls().len(), 4);
}

#[tokio::test]
async fn test_self_test_plays_every_motif() {
    let mut settings = station_only();
    settings.buzzer.volume = 80;
    let mut rig = rig(settings);

    let outcome = rig.monitor.apply(Command::SelfTest, t0()).unwrap();

    assert_eq!(outcome, CommandOutcome::SelfTest { motifs: 11 });
    let played: Vec<Motif> = rig.audible.cues().iter().map(|c| c.motif).collect();
    assert_eq!(played, Motif::SELF_TEST.to_vec());
    for motif in [
        Motif::Startup,
        Motif::EntryLong { severe: false },
        Motif::EntryLong { severe: true },
        Motif::EntryShort { severe: false },
        Motif::EntryShort { severe: true },
        Motif::ExitProfit,
        Motif::ExitLoss,
        Motif::Reset,
        Motif::Success,
        Motif::Error,
        Motif::ConnectionLost,
    ] {
        assert!(played.contains(&motif), "{motif:?} not played");
    }
}

#[tokio::test]
async fn test_added_network_leaves_access_point_mode() {
    let mut rig = rig(Settings::default());
    rig.monitor.tick(t0()).await;
    assert_eq!(rig.monitor.link().state(), ConnectivityState::AccessPointOnly);

    let outcome = rig
        .monitor
        .apply(Command::AddNetwork(NetworkProfile::new("cafe", "pw", 3, true)), t0() + secs(1))
        .unwrap();
    assert_eq!(outcome, CommandOutcome::NetworkSaved { ssid: "cafe".into() });
    assert_eq!(rig.monitor.link().state(), ConnectivityState::Disconnected);

    rig.monitor.tick(t0() + secs(2)).await;
    assert_eq!(rig.monitor.link().state(), ConnectivityState::Connecting);
    assert_eq!(rig.radio.log().attempts, vec!["cafe".to_string()]);
}

#[tokio::test]
async fn test_uncommitted_network_still_leaves_access_point_mode() {
    let mut rig = rig_with(Box::new(UncommittedStore::default()));
    rig.monitor.tick(t0()).await;
    assert_eq!(rig.monitor.link().state(), ConnectivityState::AccessPointOnly);

    let result = rig
        .monitor
        .apply(Command::AddNetwork(NetworkProfile::new("cafe", "pw", 3, true)), t0() + secs(1));
    assert!(matches!(result, Err(MonitorError::Store(StoreError::Io(_)))));
    assert_eq!(rig.monitor.store().settings().networks.len(), 1);
    assert_eq!(rig.monitor.link().state(), ConnectivityState::Disconnected);

    rig.monitor.tick(t0() + secs(2)).await;
    assert_eq!(rig.monitor.link().state(), ConnectivityState::Connecting);
    assert_eq!(rig.radio.log().attempts, vec!["cafe".to_string()]);

    rig.monitor.tick(t0() + secs(12)).await;
    assert_eq!(rig.monitor.link().state(), ConnectivityState::AccessPointPlusStation);
}

#[tokio::test]
async fn test_uncommitted_toggle_still_stops_access_point() {
    let mut rig = rig_with(Box::new(UncommittedStore::default()));
    rig.monitor.tick(t0()).await;
    assert_eq!(rig.monitor.link().state(), ConnectivityState::AccessPointOnly);

    let result = rig.monitor.apply(Command::ToggleAccessPoint, t0() + secs(1));
    assert!(result.is_err());
    assert!(!rig.monitor.store().settings().access_point_enabled);
    assert!(!rig.monitor.link().is_ap_active());

    rig.monitor.tick(t0() + secs(2)).await;
    assert_eq!(rig.monitor.link().state(), ConnectivityState::Disconnected);
}

#[tokio::test]
async fn test_rejected_network_leaves_link_alone() {
    let mut rig = rig_with(Box::new(UncommittedStore::default()));
    rig.monitor.tick(t0()).await;

    let result = rig.monitor.apply(Command::AddNetwork(NetworkProfile::new("", "pw", 3, true)), t0() + secs(1));
    assert!(matches!(result, Err(MonitorError::Store(StoreError::Invalid(_)))));
    assert_eq!(rig.monitor.link().state(), ConnectivityState::AccessPointOnly);
}

#[tokio::test]
async fn test_remove_network_reports_missing() {
    let mut rig = rig(station_only());
    let outcome = rig.monitor.apply(Command::RemoveNetwork("nowhere".into()), t0()).unwrap();
    assert_eq!(
        outcome,
        CommandOutcome::NetworkRemoved {
            ssid: "nowhere".into(),
            removed: false
        }
    );
}

#[tokio::test]
async fn test_empty_network_is_rejected() {
    let mut rig = rig(station_only());
    let result = rig.monitor.apply(Command::AddNetwork(NetworkProfile::new("", "pw", 3, true)), t0());
    assert!(result.is_err());
}

#[tokio::test]
async fn test_runtime_applies_commands_between_ticks() -> anyhow::Result<()> {
    let rig = rig(station_only());
    let clock = Arc::new(ManualClock::new(t0()));
    let (runtime, handle) = MonitorRuntime::new(rig.monitor, clock.clone(), Duration::from_millis(10));
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let task = tokio::spawn(runtime.run(async move {
        stop_rx.await.ok();
    }));

    let outcome = handle.send(Command::SetVolume(30)).await?;
    assert_eq!(outcome, CommandOutcome::Volume { volume: 30 });

    clock.advance(secs(1));
    handle.send(Command::ToggleAccessPoint).await?;
    assert_eq!(handle.status().volume, 30);

    stop_tx.send(()).ok();
    let monitor = task.await?;
    assert_eq!(monitor.store().settings().buzzer.volume, 30);
    assert!(monitor.store().settings().access_point_enabled);
    assert!(rig.audible.cues().iter().any(|c| c.motif == Motif::Startup));
    Ok(())
}
