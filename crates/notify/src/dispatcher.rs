use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use folio_core::alert::entity::AlertEvent;
use folio_core::common::time::IntervalGate;
use folio_core::common::format_price;
use folio_core::config::Timings;
use folio_core::link::entity::LinkEvent;
use folio_core::notify::entity::{AlertView, DashboardView, IndicatorColor, Lamp, LampColor, Motif, ViewModel};
use folio_core::notify::port::{AudibleChannel, IndicatorChannel, VisualChannel};
use folio_core::portfolio::entity::TrackingMode;
use folio_core::settings::entity::Settings;
use tracing::{debug, info};

use crate::tone::{select_motif, shape};

/// Alerts waiting behind the active slot.
pub const PENDING_CAPACITY: usize = 4;

/// The three output channels, shared with the rest of the process.
#[derive(Clone)]
pub struct Outputs {
    pub audible: Arc<dyn AudibleChannel>,
    pub indicator: Arc<dyn IndicatorChannel>,
    pub visual: Arc<dyn VisualChannel>,
}

/// Alert currently owning the display.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveAlert {
    pub event: AlertEvent,
    pub started: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl ActiveAlert {
    /// Whole seconds left, rounded up.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        let ms = (self.until - now).num_milliseconds().max(0);
        (ms + 999) / 1000
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IndicatorSlot {
    color: IndicatorColor,
    since: DateTime<Utc>,
}

/// Facts about the rest of the system the dispatcher needs each refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    pub dashboard: DashboardView,
    pub online: bool,
    pub ap_active: bool,
    /// Mean entry-mode P/L percent, `None` without data.
    pub mean_entry_pnl: Option<f64>,
}

/// # Summary
/// Decides what the outputs show and issues idempotent channel commands.
///
/// # Invariants
/// - At most one alert is active; arrivals with severity at least that of the
///   active one preempt it, the rest wait in a bounded pending queue.
/// - Indicator, lamp, view and backlight commands are only sent when the
///   commanded value changes.
/// - Indicator hold and alert display are independent timers.
pub struct NotificationDispatcher {
    outputs: Outputs,
    alert_display: TimeDelta,
    indicator_hold: TimeDelta,
    active: Option<ActiveAlert>,
    pending: VecDeque<AlertEvent>,
    indicators: [Option<IndicatorSlot>; 2],
    sent_indicators: [Option<(Option<IndicatorColor>, bool)>; 2],
    blink: IntervalGate,
    blink_lit: bool,
    sent_lamps: [Option<LampColor>; 2],
    dashboard_gate: IntervalGate,
    last_view: Option<ViewModel>,
    message: Option<(String, String, DateTime<Utc>)>,
    connection_lost_since: Option<DateTime<Utc>>,
    last_activity: DateTime<Utc>,
    sent_backlight: Option<u8>,
}

fn mode_index(mode: TrackingMode) -> usize {
    match mode {
        TrackingMode::Entry => 0,
        TrackingMode::Exit => 1,
    }
}

const MODES: [TrackingMode; 2] = [TrackingMode::Entry, TrackingMode::Exit];

impl NotificationDispatcher {
    pub fn new(outputs: Outputs, timings: &Timings, now: DateTime<Utc>) -> Self {
        Self {
            outputs,
            alert_display: timings.alert_display(),
            indicator_hold: timings.indicator_hold(),
            active: None,
            pending: VecDeque::with_capacity(PENDING_CAPACITY),
            indicators: [None; 2],
            sent_indicators: [None; 2],
            blink: IntervalGate::new(timings.blink()),
            blink_lit: false,
            sent_lamps: [None; 2],
            dashboard_gate: IntervalGate::new(timings.dashboard_redraw()),
            last_view: None,
            message: None,
            connection_lost_since: None,
            last_activity: now,
            sent_backlight: None,
        }
    }

    pub fn active(&self) -> Option<&ActiveAlert> {
        self.active.as_ref()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// # Summary
    /// Offers an alert to the slot.
    ///
    /// # Logic
    /// 1. Drop pending entries older than the indicator hold.
    /// 2. Empty slot, or severity at least the active one: activate now; the
    ///    preempted alert is discarded (it is already journaled).
    /// 3. Otherwise queue it, replacing a pending entry about the same
    ///    subject and dropping the oldest when full.
    ///
    /// # Returns
    /// Whether the alert became active.
    pub fn dispatch(&mut self, event: AlertEvent, settings: &Settings, now: DateTime<Utc>) -> bool {
        self.expire_pending(now);
        let preempts = match &self.active {
            None => true,
            Some(active) => event.severe >= active.event.severe,
        };

        if preempts {
            if let Some(previous) = &self.active {
                debug!(previous = %previous.event.symbol, next = %event.symbol, "Alert slot preempted");
            }
            self.activate(event, settings, now);
            return true;
        }

        self.pending.retain(|p| p.subject_key() != event.subject_key());
        if self.pending.len() >= PENDING_CAPACITY {
            self.pending.pop_front();
        }
        debug!(symbol = %event.symbol, queued = self.pending.len() + 1, "Alert queued behind active slot");
        self.pending.push_back(event);
        false
    }

    fn activate(&mut self, event: AlertEvent, settings: &Settings, now: DateTime<Utc>) {
        info!(
            mode = %event.mode,
            symbol = %event.symbol,
            severe = event.severe,
            "Alert activated: {}",
            event.title()
        );
        self.play(select_motif(event.mode, event.direction, event.severe), settings);
        if settings.indicators.enabled {
            let color = if event.direction.is_favourable() {
                IndicatorColor::Green
            } else {
                IndicatorColor::Red
            };
            self.indicators[mode_index(event.mode)] = Some(IndicatorSlot { color, since: now });
        }
        self.active = Some(ActiveAlert {
            event,
            started: now,
            until: now + self.alert_display,
        });
        self.last_activity = now;
    }

    /// Plays a motif through the buzzer settings; muted motifs are dropped.
    pub fn play(&self, motif: Motif, settings: &Settings) {
        match shape(motif, &settings.buzzer) {
            Some(cue) => self.outputs.audible.play(&cue),
            None => debug!(?motif, "Motif muted"),
        }
    }

    /// # Summary
    /// Reacts to a connectivity transition.
    ///
    /// # Logic
    /// Station loss plays the connection-lost motif and, with details enabled,
    /// switches the display to the connection-lost view until the link is back.
    pub fn on_link_event(&mut self, event: &LinkEvent, settings: &Settings, now: DateTime<Utc>) {
        match event {
            LinkEvent::StationLost { at, .. } => {
                self.play(Motif::ConnectionLost, settings);
                if settings.display.show_details {
                    self.connection_lost_since = Some(*at);
                }
                self.last_activity = now;
            }
            LinkEvent::Associated { .. } | LinkEvent::StationRestored { .. } => {
                if self.connection_lost_since.take().is_some() {
                    self.last_activity = now;
                }
            }
            LinkEvent::AttemptStarted { .. } | LinkEvent::AttemptTimedOut { .. } | LinkEvent::AccessPointStarted => {}
        }
    }

    /// Shows a transient message screen for the alert display duration.
    pub fn show_message(&mut self, title: impl Into<String>, body: impl Into<String>, now: DateTime<Utc>) {
        self.message = Some((title.into(), body.into(), now + self.alert_display));
        self.last_activity = now;
    }

    /// Marks user activity, waking the backlight.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }

    /// Drops the slot, the queue and every indicator.
    pub fn clear_alerts(&mut self) {
        self.active = None;
        self.pending.clear();
        self.indicators = [None; 2];
    }

    /// Lets the next refresh redraw the dashboard regardless of the redraw gate.
    pub fn invalidate_view(&mut self) {
        self.dashboard_gate.force();
        self.last_view = None;
    }

    /// # Summary
    /// Per-tick output refresh.
    ///
    /// # Logic
    /// 1. Expire the slot and promote the best pending alert.
    /// 2. Expire indicators past their hold, push changed indicator states,
    ///    toggle the shared blink while any indicator is active.
    /// 3. Update the two status lamps.
    /// 4. Render the current view if it changed.
    /// 5. Update the backlight.
    pub fn refresh(&mut self, presentation: &Presentation, settings: &Settings, now: DateTime<Utc>) {
        self.expire_slot(settings, now);
        self.refresh_indicators(settings, now);
        self.refresh_lamps(presentation, settings);
        self.refresh_view(presentation, settings, now);
        self.refresh_backlight(settings, now);
    }

    fn expire_pending(&mut self, now: DateTime<Utc>) {
        let hold = self.indicator_hold;
        self.pending.retain(|p| now - p.at <= hold);
    }

    fn expire_slot(&mut self, settings: &Settings, now: DateTime<Utc>) {
        if self.active.as_ref().is_some_and(|a| now >= a.until) {
            self.active = None;
        }
        if self.active.is_some() {
            return;
        }
        self.expire_pending(now);
        let best = self
            .pending
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| a.severe.cmp(&b.severe).then(a.at.cmp(&b.at)).then(ia.cmp(ib)))
            .map(|(i, _)| i);
        if let Some(event) = best.and_then(|i| self.pending.remove(i)) {
            self.activate(event, settings, now);
        }
    }

    fn refresh_indicators(&mut self, settings: &Settings, now: DateTime<Utc>) {
        for mode in MODES {
            let idx = mode_index(mode);
            if self.indicators[idx].is_some_and(|slot| now - slot.since >= self.indicator_hold)
                || !settings.indicators.enabled
            {
                self.indicators[idx] = None;
            }
            let wanted = match self.indicators[idx] {
                Some(slot) => (Some(slot.color), true),
                None => (None, false),
            };
            if self.sent_indicators[idx] != Some(wanted) {
                self.outputs.indicator.set_state(mode, wanted.0, wanted.1);
                self.sent_indicators[idx] = Some(wanted);
            }
        }

        if self.indicators.iter().any(Option::is_some) {
            if self.blink.should_run(now) {
                self.blink_lit = !self.blink_lit;
                self.outputs.indicator.blink_phase(self.blink_lit);
            }
        } else {
            self.blink_lit = false;
        }
    }

    fn refresh_lamps(&mut self, presentation: &Presentation, settings: &Settings) {
        let enabled = settings.indicators.enabled;
        let link = if !(enabled && settings.indicators.link_lamp) {
            LampColor::Off
        } else if presentation.online {
            LampColor::Green
        } else if presentation.ap_active {
            LampColor::Blue
        } else {
            LampColor::Red
        };
        let portfolio = if !(enabled && settings.indicators.portfolio_lamp) {
            LampColor::Off
        } else {
            portfolio_lamp(presentation.mean_entry_pnl)
        };

        for (lamp, color) in [(Lamp::Link, link), (Lamp::Portfolio, portfolio)] {
            let idx = match lamp {
                Lamp::Link => 0,
                Lamp::Portfolio => 1,
            };
            if self.sent_lamps[idx] != Some(color) {
                self.outputs.indicator.set_lamp(lamp, color);
                self.sent_lamps[idx] = Some(color);
            }
        }
    }

    fn current_view(&mut self, presentation: &Presentation, settings: &Settings, now: DateTime<Utc>) -> ViewModel {
        if let Some(active) = &self.active {
            let event = &active.event;
            return ViewModel::Alert(AlertView {
                title: event.title().to_string(),
                symbol: event.symbol.clone(),
                price: format_price(event.price),
                message: event.detail.clone(),
                severe: event.severe,
                remaining_secs: active.remaining_secs(now),
            });
        }
        if self.message.as_ref().is_some_and(|(_, _, until)| now >= *until) {
            self.message = None;
        }
        if let Some((title, body, _)) = &self.message {
            return ViewModel::Message {
                title: title.clone(),
                body: body.clone(),
            };
        }
        if let Some(since) = self.connection_lost_since.filter(|_| settings.display.show_details) {
            return ViewModel::ConnectionLost {
                lost_secs: (now - since).num_seconds().max(0),
            };
        }
        ViewModel::Dashboard(presentation.dashboard.clone())
    }

    fn refresh_view(&mut self, presentation: &Presentation, settings: &Settings, now: DateTime<Utc>) {
        let view = self.current_view(presentation, settings, now);
        if self.last_view.as_ref() == Some(&view) {
            return;
        }
        let was_dashboard = matches!(self.last_view, Some(ViewModel::Dashboard(_)));
        if matches!(view, ViewModel::Dashboard(_)) {
            if was_dashboard && !self.dashboard_gate.should_run(now) {
                return;
            }
            if !was_dashboard {
                self.dashboard_gate.force();
                self.dashboard_gate.should_run(now);
            }
        }
        self.outputs.visual.render(&view);
        self.last_view = Some(view);
    }

    fn refresh_backlight(&mut self, settings: &Settings, now: DateTime<Utc>) {
        let display = &settings.display;
        let idle = display.timeout_secs > 0
            && self.active.is_none()
            && now - self.last_activity >= TimeDelta::seconds(i64::from(display.timeout_secs));
        let level = if display.brightness == 0 || idle {
            0
        } else {
            display.brightness.min(100)
        };
        if self.sent_backlight != Some(level) {
            debug!(level, "Backlight");
            self.outputs.visual.set_backlight(level);
            self.sent_backlight = Some(level);
        }
    }
}

/// # Summary
/// Portfolio lamp color from the mean entry-mode P/L.
///
/// # Logic
/// >= 5 bright green, >= 0 green, >= -5 yellow, else red; no data is off.
pub fn portfolio_lamp(mean_pnl: Option<f64>) -> LampColor {
    match mean_pnl {
        None => LampColor::Off,
        Some(p) if p >= 5.0 => LampColor::BrightGreen,
        Some(p) if p >= 0.0 => LampColor::Green,
        Some(p) if p >= -5.0 => LampColor::Yellow,
        Some(_) => LampColor::Red,
    }
}
