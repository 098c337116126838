use chrono::{DateTime, TimeDelta, Utc};
use folio_core::alert::entity::{AlertEvent, AlertKind, Direction, PORTFOLIO_SUBJECT};
use folio_core::common::{format_percent, short_symbol};
use folio_core::portfolio::entity::{AlertLatch, PortfolioSnapshot, Side, TrackingMode};
use folio_core::settings::entity::AlertSettings;
use tracing::{debug, info};

/// Width of the band above `alert_threshold` a position must clear before its
/// latch resets.
pub const HYSTERESIS_BAND: f64 = 2.0;
/// Severe portfolio alerts fire at this multiple of the portfolio threshold.
pub const PORTFOLIO_SEVERE_FACTOR: f64 = 1.5;

/// # Summary
/// Entry-mode evaluation pass.
///
/// # Logic
/// 1. Empty snapshot: nothing to do.
/// 2. Aggregate P/L at or below the portfolio threshold emits a
///    `Portfolio` alert (severe at 1.5x), every pass the condition holds.
/// 3. Per position, in order:
///    - latched and P/L above `alert_threshold + 2`: clear the latch, keep the
///      cooldown clock;
///    - inside the cooldown window: skip;
///    - not latched and P/L at or below `alert_threshold`: emit a `Position`
///      alert and latch.
///
/// # Arguments
/// * `snapshot` - entry-mode snapshot; latches are mutated in place.
/// * `rules` - thresholds from the settings record.
/// * `now` - evaluation time, stamped on events and latches.
///
/// # Returns
/// The events emitted by this pass, portfolio alert first.
pub fn evaluate_entry(snapshot: &mut PortfolioSnapshot, rules: &AlertSettings, now: DateTime<Utc>) -> Vec<AlertEvent> {
    let mut events = Vec::new();
    if snapshot.is_empty() {
        return events;
    }

    let summary = snapshot.summary();
    let aggregate = summary.total_pnl_percent;
    if aggregate <= rules.portfolio_alert_threshold {
        events.push(emit(AlertEvent {
            mode: TrackingMode::Entry,
            kind: AlertKind::Portfolio,
            severe: aggregate <= rules.portfolio_alert_threshold * PORTFOLIO_SEVERE_FACTOR,
            direction: Direction::Long,
            symbol: PORTFOLIO_SUBJECT.to_string(),
            price: summary.total_current_value,
            percent: aggregate,
            detail: format!("Total P/L: {}", format_percent(aggregate)),
            at: now,
        }));
    }

    let cooldown = TimeDelta::seconds(i64::from(rules.cooldown_secs));
    let reset_above = rules.alert_threshold + HYSTERESIS_BAND;

    for pos in snapshot.positions_mut() {
        let change = pos.pnl_percent;

        if pos.latch.alerted && change > reset_above {
            debug!(symbol = %pos.symbol, change, "Latch auto-reset");
            pos.latch = AlertLatch {
                last_alert_at: pos.latch.last_alert_at,
                ..AlertLatch::default()
            };
            continue;
        }

        if pos.latch.last_alert_at.is_some_and(|last| now - last < cooldown) {
            continue;
        }

        if !pos.latch.alerted && change <= rules.alert_threshold {
            let severe = change <= rules.severe_alert_threshold;
            pos.latch = AlertLatch {
                alerted: true,
                severe,
                last_alert_at: Some(now),
                last_alert_price: Some(pos.current_price),
                last_alert_percent: Some(change),
            };
            events.push(emit(AlertEvent {
                mode: TrackingMode::Entry,
                kind: AlertKind::Position,
                severe,
                direction: match pos.side {
                    Side::Long => Direction::Long,
                    Side::Short => Direction::Short,
                },
                symbol: short_symbol(&pos.symbol),
                price: pos.current_price,
                percent: change,
                detail: format!("P/L: {}", format_percent(change)),
                at: now,
            }));
        }
    }
    events
}

/// # Summary
/// Exit-mode evaluation pass.
///
/// # Logic
/// 1. Disabled exit alerts: nothing to do.
/// 2. Unseeded (or non-positive) baseline: seed with the current price, skip.
/// 3. Move magnitude `|cur - last| / last x 100` at or above the configured
///    percent emits a `PriceMove` alert (`Profit` when the price rose) and
///    moves the baseline to the current price.
///
/// # Returns
/// The events emitted by this pass.
pub fn evaluate_exit(snapshot: &mut PortfolioSnapshot, rules: &AlertSettings, now: DateTime<Utc>) -> Vec<AlertEvent> {
    let mut events = Vec::new();
    if !rules.exit_alerts_enabled {
        return events;
    }

    for pos in snapshot.positions_mut() {
        let current = pos.current_price;
        if current <= 0.0 {
            continue;
        }
        let last = match pos.exit.last_price {
            Some(last) if last > 0.0 => last,
            _ => {
                pos.exit.last_price = Some(current);
                continue;
            }
        };

        let change = (current - last) / last * 100.0;
        if change.abs() < rules.exit_alert_percent {
            continue;
        }

        let direction = if change > 0.0 { Direction::Profit } else { Direction::Loss };
        let detail = match pos.pnl_from_entry() {
            Some(total) => format!("Change: {:.1}% | Total: {}", change.abs(), format_percent(total)),
            None => format!("Change: {:.1}%", change.abs()),
        };
        pos.exit.last_price = Some(current);
        pos.exit.last_alert_at = Some(now);

        events.push(emit(AlertEvent {
            mode: TrackingMode::Exit,
            kind: AlertKind::PriceMove,
            severe: false,
            direction,
            symbol: short_symbol(&pos.symbol),
            price: current,
            percent: change,
            detail,
            at: now,
        }));
    }
    events
}

/// # Summary
/// Operator reset of every alert memory.
///
/// # Logic
/// Entry latches are cleared completely, cooldown clock included. Exit
/// baselines are reseeded to the current price.
pub fn reset_all(entry: &mut PortfolioSnapshot, exit: &mut PortfolioSnapshot) {
    for pos in entry.positions_mut() {
        pos.latch = AlertLatch::default();
    }
    for pos in exit.positions_mut() {
        pos.exit.last_price = (pos.current_price > 0.0).then_some(pos.current_price);
        pos.exit.last_alert_at = None;
    }
    info!(entry = entry.len(), exit = exit.len(), "All alert latches reset");
}

fn emit(event: AlertEvent) -> AlertEvent {
    info!(
        mode = %event.mode,
        kind = ?event.kind,
        symbol = %event.symbol,
        severe = event.severe,
        direction = ?event.direction,
        price = event.price,
        percent = event.percent,
        "{}: {}",
        event.title(),
        event.detail
    );
    event
}
