use chrono::{DateTime, TimeDelta, Utc};
use std::sync::RwLock;

/// # Summary
/// Source of "now" for the monitor loop.
/// Every component takes `now` as a parameter; only the loop driver asks a
/// `Clock`, so tests can substitute simulated time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock of the host.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// # Summary
/// Hand-driven clock for tests and replays.
///
/// # Invariants
/// - Time only moves when `set` or `advance` is called.
pub struct ManualClock {
    current: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: RwLock::new(start),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = at;
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }
}

/// # Summary
/// Run-at-most-once-per-interval predicate.
///
/// # Logic
/// `should_run` answers true on the first call, then only once `interval`
/// has elapsed since the last accepted run. `force` makes the next call
/// answer true regardless of elapsed time.
#[derive(Debug, Clone)]
pub struct IntervalGate {
    interval: TimeDelta,
    last_run: Option<DateTime<Utc>>,
}

impl IntervalGate {
    pub fn new(interval: TimeDelta) -> Self {
        Self {
            interval,
            last_run: None,
        }
    }

    /// Pure check, does not consume the slot.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_run {
            None => true,
            Some(last) => now - last >= self.interval,
        }
    }

    /// Checks and, when due, records `now` as the last run.
    pub fn should_run(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_due(now) {
            self.last_run = Some(now);
            true
        } else {
            false
        }
    }

    pub fn force(&mut self) {
        self.last_run = None;
    }

    pub fn last_run(&self) -> Option<DateTime<Utc>> {
        self.last_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_gate_runs_once_per_interval() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut gate = IntervalGate::new(TimeDelta::seconds(10));

        assert!(gate.should_run(t0));
        assert!(!gate.should_run(t0 + TimeDelta::seconds(3)));
        assert!(!gate.should_run(t0 + TimeDelta::milliseconds(9_999)));
        assert!(gate.should_run(t0 + TimeDelta::seconds(10)));
    }

    #[test]
    fn test_gate_force() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut gate = IntervalGate::new(TimeDelta::seconds(15));
        assert!(gate.should_run(t0));
        gate.force();
        assert!(gate.should_run(t0 + TimeDelta::seconds(1)));
    }

    #[test]
    fn test_manual_clock_advance() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let clock = ManualClock::new(t0);
        clock.advance(TimeDelta::seconds(90));
        assert_eq!(clock.now(), t0 + TimeDelta::seconds(90));
    }
}
