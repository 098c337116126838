use std::collections::VecDeque;

use folio_core::alert::entity::AlertEvent;
use folio_core::portfolio::entity::TrackingMode;

/// Entries kept per mode.
pub const JOURNAL_CAPACITY: usize = 50;

/// # Summary
/// Bounded per-mode history of emitted alerts, newest last.
///
/// # Invariants
/// - Each mode holds at most `capacity` entries; the oldest is dropped first.
#[derive(Debug, Clone)]
pub struct AlertJournal {
    capacity: usize,
    entry: VecDeque<AlertEvent>,
    exit: VecDeque<AlertEvent>,
}

impl Default for AlertJournal {
    fn default() -> Self {
        Self::with_capacity(JOURNAL_CAPACITY)
    }
}

impl AlertJournal {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entry: VecDeque::with_capacity(capacity),
            exit: VecDeque::with_capacity(capacity),
        }
    }

    pub fn record(&mut self, event: &AlertEvent) {
        let capacity = self.capacity;
        let ring = self.ring_mut(event.mode);
        if ring.len() >= capacity {
            ring.pop_front();
        }
        if capacity > 0 {
            ring.push_back(event.clone());
        }
    }

    /// Up to `limit` newest entries of one mode, newest first.
    pub fn recent(&self, mode: TrackingMode, limit: usize) -> Vec<AlertEvent> {
        self.ring(mode).iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self, mode: TrackingMode) -> usize {
        self.ring(mode).len()
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_empty() && self.exit.is_empty()
    }

    fn ring(&self, mode: TrackingMode) -> &VecDeque<AlertEvent> {
        match mode {
            TrackingMode::Entry => &self.entry,
            TrackingMode::Exit => &self.exit,
        }
    }

    fn ring_mut(&mut self, mode: TrackingMode) -> &mut VecDeque<AlertEvent> {
        match mode {
            TrackingMode::Entry => &mut self.entry,
            TrackingMode::Exit => &mut self.exit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use folio_core::alert::entity::{AlertKind, Direction};

    fn event(mode: TrackingMode, n: usize) -> AlertEvent {
        AlertEvent {
            mode,
            kind: AlertKind::PriceMove,
            severe: false,
            direction: Direction::Profit,
            symbol: format!("S{n}"),
            price: 1.0,
            percent: 3.0,
            detail: String::new(),
            at: Utc::now(),
        }
    }

    #[test]
    fn test_journal_drops_oldest_per_mode() {
        let mut journal = AlertJournal::with_capacity(3);
        for n in 0..5 {
            journal.record(&event(TrackingMode::Exit, n));
        }
        journal.record(&event(TrackingMode::Entry, 99));

        assert_eq!(journal.len(TrackingMode::Exit), 3);
        assert_eq!(journal.len(TrackingMode::Entry), 1);
        let newest: Vec<String> = journal
            .recent(TrackingMode::Exit, 2)
            .into_iter()
            .map(|e| e.symbol)
            .collect();
        assert_eq!(newest, vec!["S4", "S3"]);
    }
}
