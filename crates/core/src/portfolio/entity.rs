use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Default bounded capacity of a snapshot.
pub const POSITION_CAPACITY: usize = 100;

/// # Summary
/// Which of the two independently tracked portfolios a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum TrackingMode {
    /// P/L tracking against entry price.
    Entry,
    /// Price-move tracking against the last observed price.
    Exit,
}

impl std::fmt::Display for TrackingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackingMode::Entry => f.write_str("entry"),
            TrackingMode::Exit => f.write_str("exit"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Side {
    Long,
    Short,
}

/// # Summary
/// Entry-mode alert memory of one position.
///
/// # Invariants
/// - `alerted` stays set until P/L rises above `alert_threshold + 2.0`.
/// - `last_alert_at` is the cooldown clock and survives the hysteresis reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertLatch {
    pub alerted: bool,
    pub severe: bool,
    pub last_alert_at: Option<DateTime<Utc>>,
    pub last_alert_price: Option<f64>,
    pub last_alert_percent: Option<f64>,
}

/// Exit-mode price-move memory of one position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExitTracker {
    /// Baseline price; `None` until the position has been observed once.
    pub last_price: Option<f64>,
    pub last_alert_at: Option<DateTime<Utc>>,
}

/// # Summary
/// One tracked holding plus its mutable alert memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: f64,
    pub entry_price: f64,
    pub current_price: f64,
    /// Unrealized P/L in percent, as reported by the provider.
    pub pnl_percent: f64,
    /// Unrealized P/L in quote currency.
    pub pnl_value: f64,
    pub side: Side,
    #[serde(default)]
    pub latch: AlertLatch,
    #[serde(default)]
    pub exit: ExitTracker,
}

impl Position {
    pub fn new(symbol: impl Into<String>, side: Side, quantity: f64, entry_price: f64, current_price: f64) -> Self {
        let pnl_percent = pnl_from_entry(side, entry_price, current_price).unwrap_or(0.0);
        let direction = match side {
            Side::Long => 1.0,
            Side::Short => -1.0,
        };
        Self {
            symbol: symbol.into(),
            quantity,
            entry_price,
            current_price,
            pnl_percent,
            pnl_value: (current_price - entry_price) * quantity * direction,
            side,
            latch: AlertLatch::default(),
            exit: ExitTracker::default(),
        }
    }

    pub fn is_long(&self) -> bool {
        self.side == Side::Long
    }

    /// P/L percent from entry price, sign-corrected for shorts.
    pub fn pnl_from_entry(&self) -> Option<f64> {
        pnl_from_entry(self.side, self.entry_price, self.current_price)
    }
}

fn pnl_from_entry(side: Side, entry: f64, current: f64) -> Option<f64> {
    if entry <= 0.0 {
        return None;
    }
    Some(match side {
        Side::Long => (current - entry) / entry * 100.0,
        Side::Short => (entry - current) / entry * 100.0,
    })
}

/// # Summary
/// Aggregate view of a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PortfolioSummary {
    pub total_investment: f64,
    pub total_current_value: f64,
    pub total_pnl: f64,
    pub total_pnl_percent: f64,
    pub total_positions: usize,
    pub long_positions: usize,
    pub short_positions: usize,
    pub winning_positions: usize,
    pub losing_positions: usize,
    /// Most negative position P/L percent, 0 when nothing is losing.
    pub max_drawdown: f64,
}

impl PortfolioSummary {
    /// # Summary
    /// Computes the aggregate from a position list.
    ///
    /// # Logic
    /// 1. value = sum of price x quantity, pnl = sum of position pnl.
    /// 2. investment = value - pnl; percent = pnl / investment x 100 when
    ///    investment is positive, else 0.
    /// 3. A position with P/L >= 0 counts as winning.
    pub fn derive(positions: &[Position]) -> Self {
        let mut summary = Self {
            total_positions: positions.len(),
            ..Self::default()
        };
        for pos in positions {
            summary.total_current_value += pos.current_price * pos.quantity;
            summary.total_pnl += pos.pnl_value;
            match pos.side {
                Side::Long => summary.long_positions += 1,
                Side::Short => summary.short_positions += 1,
            }
            if pos.pnl_percent >= 0.0 {
                summary.winning_positions += 1;
            } else {
                summary.losing_positions += 1;
            }
            if pos.pnl_percent < summary.max_drawdown {
                summary.max_drawdown = pos.pnl_percent;
            }
        }
        summary.total_investment = summary.total_current_value - summary.total_pnl;
        summary.total_pnl_percent = if summary.total_investment > 0.0 {
            summary.total_pnl / summary.total_investment * 100.0
        } else {
            0.0
        };
        summary
    }
}

/// # Summary
/// Bounded, ordered list of positions plus the aggregate summary.
///
/// # Invariants
/// - `positions.len() <= capacity`; the number of inputs that did not fit is
///   kept in `truncated`.
/// - The list length never changes after construction; callers only get
///   mutable access to the slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    positions: Vec<Position>,
    capacity: usize,
    truncated: usize,
    summary: PortfolioSummary,
}

impl PortfolioSnapshot {
    /// Empty snapshot with the given capacity.
    pub fn empty(capacity: usize) -> Self {
        Self {
            positions: Vec::new(),
            capacity,
            truncated: 0,
            summary: PortfolioSummary::default(),
        }
    }

    /// # Summary
    /// Builds a snapshot, truncating to `capacity` and deriving the summary
    /// from the retained positions.
    pub fn bounded(mut positions: Vec<Position>, capacity: usize) -> Self {
        let truncated = positions.len().saturating_sub(capacity);
        positions.truncate(capacity);
        let summary = PortfolioSummary::derive(&positions);
        Self {
            positions,
            capacity,
            truncated,
            summary,
        }
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut [Position] {
        &mut self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Input positions dropped because the snapshot was full.
    pub fn truncated(&self) -> usize {
        self.truncated
    }

    pub fn summary(&self) -> &PortfolioSummary {
        &self.summary
    }

    pub fn summary_mut(&mut self) -> &mut PortfolioSummary {
        &mut self.summary
    }

    /// Mean position P/L percent, `None` for an empty snapshot.
    pub fn mean_pnl_percent(&self) -> Option<f64> {
        if self.positions.is_empty() {
            return None;
        }
        let total: f64 = self.positions.iter().map(|p| p.pnl_percent).sum();
        let count = u32::try_from(self.positions.len()).map(f64::from).unwrap_or(f64::from(u32::MAX));
        Some(total / count)
    }

    /// # Summary
    /// Carries alert memory over from the snapshot this one replaces.
    ///
    /// # Logic
    /// Slot `i` inherits latch and exit tracker from `previous[i]` only when
    /// both hold the same symbol; every other slot keeps cleared memory.
    ///
    /// # Returns
    /// Number of slots that inherited memory.
    pub fn inherit_alert_memory(&mut self, previous: &PortfolioSnapshot) -> usize {
        let mut carried = 0;
        for (slot, old) in self.positions.iter_mut().zip(previous.positions.iter()) {
            if slot.symbol == old.symbol {
                slot.latch = old.latch.clone();
                slot.exit = old.exit.clone();
                carried += 1;
            }
        }
        carried
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long(symbol: &str, entry: f64, current: f64) -> Position {
        Position::new(symbol, Side::Long, 1.0, entry, current)
    }

    #[test]
    fn test_bounded_reports_truncation() {
        let positions: Vec<Position> = (0..7).map(|i| long(&format!("S{i}"), 10.0, 11.0)).collect();
        let snapshot = PortfolioSnapshot::bounded(positions, 5);

        assert_eq!(snapshot.len(), 5);
        assert_eq!(snapshot.truncated(), 2);
        assert_eq!(snapshot.summary().total_positions, 5);
    }

    #[test]
    fn test_summary_derivation() {
        let positions = vec![
            long("A", 100.0, 110.0),
            Position::new("B", Side::Short, 2.0, 50.0, 55.0),
        ];
        let summary = PortfolioSummary::derive(&positions);

        assert_eq!(summary.long_positions, 1);
        assert_eq!(summary.short_positions, 1);
        assert_eq!(summary.winning_positions, 1);
        assert_eq!(summary.losing_positions, 1);
        assert!((summary.total_current_value - 220.0).abs() < 1e-9);
        assert!((summary.total_pnl - 0.0).abs() < 1e-9);
        assert!((summary.max_drawdown + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_inherit_alert_memory_same_slot_only() {
        let mut old = PortfolioSnapshot::bounded(vec![long("BTC", 100.0, 94.0), long("ETH", 10.0, 9.0)], 10);
        old.positions_mut()[0].latch.alerted = true;
        old.positions_mut()[1].latch.alerted = true;

        let mut fresh = PortfolioSnapshot::bounded(vec![long("BTC", 100.0, 93.0), long("SOL", 1.0, 1.0)], 10);
        let carried = fresh.inherit_alert_memory(&old);

        assert_eq!(carried, 1);
        assert!(fresh.positions()[0].latch.alerted);
        assert!(!fresh.positions()[1].latch.alerted);
    }

    #[test]
    fn test_short_pnl_from_entry() {
        let pos = Position::new("X", Side::Short, 1.0, 100.0, 90.0);
        assert!((pos.pnl_from_entry().unwrap() - 10.0).abs() < 1e-9);
        let unpriced = Position::new("Y", Side::Long, 1.0, 0.0, 90.0);
        assert_eq!(unpriced.pnl_from_entry(), None);
    }
}
