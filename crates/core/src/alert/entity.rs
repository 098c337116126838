use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::portfolio::entity::TrackingMode;

/// Subject used by aggregate portfolio alerts.
pub const PORTFOLIO_SUBJECT: &str = "PORTFOLIO";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum AlertKind {
    /// A single entry-mode position crossed its loss threshold.
    Position,
    /// The aggregate entry-mode P/L crossed the portfolio threshold.
    Portfolio,
    /// An exit-mode position moved by at least the configured percent.
    PriceMove,
}

/// # Summary
/// Typed direction carried by every alert.
///
/// # Invariants
/// - Entry-mode alerts carry `Long` or `Short` (position side).
/// - Exit-mode alerts carry `Profit` (price rose) or `Loss` (price fell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Direction {
    Long,
    Short,
    Profit,
    Loss,
}

impl Direction {
    /// Whether the direction reads as favourable (long / profit).
    pub fn is_favourable(&self) -> bool {
        matches!(self, Direction::Long | Direction::Profit)
    }
}

/// # Summary
/// One alert produced by an evaluation pass.
///
/// # Invariants
/// - `symbol` is the shortened display symbol, or `PORTFOLIO`.
/// - `percent` is the value that crossed the threshold: position or aggregate
///   P/L for entry mode, move magnitude for exit mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AlertEvent {
    pub mode: TrackingMode,
    pub kind: AlertKind,
    pub severe: bool,
    pub direction: Direction,
    pub symbol: String,
    pub price: f64,
    pub percent: f64,
    pub detail: String,
    pub at: DateTime<Utc>,
}

impl AlertEvent {
    /// Display title of the alert.
    pub fn title(&self) -> &'static str {
        match (self.kind, self.severe) {
            (AlertKind::Position, true) => "SEVERE ALERT",
            (AlertKind::Position, false) => "POSITION ALERT",
            (AlertKind::Portfolio, _) => "PORTFOLIO ALERT",
            (AlertKind::PriceMove, _) => "PRICE ALERT",
        }
    }

    /// Key used to collapse repeated alerts about the same subject.
    pub fn subject_key(&self) -> (TrackingMode, AlertKind, &str) {
        (self.mode, self.kind, self.symbol.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: AlertKind, severe: bool) -> AlertEvent {
        AlertEvent {
            mode: TrackingMode::Entry,
            kind,
            severe,
            direction: Direction::Long,
            symbol: "BTC".to_string(),
            price: 1.0,
            percent: -6.0,
            detail: String::new(),
            at: Utc::now(),
        }
    }

    #[test]
    fn test_titles() {
        assert_eq!(event(AlertKind::Position, true).title(), "SEVERE ALERT");
        assert_eq!(event(AlertKind::Position, false).title(), "POSITION ALERT");
        assert_eq!(event(AlertKind::Portfolio, true).title(), "PORTFOLIO ALERT");
        assert_eq!(event(AlertKind::PriceMove, false).title(), "PRICE ALERT");
    }
}
