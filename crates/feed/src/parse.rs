use folio_core::portfolio::entity::{PortfolioSnapshot, Position, Side};
use folio_core::portfolio::error::FeedError;
use serde::Deserialize;

/// # Summary
/// Top-level body of `GET /api/device/portfolio/{user}`.
///
/// # Invariants
/// - `success: false` carries `error` and no portfolio.
#[derive(Deserialize, Debug)]
struct PortfolioResponse {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    portfolio: Option<Vec<WirePosition>>,
    #[serde(default)]
    summary: Option<WireSummary>,
}

fn default_success() -> bool {
    true
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct WirePosition {
    symbol: Option<String>,
    pnl_percent: Option<f64>,
    current_price: Option<f64>,
    entry_price: Option<f64>,
    quantity: Option<f64>,
    pnl: Option<f64>,
    position: Option<String>,
    position_side: Option<String>,
    side: Option<String>,
}

impl WirePosition {
    /// The first side hint present decides: `position`, then `position_side`
    /// (both "short"), then `side` ("sell"). No hint means long.
    fn side(&self) -> Side {
        let short = if let Some(position) = &self.position {
            position.eq_ignore_ascii_case("short")
        } else if let Some(position_side) = &self.position_side {
            position_side.eq_ignore_ascii_case("short")
        } else if let Some(side) = &self.side {
            side.eq_ignore_ascii_case("sell")
        } else {
            false
        };
        if short { Side::Short } else { Side::Long }
    }

    fn into_position(self) -> Position {
        let side = self.side();
        Position {
            symbol: self.symbol.unwrap_or_else(|| "UNKNOWN".to_string()),
            quantity: self.quantity.unwrap_or(0.0),
            entry_price: self.entry_price.unwrap_or(0.0),
            current_price: self.current_price.unwrap_or(0.0),
            pnl_percent: self.pnl_percent.unwrap_or(0.0),
            pnl_value: self.pnl.unwrap_or(0.0),
            side,
            latch: Default::default(),
            exit: Default::default(),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct WireSummary {
    total_investment: Option<f64>,
    total_current_value: Option<f64>,
    total_pnl: Option<f64>,
    winning_positions: Option<usize>,
    losing_positions: Option<usize>,
    max_drawdown: Option<f64>,
}

/// # Summary
/// Decodes a portfolio payload into a bounded snapshot.
///
/// # Logic
/// 1. `success: false` is a platform error carrying the server message.
/// 2. A body without `portfolio` is a parse error, never an empty snapshot.
/// 3. Positions beyond `capacity` are dropped and counted.
/// 4. The summary is derived from the retained positions, then any field the
///    server reports overrides it. With a positive investment the total P/L
///    percent is recomputed as `(value - investment) / investment x 100`.
///
/// # Arguments
/// * `body` - raw response body.
/// * `capacity` - maximum number of positions kept.
///
/// # Returns
/// The snapshot with fresh alert memory, or the decode failure.
pub fn parse_snapshot(body: &[u8], capacity: usize) -> Result<PortfolioSnapshot, FeedError> {
    let response: PortfolioResponse =
        serde_json::from_slice(body).map_err(|e| FeedError::Parse(e.to_string()))?;

    if !response.success {
        return Err(FeedError::Platform(
            response.error.unwrap_or_else(|| "request rejected".to_string()),
        ));
    }

    let Some(items) = response.portfolio else {
        return Err(FeedError::Parse("missing 'portfolio' field".to_string()));
    };

    let positions = items.into_iter().map(WirePosition::into_position).collect();
    let mut snapshot = PortfolioSnapshot::bounded(positions, capacity);

    if let Some(reported) = response.summary {
        let summary = snapshot.summary_mut();
        if let Some(v) = reported.total_investment {
            summary.total_investment = v;
        }
        if let Some(v) = reported.total_current_value {
            summary.total_current_value = v;
        }
        if let Some(v) = reported.total_pnl {
            summary.total_pnl = v;
        }
        if summary.total_investment > 0.0 {
            summary.total_pnl_percent = (summary.total_current_value - summary.total_investment)
                / summary.total_investment
                * 100.0;
        }
        if let Some(v) = reported.winning_positions {
            summary.winning_positions = v;
        }
        if let Some(v) = reported.losing_positions {
            summary.losing_positions = v;
        }
        if let Some(v) = reported.max_drawdown {
            summary.max_drawdown = v;
        }
    }

    Ok(snapshot)
}
