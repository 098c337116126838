//! Formatting helpers shared by the alert engine and the display views.

pub mod time;

/// # Summary
/// Compact ticker used on the display and in alert subjects.
///
/// # Logic
/// 1. Strip one trailing quote-currency marker (`USDT`, `_USDT`, `PERP`).
/// 2. Cap the result at 8 characters.
pub fn short_symbol(symbol: &str) -> String {
    let trimmed = symbol
        .strip_suffix("_USDT")
        .or_else(|| symbol.strip_suffix("USDT"))
        .or_else(|| symbol.strip_suffix("PERP"))
        .unwrap_or(symbol);
    trimmed.chars().take(8).collect()
}

/// Signed percent with two decimals: `+3.00%`, `-6.00%`, `0.00%`.
pub fn format_percent(percent: f64) -> String {
    if percent > 0.0 {
        format!("+{:.2}%", percent)
    } else if percent < 0.0 {
        format!("{:.2}%", percent)
    } else {
        "0.00%".to_string()
    }
}

/// Price with precision chosen by magnitude.
pub fn format_price(price: f64) -> String {
    if price <= 0.0 {
        return "0.00".to_string();
    }
    let decimals = if price >= 1000.0 {
        2
    } else if price >= 1.0 {
        4
    } else if price >= 0.01 {
        6
    } else if price >= 0.0001 {
        8
    } else {
        10
    };
    format!("{:.*}", decimals, price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_symbol() {
        assert_eq!(short_symbol("BTCUSDT"), "BTC");
        assert_eq!(short_symbol("ETH_USDT"), "ETH");
        assert_eq!(short_symbol("SOLPERP"), "SOL");
        assert_eq!(short_symbol("VERYLONGTOKENUSDT"), "VERYLONG");
        assert_eq!(short_symbol("AAPL"), "AAPL");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(3.0), "+3.00%");
        assert_eq!(format_percent(-6.0), "-6.00%");
        assert_eq!(format_percent(0.0), "0.00%");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(64250.5), "64250.50");
        assert_eq!(format_price(94.0), "94.0000");
        assert_eq!(format_price(0.5), "0.500000");
        assert_eq!(format_price(0.0), "0.00");
    }
}
