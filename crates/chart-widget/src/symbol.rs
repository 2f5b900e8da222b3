//! Maps user-facing tickers and timeframes onto the charting widget's
//! venue-qualified symbol namespace and interval codes.

use analysis_core::Timeframe;

const INDEX_VENUE: &str = "SP";
const CRYPTO_VENUE: &str = "COINBASE";
const USDT_VENUE: &str = "BINANCE";

/// Quote currencies that mark a ticker as a crypto pair (e.g. ETHUSD, XRPUSDT).
const CRYPTO_SUFFIXES: &[&str] = &["USDT", "USD", "BTC", "ETH"];

/// Convert an asset ticker to the widget's symbol format.
///
/// e.g. `I:SPX` -> `SP:SPX`, `BTC-USD` -> `COINBASE:BTCUSD`,
/// `XRPUSDT` -> `BINANCE:XRPUSDT`. Plain equity tickers pass through uppercased.
pub fn normalize_symbol(asset: &str) -> String {
    let upper = asset.to_uppercase();

    if upper == "SPX" || upper == "^GSPC" {
        return format!("{}:SPX", INDEX_VENUE);
    }

    if let Some(rest) = upper.strip_prefix("I:") {
        return format!("{}:{}", INDEX_VENUE, rest);
    }

    if let Some(rest) = upper.strip_prefix("X:") {
        return format!("{}:{}", CRYPTO_VENUE, rest.replace('-', ""));
    }

    if upper.contains('-') {
        return format!("{}:{}", CRYPTO_VENUE, upper.replace('-', ""));
    }

    let is_crypto_pair = CRYPTO_SUFFIXES
        .iter()
        .any(|s| upper.ends_with(s) && upper.len() > s.len());
    if is_crypto_pair {
        if upper.ends_with("USDT") {
            return format!("{}:{}", USDT_VENUE, upper);
        }
        return format!("{}:{}", CRYPTO_VENUE, upper);
    }

    upper
}

/// Convert a timeframe to the widget's interval code.
pub fn normalize_interval(timeframe: Timeframe) -> &'static str {
    match timeframe {
        Timeframe::Minute5 => "5",
        Timeframe::Minute15 => "15",
        Timeframe::Hour1 => "60",
        Timeframe::Hour4 => "240",
        Timeframe::Day1 => "D",
        Timeframe::Week1 => "W",
    }
}

/// Like [`normalize_interval`] for a free-form label; unknown labels fall back to daily.
pub fn normalize_interval_label(label: &str) -> &'static str {
    label
        .parse::<Timeframe>()
        .map(normalize_interval)
        .unwrap_or("D")
}
