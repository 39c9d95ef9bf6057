//! Coin symbol knowledge: fiat currencies and market-pair splitting.

/// Reference currency used when the caller does not name one.
pub const DEFAULT_FIAT: &str = "USD";

const FIAT_COINS: &[&str] = &["USD", "EUR", "GBP", "JPY", "AUD", "CAD", "CHF"];

/// Quote currencies recognized as market-pair suffixes, longest first so
/// that e.g. "BTCUSDT" splits on "USDT" and not on the 3-character fallback.
const QUOTE_CURRENCIES: &[&str] = &[
    "USDT", "USDC", "BUSD", "TUSD", "BTC", "ETH", "BNB", "USD", "EUR",
];

pub fn is_fiat(symbol: &str) -> bool {
    FIAT_COINS.contains(&symbol)
}

/// Split a concatenated market pair like "ETHBTC" into (base, quote).
///
/// Tries the known quote-currency suffixes first, then falls back to
/// treating the last 3 characters as the quote. Returns `None` when no
/// non-empty split exists. Symbols outside the known quote list with
/// unusual code lengths cannot be split reliably; callers must treat a
/// `None` as a malformed record, not guess.
pub fn split_market_pair(symbol: &str) -> Option<(String, String)> {
    for quote in QUOTE_CURRENCIES {
        if symbol.len() > quote.len() && symbol.ends_with(quote) {
            let base = &symbol[..symbol.len() - quote.len()];
            return Some((base.to_string(), (*quote).to_string()));
        }
    }
    if QUOTE_CURRENCIES.contains(&symbol) {
        return None;
    }
    if symbol.len() > 3 && symbol.is_ascii() {
        let (base, quote) = symbol.split_at(symbol.len() - 3);
        return Some((base.to_string(), quote.to_string()));
    }
    None
}
