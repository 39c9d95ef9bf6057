//! Concrete adapter implementations.

pub mod binance_adapter;
pub mod bitfinex_adapter;
pub mod coinbase_adapter;
pub mod file_config_adapter;
pub mod gdax_adapter;
pub mod json_snapshot_adapter;
pub mod record_loader;

use crate::domain::error::CoinfolioError;
use crate::ports::parser_port::ExchangeParser;

/// Adapter for a named exchange, `None` when the exchange is unknown.
pub fn parser_for(name: &str) -> Option<Box<dyn ExchangeParser>> {
    match name.to_lowercase().as_str() {
        "binance" => Some(Box::new(binance_adapter::BinanceAdapter)),
        "bitfinex" => Some(Box::new(bitfinex_adapter::BitfinexAdapter)),
        "coinbase" => Some(Box::new(coinbase_adapter::CoinbaseAdapter)),
        "gdax" => Some(Box::new(gdax_adapter::GdaxAdapter)),
        _ => None,
    }
}

pub(crate) fn missing_field(exchange: &str, field: &str) -> CoinfolioError {
    CoinfolioError::MalformedRecord {
        exchange: exchange.to_string(),
        reason: format!("missing or invalid field `{field}`"),
    }
}
