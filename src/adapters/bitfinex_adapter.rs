//! Bitfinex export parser.
//!
//! Every record carries a `type` field: `Buy`/`Sell` for trades,
//! `DEPOSIT`/`WITHDRAWAL` for transfers.

use chrono::{DateTime, TimeZone, Utc};

use super::missing_field;
use crate::domain::error::CoinfolioError;
use crate::domain::raw::{self, RawRecord};
use crate::domain::transaction::{CoinAmount, Commission, RecordKind};
use crate::ports::parser_port::{CoinsAmounts, ExchangeParser};

const EXCHANGE: &str = "bitfinex";

pub struct BitfinexAdapter;

impl BitfinexAdapter {
    /// Bitfinex pair symbols are fixed-width: 3-character base, then quote.
    fn split_symbol(symbol: &str) -> Result<(String, String), CoinfolioError> {
        if symbol.len() <= 3 || !symbol.is_ascii() {
            return Err(CoinfolioError::MalformedRecord {
                exchange: EXCHANGE.to_string(),
                reason: format!("cannot split pair symbol `{symbol}`"),
            });
        }
        let (base, quote) = symbol.split_at(3);
        Ok((base.to_string(), quote.to_string()))
    }

    /// Fee coin and absolute amount; trades and transfers store them in
    /// different fields.
    fn fee(&self, raw: &RawRecord) -> Option<(String, f64)> {
        match self.classify(raw).ok()? {
            RecordKind::Trade => {
                let coin = raw::get_str(raw, "fee_currency")?;
                let amount = raw::get_f64(raw, "fee_amount")?;
                Some((coin.to_string(), amount.abs()))
            }
            RecordKind::Deposit | RecordKind::Withdrawal => {
                let coin = raw::get_str(raw, "currency")?;
                let amount = raw::get_f64(raw, "fee")?;
                Some((coin.to_string(), amount.abs()))
            }
        }
    }
}

impl ExchangeParser for BitfinexAdapter {
    fn exchange_name(&self) -> &'static str {
        EXCHANGE
    }

    fn classify(&self, raw: &RawRecord) -> Result<RecordKind, CoinfolioError> {
        match raw::get_str(raw, "type") {
            Some("Buy") | Some("Sell") => Ok(RecordKind::Trade),
            Some("DEPOSIT") => Ok(RecordKind::Deposit),
            Some("WITHDRAWAL") => Ok(RecordKind::Withdrawal),
            other => Err(CoinfolioError::Unclassifiable {
                exchange: EXCHANGE.to_string(),
                detail: format!("unrecognized type {other:?}"),
            }),
        }
    }

    fn coins_amounts(&self, raw: &RawRecord) -> Result<CoinsAmounts, CoinfolioError> {
        match self.classify(raw)? {
            RecordKind::Trade => {
                let symbol =
                    raw::get_str(raw, "symbol").ok_or_else(|| missing_field(EXCHANGE, "symbol"))?;
                let (base, quote) = Self::split_symbol(symbol)?;
                let amount = raw::get_f64(raw, "amount")
                    .ok_or_else(|| missing_field(EXCHANGE, "amount"))?
                    .abs();
                let price =
                    raw::get_f64(raw, "price").ok_or_else(|| missing_field(EXCHANGE, "price"))?;

                let base_side = CoinAmount {
                    coin: base,
                    amount,
                };
                let quote_side = CoinAmount {
                    coin: quote,
                    amount: amount * price,
                };
                if raw::get_str(raw, "type") == Some("Buy") {
                    Ok((Some(base_side), Some(quote_side)))
                } else {
                    Ok((Some(quote_side), Some(base_side)))
                }
            }
            RecordKind::Deposit => {
                let currency = raw::get_str(raw, "currency")
                    .ok_or_else(|| missing_field(EXCHANGE, "currency"))?;
                let amount = raw::get_f64(raw, "amount")
                    .ok_or_else(|| missing_field(EXCHANGE, "amount"))?
                    .abs();
                Ok((Some(CoinAmount::new(currency, amount)), None))
            }
            RecordKind::Withdrawal => {
                let currency = raw::get_str(raw, "currency")
                    .ok_or_else(|| missing_field(EXCHANGE, "currency"))?;
                let amount = raw::get_f64(raw, "amount")
                    .ok_or_else(|| missing_field(EXCHANGE, "amount"))?
                    .abs();
                Ok((None, Some(CoinAmount::new(currency, amount))))
            }
        }
    }

    fn commission(&self, raw: &RawRecord) -> Option<Commission> {
        let (coin, amount) = self.fee(raw)?;
        Some(Commission {
            coin,
            amount,
            date: self.date(raw).ok()?,
            successful: self.is_successful(raw),
        })
    }

    fn date(&self, raw: &RawRecord) -> Result<DateTime<Utc>, CoinfolioError> {
        // epoch seconds, encoded as a string with a fractional part
        let seconds =
            raw::get_f64(raw, "timestamp").ok_or_else(|| missing_field(EXCHANGE, "timestamp"))?;
        Utc.timestamp_millis_opt((seconds * 1000.0) as i64)
            .single()
            .ok_or_else(|| missing_field(EXCHANGE, "timestamp"))
    }

    fn is_successful(&self, raw: &RawRecord) -> bool {
        match self.classify(raw) {
            Ok(RecordKind::Trade) => raw::get_f64(raw, "fee_amount").is_some_and(|fee| fee <= 0.0),
            Ok(RecordKind::Deposit) | Ok(RecordKind::Withdrawal) => {
                raw::get_str(raw, "status") == Some("COMPLETED")
            }
            Err(_) => false,
        }
    }
}
