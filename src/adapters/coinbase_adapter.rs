//! Coinbase export parser.
//!
//! Records carry `{amount, native_amount}` money objects; trades are marked
//! by `type` and transfers are told apart by the sign convention on both
//! amounts. The sign and ISO-date helpers are shared with the GDAX adapter,
//! which reuses this family's record shape.

use chrono::{DateTime, Utc};

use super::missing_field;
use crate::domain::error::CoinfolioError;
use crate::domain::raw::{self, RawRecord};
use crate::domain::transaction::{CoinAmount, Commission, RecordKind};
use crate::ports::parser_port::{CoinsAmounts, ExchangeParser};

const EXCHANGE: &str = "coinbase";

/// `{currency, amount}` money object at `field`.
pub(crate) fn money(raw: &RawRecord, field: &str) -> Option<(String, f64)> {
    let object = raw::get_object(raw, field)?;
    let currency = raw::get_str(object, "currency")?;
    let amount = raw::get_f64(object, "amount")?;
    Some((currency.to_string(), amount))
}

/// Coinbase-family sign convention: a non-negative amount is an incoming
/// move (buy side), a negative one an outgoing move (sell side).
pub(crate) fn signed_coin_amounts(coin: &str, amount: f64) -> CoinsAmounts {
    if amount >= 0.0 {
        (Some(CoinAmount::new(coin, amount)), None)
    } else {
        (None, Some(CoinAmount::new(coin, amount.abs())))
    }
}

/// RFC 3339 timestamp at `field` (Coinbase `updated_at`, GDAX `created_at`).
pub(crate) fn parse_iso_date(
    exchange: &str,
    raw: &RawRecord,
    field: &str,
) -> Result<DateTime<Utc>, CoinfolioError> {
    let text = raw::get_str(raw, field).ok_or_else(|| missing_field(exchange, field))?;
    DateTime::parse_from_rfc3339(text)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|err| CoinfolioError::MalformedRecord {
            exchange: exchange.to_string(),
            reason: format!("invalid timestamp `{text}`: {err}"),
        })
}

pub struct CoinbaseAdapter;

impl ExchangeParser for CoinbaseAdapter {
    fn exchange_name(&self) -> &'static str {
        EXCHANGE
    }

    fn classify(&self, raw: &RawRecord) -> Result<RecordKind, CoinfolioError> {
        if matches!(raw::get_str(raw, "type"), Some("buy") | Some("sell")) {
            return Ok(RecordKind::Trade);
        }
        let amount = money(raw, "amount");
        let native = money(raw, "native_amount");
        match (amount, native) {
            (Some((_, a)), Some((_, n))) if a < 0.0 && n < 0.0 => Ok(RecordKind::Withdrawal),
            (Some((_, a)), Some((_, n))) if a >= 0.0 && n >= 0.0 => Ok(RecordKind::Deposit),
            _ => Err(CoinfolioError::Unclassifiable {
                exchange: EXCHANGE.to_string(),
                detail: "no trade type and no consistent amount signs".to_string(),
            }),
        }
    }

    fn coins_amounts(&self, raw: &RawRecord) -> Result<CoinsAmounts, CoinfolioError> {
        match self.classify(raw)? {
            RecordKind::Trade => {
                let (coin, amount) =
                    money(raw, "amount").ok_or_else(|| missing_field(EXCHANGE, "amount"))?;
                let (native_coin, native_amount) = money(raw, "native_amount")
                    .ok_or_else(|| missing_field(EXCHANGE, "native_amount"))?;
                if coin == native_coin {
                    // fiat bookkeeping row, moves nothing between coins
                    return Err(CoinfolioError::MalformedRecord {
                        exchange: EXCHANGE.to_string(),
                        reason: format!("fiat-only entry in {coin}"),
                    });
                }

                let coin_side = CoinAmount::new(&coin, amount.abs());
                let native_side = CoinAmount::new(&native_coin, native_amount.abs());
                if raw::get_str(raw, "type") == Some("sell") {
                    Ok((Some(native_side), Some(coin_side)))
                } else {
                    Ok((Some(coin_side), Some(native_side)))
                }
            }
            RecordKind::Deposit | RecordKind::Withdrawal => {
                let (coin, amount) =
                    money(raw, "amount").ok_or_else(|| missing_field(EXCHANGE, "amount"))?;
                Ok(signed_coin_amounts(&coin, amount))
            }
        }
    }

    fn commission(&self, raw: &RawRecord) -> Option<Commission> {
        let network = raw::get_object(raw, "network")?;
        let (coin, amount) = money(network, "transaction_fee")?;
        Some(Commission {
            coin,
            amount,
            date: self.date(raw).ok()?,
            successful: raw::get_str(network, "status") == Some("confirmed"),
        })
    }

    fn date(&self, raw: &RawRecord) -> Result<DateTime<Utc>, CoinfolioError> {
        parse_iso_date(EXCHANGE, raw, "updated_at")
    }

    fn is_successful(&self, raw: &RawRecord) -> bool {
        raw::get_str(raw, "status") == Some("completed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        value.as_object().unwrap().clone()
    }

    fn sample_buy() -> RawRecord {
        record(json!({
            "type": "buy",
            "status": "completed",
            "amount": { "currency": "BTC", "amount": "0.4" },
            "native_amount": { "currency": "USD", "amount": "3200.0" },
            "updated_at": "2018-01-01T00:00:00Z"
        }))
    }

    fn sample_deposit() -> RawRecord {
        record(json!({
            "status": "completed",
            "amount": { "currency": "EUR", "amount": "250.0" },
            "native_amount": { "currency": "USD", "amount": "290.0" },
            "updated_at": "2018-01-01T00:00:00Z"
        }))
    }

    fn sample_withdrawal() -> RawRecord {
        record(json!({
            "status": "completed",
            "amount": { "currency": "BTC", "amount": "-0.1" },
            "native_amount": { "currency": "USD", "amount": "-800.0" },
            "updated_at": "2018-01-02T12:30:00Z",
            "network": {
                "status": "confirmed",
                "transaction_fee": { "currency": "BTC", "amount": "0.001" }
            }
        }))
    }

    #[test]
    fn classification_by_type_then_signs() {
        let adapter = CoinbaseAdapter;
        assert_eq!(adapter.classify(&sample_buy()).unwrap(), RecordKind::Trade);
        assert_eq!(
            adapter.classify(&sample_deposit()).unwrap(),
            RecordKind::Deposit
        );
        assert_eq!(
            adapter.classify(&sample_withdrawal()).unwrap(),
            RecordKind::Withdrawal
        );
    }

    #[test]
    fn mixed_signs_are_unclassifiable() {
        let adapter = CoinbaseAdapter;
        let raw = record(json!({
            "amount": { "currency": "BTC", "amount": "0.1" },
            "native_amount": { "currency": "USD", "amount": "-800.0" }
        }));
        assert!(matches!(
            adapter.classify(&raw),
            Err(CoinfolioError::Unclassifiable { .. })
        ));
    }

    #[test]
    fn buy_trade_sides() {
        let adapter = CoinbaseAdapter;
        let (buy, sell) = adapter.coins_amounts(&sample_buy()).unwrap();
        let buy = buy.unwrap();
        let sell = sell.unwrap();
        assert_eq!(buy.coin, "BTC");
        assert!((buy.amount - 0.4).abs() < f64::EPSILON);
        assert_eq!(sell.coin, "USD");
        assert!((sell.amount - 3200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sell_trade_swaps_sides() {
        let adapter = CoinbaseAdapter;
        let mut raw = sample_buy();
        raw.insert("type".to_string(), json!("sell"));
        let (buy, sell) = adapter.coins_amounts(&raw).unwrap();
        assert_eq!(buy.unwrap().coin, "USD");
        assert_eq!(sell.unwrap().coin, "BTC");
    }

    #[test]
    fn fiat_only_trade_row_is_malformed() {
        let adapter = CoinbaseAdapter;
        let raw = record(json!({
            "type": "buy",
            "amount": { "currency": "USD", "amount": "100.0" },
            "native_amount": { "currency": "USD", "amount": "100.0" }
        }));
        assert!(matches!(
            adapter.coins_amounts(&raw),
            Err(CoinfolioError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn transfers_use_signed_amount() {
        let adapter = CoinbaseAdapter;
        let (buy, sell) = adapter.coins_amounts(&sample_deposit()).unwrap();
        assert_eq!(buy.unwrap().coin, "EUR");
        assert!(sell.is_none());

        let (buy, sell) = adapter.coins_amounts(&sample_withdrawal()).unwrap();
        assert!(buy.is_none());
        let sell = sell.unwrap();
        assert_eq!(sell.coin, "BTC");
        assert!((sell.amount - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn network_commission() {
        let adapter = CoinbaseAdapter;
        let commission = adapter.commission(&sample_withdrawal()).unwrap();
        assert_eq!(commission.coin, "BTC");
        assert!((commission.amount - 0.001).abs() < f64::EPSILON);
        assert!(commission.successful);
        // no network object -> no commission, no error
        assert!(adapter.commission(&sample_buy()).is_none());
    }

    #[test]
    fn date_from_rfc3339() {
        let adapter = CoinbaseAdapter;
        let date = adapter.date(&sample_withdrawal()).unwrap();
        assert_eq!(date.to_rfc3339(), "2018-01-02T12:30:00+00:00");

        let mut bad = sample_buy();
        bad.insert("updated_at".to_string(), json!("not a date"));
        assert!(adapter.date(&bad).is_err());
    }

    #[test]
    fn success_from_status() {
        let adapter = CoinbaseAdapter;
        assert!(adapter.is_successful(&sample_buy()));
        let mut pending = sample_buy();
        pending.insert("status".to_string(), json!("pending"));
        assert!(!adapter.is_successful(&pending));
    }
}
