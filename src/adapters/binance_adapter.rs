//! Binance export parser.
//!
//! Trades, deposits and withdrawals arrive in three unrelated shapes with
//! no common discriminator; the marker fields (`isBuyer`, `insertTime`,
//! `applyTime`) drive classification.

use chrono::{DateTime, TimeZone, Utc};

use super::missing_field;
use crate::domain::coins;
use crate::domain::error::CoinfolioError;
use crate::domain::raw::{self, RawRecord};
use crate::domain::transaction::{CoinAmount, Commission, RecordKind};
use crate::ports::parser_port::{CoinsAmounts, ExchangeParser};

const EXCHANGE: &str = "binance";

pub struct BinanceAdapter;

impl BinanceAdapter {
    fn epoch_millis(raw: &RawRecord, field: &str) -> Result<DateTime<Utc>, CoinfolioError> {
        let millis = raw::get_i64(raw, field).ok_or_else(|| missing_field(EXCHANGE, field))?;
        Utc.timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| missing_field(EXCHANGE, field))
    }
}

impl ExchangeParser for BinanceAdapter {
    fn exchange_name(&self) -> &'static str {
        EXCHANGE
    }

    fn classify(&self, raw: &RawRecord) -> Result<RecordKind, CoinfolioError> {
        if raw.contains_key("isBuyer") {
            Ok(RecordKind::Trade)
        } else if raw.contains_key("insertTime") {
            Ok(RecordKind::Deposit)
        } else if raw.contains_key("applyTime") {
            Ok(RecordKind::Withdrawal)
        } else {
            Err(CoinfolioError::Unclassifiable {
                exchange: EXCHANGE.to_string(),
                detail: "no isBuyer/insertTime/applyTime marker".to_string(),
            })
        }
    }

    fn coins_amounts(&self, raw: &RawRecord) -> Result<CoinsAmounts, CoinfolioError> {
        match self.classify(raw)? {
            RecordKind::Trade => {
                let market =
                    raw::get_str(raw, "symbol").ok_or_else(|| missing_field(EXCHANGE, "symbol"))?;
                let (base, quote) = coins::split_market_pair(market).ok_or_else(|| {
                    CoinfolioError::MalformedRecord {
                        exchange: EXCHANGE.to_string(),
                        reason: format!("cannot split market pair `{market}`"),
                    }
                })?;
                let qty =
                    raw::get_f64(raw, "qty").ok_or_else(|| missing_field(EXCHANGE, "qty"))?;
                let price =
                    raw::get_f64(raw, "price").ok_or_else(|| missing_field(EXCHANGE, "price"))?;

                let base_side = CoinAmount {
                    coin: base,
                    amount: qty,
                };
                let quote_side = CoinAmount {
                    coin: quote,
                    amount: price * qty,
                };
                if raw::get_bool(raw, "isBuyer").unwrap_or(false) {
                    Ok((Some(base_side), Some(quote_side)))
                } else {
                    Ok((Some(quote_side), Some(base_side)))
                }
            }
            RecordKind::Deposit => {
                let asset =
                    raw::get_str(raw, "asset").ok_or_else(|| missing_field(EXCHANGE, "asset"))?;
                let amount =
                    raw::get_f64(raw, "amount").ok_or_else(|| missing_field(EXCHANGE, "amount"))?;
                Ok((Some(CoinAmount::new(asset, amount)), None))
            }
            RecordKind::Withdrawal => {
                let asset =
                    raw::get_str(raw, "asset").ok_or_else(|| missing_field(EXCHANGE, "asset"))?;
                let amount =
                    raw::get_f64(raw, "amount").ok_or_else(|| missing_field(EXCHANGE, "amount"))?;
                Ok((None, Some(CoinAmount::new(asset, amount))))
            }
        }
    }

    fn commission(&self, raw: &RawRecord) -> Option<Commission> {
        let coin = raw::get_str(raw, "commissionAsset")?;
        let amount = raw::get_f64(raw, "commission")?;
        Some(Commission {
            coin: coin.to_string(),
            amount,
            date: self.date(raw).ok()?,
            successful: self.is_successful(raw),
        })
    }

    fn date(&self, raw: &RawRecord) -> Result<DateTime<Utc>, CoinfolioError> {
        match self.classify(raw)? {
            RecordKind::Trade => Self::epoch_millis(raw, "time"),
            RecordKind::Deposit => Self::epoch_millis(raw, "insertTime"),
            RecordKind::Withdrawal => Self::epoch_millis(raw, "successTime"),
        }
    }

    fn is_successful(&self, raw: &RawRecord) -> bool {
        match self.classify(raw) {
            // Binance reports no explicit trade status; a charged fee is
            // the success proxy
            Ok(RecordKind::Trade) => raw.contains_key("commission"),
            Ok(RecordKind::Deposit) => raw::get_i64(raw, "status") == Some(1),
            Ok(RecordKind::Withdrawal) => raw::get_i64(raw, "status") == Some(6),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        value.as_object().unwrap().clone()
    }

    fn sample_trade() -> RawRecord {
        record(json!({
            "symbol": "ETHBTC",
            "qty": "2.0",
            "price": "0.05",
            "isBuyer": true,
            "time": 1514764800000i64,
            "commission": "0.002",
            "commissionAsset": "ETH"
        }))
    }

    fn sample_deposit() -> RawRecord {
        record(json!({
            "asset": "BTC",
            "amount": 0.7,
            "insertTime": 1514764800000i64,
            "status": 1
        }))
    }

    fn sample_withdrawal() -> RawRecord {
        record(json!({
            "asset": "LTC",
            "amount": "12.5",
            "applyTime": 1514764800000i64,
            "successTime": 1514851200000i64,
            "status": 6
        }))
    }

    #[test]
    fn classification_is_total() {
        let adapter = BinanceAdapter;
        assert_eq!(adapter.classify(&sample_trade()).unwrap(), RecordKind::Trade);
        assert_eq!(
            adapter.classify(&sample_deposit()).unwrap(),
            RecordKind::Deposit
        );
        assert_eq!(
            adapter.classify(&sample_withdrawal()).unwrap(),
            RecordKind::Withdrawal
        );
        assert!(matches!(
            adapter.classify(&record(json!({"foo": 1}))),
            Err(CoinfolioError::Unclassifiable { .. })
        ));
    }

    #[test]
    fn buyer_trade_buys_base_coin() {
        let adapter = BinanceAdapter;
        let (buy, sell) = adapter.coins_amounts(&sample_trade()).unwrap();
        let buy = buy.unwrap();
        let sell = sell.unwrap();
        assert_eq!(buy.coin, "ETH");
        assert!((buy.amount - 2.0).abs() < f64::EPSILON);
        assert_eq!(sell.coin, "BTC");
        assert!((sell.amount - 0.1).abs() < 1e-12);
    }

    #[test]
    fn seller_trade_swaps_sides() {
        let adapter = BinanceAdapter;
        let mut raw = sample_trade();
        raw.insert("isBuyer".to_string(), json!(false));
        let (buy, sell) = adapter.coins_amounts(&raw).unwrap();
        assert_eq!(buy.unwrap().coin, "BTC");
        assert_eq!(sell.unwrap().coin, "ETH");
    }

    #[test]
    fn deposit_populates_buy_side_only() {
        let adapter = BinanceAdapter;
        let (buy, sell) = adapter.coins_amounts(&sample_deposit()).unwrap();
        assert_eq!(buy.unwrap().coin, "BTC");
        assert!(sell.is_none());
    }

    #[test]
    fn withdrawal_populates_sell_side_only() {
        let adapter = BinanceAdapter;
        let (buy, sell) = adapter.coins_amounts(&sample_withdrawal()).unwrap();
        assert!(buy.is_none());
        assert_eq!(sell.unwrap().coin, "LTC");
    }

    #[test]
    fn commission_extraction() {
        let adapter = BinanceAdapter;
        let commission = adapter.commission(&sample_trade()).unwrap();
        assert_eq!(commission.coin, "ETH");
        assert!((commission.amount - 0.002).abs() < f64::EPSILON);
        assert!(commission.successful);
    }

    #[test]
    fn missing_commission_is_none_not_error() {
        let adapter = BinanceAdapter;
        assert!(adapter.commission(&sample_deposit()).is_none());
        let tx = adapter.parse_transaction(&sample_deposit()).unwrap();
        assert!(tx.commission.is_none());
    }

    #[test]
    fn dates_come_from_per_kind_fields() {
        let adapter = BinanceAdapter;
        let trade_date = adapter.date(&sample_trade()).unwrap();
        assert_eq!(trade_date.timestamp(), 1514764800);
        let withdrawal_date = adapter.date(&sample_withdrawal()).unwrap();
        assert_eq!(withdrawal_date.timestamp(), 1514851200);
    }

    #[test]
    fn success_flags() {
        let adapter = BinanceAdapter;
        assert!(adapter.is_successful(&sample_trade()));
        assert!(adapter.is_successful(&sample_deposit()));
        assert!(adapter.is_successful(&sample_withdrawal()));

        let mut feeless = sample_trade();
        feeless.remove("commission");
        assert!(!adapter.is_successful(&feeless));

        let mut pending = sample_deposit();
        pending.insert("status".to_string(), json!(0));
        assert!(!adapter.is_successful(&pending));
    }

    #[test]
    fn build_exchange_skips_bad_records() {
        let adapter = BinanceAdapter;
        let records = vec![
            sample_trade(),
            record(json!({"garbage": true})),
            sample_deposit(),
        ];
        let build = adapter.build_exchange(&records).unwrap();
        assert_eq!(build.exchange.transactions_count(), 2);
        assert_eq!(build.skipped.len(), 1);
        assert_eq!(build.skipped[0].index, 1);
    }

    #[test]
    fn build_exchange_with_only_bad_records_fails() {
        let adapter = BinanceAdapter;
        let records = vec![record(json!({"garbage": true}))];
        assert!(matches!(
            adapter.build_exchange(&records),
            Err(CoinfolioError::EmptyHistory { .. })
        ));
    }
}
