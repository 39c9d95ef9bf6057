//! GDAX (Coinbase Pro) ledger parser.
//!
//! GDAX exports are per-currency ledger entries: even a fill moves a single
//! signed amount of one currency. The adapter reuses the Coinbase family's
//! signed-amount and ISO-date behavior and overrides classification, which
//! hangs off `details.transfer_type` and `details.product_id` instead.

use chrono::{DateTime, Utc};

use super::coinbase_adapter::{parse_iso_date, signed_coin_amounts};
use super::missing_field;
use crate::domain::error::CoinfolioError;
use crate::domain::raw::{self, RawRecord};
use crate::domain::transaction::{Commission, RecordKind};
use crate::ports::parser_port::{CoinsAmounts, ExchangeParser};

const EXCHANGE: &str = "gdax";

pub struct GdaxAdapter;

impl GdaxAdapter {
    fn transfer_type<'a>(raw: &'a RawRecord) -> Option<&'a str> {
        if raw::get_str(raw, "type") != Some("transfer") {
            return None;
        }
        raw::get_object(raw, "details").and_then(|details| raw::get_str(details, "transfer_type"))
    }
}

impl ExchangeParser for GdaxAdapter {
    fn exchange_name(&self) -> &'static str {
        EXCHANGE
    }

    fn classify(&self, raw: &RawRecord) -> Result<RecordKind, CoinfolioError> {
        let is_fill = raw::get_object(raw, "details")
            .is_some_and(|details| details.contains_key("product_id"));
        if is_fill {
            return Ok(RecordKind::Trade);
        }
        match Self::transfer_type(raw) {
            Some("deposit") => Ok(RecordKind::Deposit),
            Some("withdraw") => Ok(RecordKind::Withdrawal),
            _ => Err(CoinfolioError::Unclassifiable {
                exchange: EXCHANGE.to_string(),
                detail: "neither a fill nor a transfer".to_string(),
            }),
        }
    }

    /// Ledger entries always move one signed amount of one currency, so
    /// even a fill populates a single side.
    fn coins_amounts(&self, raw: &RawRecord) -> Result<CoinsAmounts, CoinfolioError> {
        self.classify(raw)?;
        let coin =
            raw::get_str(raw, "currency").ok_or_else(|| missing_field(EXCHANGE, "currency"))?;
        let amount =
            raw::get_f64(raw, "amount").ok_or_else(|| missing_field(EXCHANGE, "amount"))?;
        Ok(signed_coin_amounts(coin, amount))
    }

    /// The ledger gives no way to tell whether an entry was charged a fee.
    fn commission(&self, _raw: &RawRecord) -> Option<Commission> {
        None
    }

    fn date(&self, raw: &RawRecord) -> Result<DateTime<Utc>, CoinfolioError> {
        parse_iso_date(EXCHANGE, raw, "created_at")
    }

    /// GDAX exports only settled ledger entries; there is no failure state.
    fn is_successful(&self, _raw: &RawRecord) -> bool {
        true
    }
}
