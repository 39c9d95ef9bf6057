//! Canonical transaction model, independent of source exchange format.

use chrono::{DateTime, Utc};

/// Classification of a raw exchange record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Trade,
    Deposit,
    Withdrawal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoinAmount {
    pub coin: String,
    pub amount: f64,
}

impl CoinAmount {
    pub fn new(coin: &str, amount: f64) -> Self {
        Self {
            coin: coin.to_string(),
            amount,
        }
    }
}

/// Fee attached to a transaction. Optional; a transaction may have none.
#[derive(Debug, Clone, PartialEq)]
pub struct Commission {
    pub coin: String,
    pub amount: f64,
    pub date: DateTime<Utc>,
    pub successful: bool,
}

/// Normalized transaction. Immutable once constructed.
///
/// Invariant: at least one of `buy`/`sell` is `Some`. A trade has both,
/// a deposit only `buy`, a withdrawal only `sell`.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub buy: Option<CoinAmount>,
    pub sell: Option<CoinAmount>,
    pub date: DateTime<Utc>,
    pub successful: bool,
    pub commission: Option<Commission>,
    pub source_exchange: String,
}

impl Transaction {
    /// Shape of this transaction, `None` when neither side is populated
    /// (a record the adapter driver must reject).
    pub fn kind(&self) -> Option<RecordKind> {
        match (&self.buy, &self.sell) {
            (Some(_), Some(_)) => Some(RecordKind::Trade),
            (Some(_), None) => Some(RecordKind::Deposit),
            (None, Some(_)) => Some(RecordKind::Withdrawal),
            (None, None) => None,
        }
    }

    /// Distinct coin symbols touched by this transaction (1 or 2).
    pub fn coins(&self) -> Vec<&str> {
        let mut coins = Vec::with_capacity(2);
        if let Some(buy) = &self.buy {
            coins.push(buy.coin.as_str());
        }
        if let Some(sell) = &self.sell {
            if !coins.contains(&sell.coin.as_str()) {
                coins.push(sell.coin.as_str());
            }
        }
        coins
    }
}
