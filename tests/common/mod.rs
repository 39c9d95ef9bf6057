#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use coinfolio::domain::error::CoinfolioError;
use coinfolio::domain::portfolio::BalanceSnapshot;
use coinfolio::domain::raw::RawRecord;
use coinfolio::domain::table::PriceTable;
use coinfolio::domain::transaction::{CoinAmount, Transaction};
use coinfolio::ports::snapshot_port::SnapshotStore;
use std::cell::RefCell;
use std::collections::HashMap;

pub fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

pub fn record(value: serde_json::Value) -> RawRecord {
    value.as_object().unwrap().clone()
}

pub fn make_trade(
    buy: (&str, f64),
    sell: (&str, f64),
    at: DateTime<Utc>,
    successful: bool,
) -> Transaction {
    Transaction {
        buy: Some(CoinAmount::new(buy.0, buy.1)),
        sell: Some(CoinAmount::new(sell.0, sell.1)),
        date: at,
        successful,
        commission: None,
        source_exchange: "test".to_string(),
    }
}

pub fn make_deposit(coin: &str, amount: f64, at: DateTime<Utc>) -> Transaction {
    Transaction {
        buy: Some(CoinAmount::new(coin, amount)),
        sell: None,
        date: at,
        successful: true,
        commission: None,
        source_exchange: "test".to_string(),
    }
}

/// Price table quoting BTC and ETH in USD for January 2020, day-level
/// tolerance.
pub fn sample_prices() -> PriceTable {
    let mut entries = Vec::new();
    for day in 1..=31 {
        entries.push((
            date(2020, 1, day),
            HashMap::from([
                ("BTC".to_string(), 7000.0 + 10.0 * day as f64),
                ("ETH".to_string(), 130.0),
            ]),
        ));
    }
    PriceTable::new(entries, Duration::days(1))
}

pub struct MemorySnapshotStore {
    pub snapshot: RefCell<Option<BalanceSnapshot>>,
}

impl MemorySnapshotStore {
    pub fn new(snapshot: Option<BalanceSnapshot>) -> Self {
        Self {
            snapshot: RefCell::new(snapshot),
        }
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<BalanceSnapshot, CoinfolioError> {
        self.snapshot
            .borrow()
            .clone()
            .ok_or_else(|| CoinfolioError::SnapshotRead {
                path: "memory".to_string(),
                reason: "absent".to_string(),
            })
    }

    fn save(&self, snapshot: &BalanceSnapshot) -> Result<(), CoinfolioError> {
        *self.snapshot.borrow_mut() = Some(snapshot.clone());
        Ok(())
    }
}
