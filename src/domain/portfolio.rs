//! Portfolio aggregation: current balances, delta replay, snapshot diffs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use super::error::CoinfolioError;
use super::table::PriceTable;
use super::wallet::Wallet;
use crate::ports::snapshot_port::SnapshotStore;

/// A signed balance change at a point in time. `None` marks an unknown
/// value; unknowns are excluded from every sum, never treated as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Delta {
    pub date: DateTime<Utc>,
    pub value: Option<f64>,
}

/// One point of a reconstructed running-balance series.
#[derive(Debug, Clone, PartialEq)]
pub struct BalancePoint {
    pub date: DateTime<Utc>,
    pub value: f64,
}

/// Current holding of one coin with its valuation in the reference
/// currency. `value`, `price` and `percentage` are `None` when the coin
/// could not be priced.
#[derive(Debug, Clone, PartialEq)]
pub struct CoinBalance {
    pub symbol: String,
    pub balance: f64,
    pub value: Option<f64>,
    pub price: Option<f64>,
    pub percentage: Option<f64>,
}

/// Persisted balance snapshot: coin -> valuation, plus capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub taken_at: DateTime<Utc>,
    pub coins: HashMap<String, f64>,
}

impl BalanceSnapshot {
    pub fn total(&self) -> f64 {
        self.coins.values().sum()
    }
}

/// Change since a previously persisted snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotDiff {
    pub taken_at: DateTime<Utc>,
    pub last_total: f64,
    pub delta: f64,
    pub percentage: Option<f64>,
    /// Per-coin valuation change; coins absent from the snapshot are omitted.
    pub coin_deltas: HashMap<String, f64>,
}

/// Result of [`Portfolio::show_balance`], ready for an external renderer.
#[derive(Debug, Clone)]
pub struct BalanceReport {
    pub balances: Vec<CoinBalance>,
    pub total: f64,
    pub last: Option<SnapshotDiff>,
}

/// Portfolio-wide crypto vs fiat value series over the transaction timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct CryptoFiatSeries {
    pub dates: Vec<DateTime<Utc>>,
    pub crypto: Vec<f64>,
    pub fiat: Vec<f64>,
}

/// Difference against a previous value, `None` when there is none.
pub fn relative_delta(new: f64, last: Option<f64>) -> Option<f64> {
    last.map(|last| new - last)
}

/// Percentage change against a previous value. Growing from zero to a
/// non-zero value reports +infinity.
pub fn relative_percentage(new: f64, last: Option<f64>) -> Option<f64> {
    let last = last?;
    if last == 0.0 {
        if new == 0.0 {
            Some(0.0)
        } else {
            Some(f64::INFINITY)
        }
    } else {
        Some(100.0 * (new / last - 1.0))
    }
}

/// Wallets aggregated across exchanges.
#[derive(Debug, Clone)]
pub struct Portfolio {
    pub wallets: Vec<Wallet>,
    pub portfolio_name: Option<String>,
}

impl Portfolio {
    pub fn new(wallets: Vec<Wallet>, portfolio_name: Option<String>) -> Self {
        Self {
            wallets,
            portfolio_name,
        }
    }

    /// Ascending union of all wallets' transaction dates.
    pub fn transactions_dates(&self) -> Vec<DateTime<Utc>> {
        let mut dates: Vec<DateTime<Utc>> =
            self.wallets.iter().flat_map(|w| w.dates()).collect();
        dates.sort();
        dates
    }

    /// Per-coin holdings valued in `currency` at `date`, sorted by
    /// valuation descending. Coins with balance <= 0 are dropped; coins
    /// that cannot be priced keep an unknown valuation and sort last.
    pub fn current_balance(
        &self,
        currency: &str,
        prices: &PriceTable,
        date: DateTime<Utc>,
    ) -> Vec<CoinBalance> {
        let mut balances: Vec<CoinBalance> = self
            .wallets
            .iter()
            .filter_map(|wallet| {
                let balance = wallet.balance();
                if balance <= 0.0 {
                    return None;
                }
                Some(CoinBalance {
                    symbol: wallet.base_currency.clone(),
                    balance,
                    value: wallet.value_of(balance, currency, prices, date),
                    price: None,
                    percentage: None,
                })
            })
            .collect();

        let total = Self::sum_total_balance(&balances);
        for entry in &mut balances {
            entry.price = entry.value.map(|value| value / entry.balance);
            entry.percentage = entry.value.and_then(|value| {
                (total > 0.0).then(|| 100.0 * value / total)
            });
        }

        balances.sort_by(|a, b| {
            let a = a.value.unwrap_or(f64::NEG_INFINITY);
            let b = b.value.unwrap_or(f64::NEG_INFINITY);
            b.partial_cmp(&a).unwrap_or(Ordering::Equal)
        });
        balances
    }

    /// Replay deltas into a running-balance series: unknown values are
    /// dropped, the rest sorted ascending by date and prefix-summed. The
    /// result depends only on the delta set, not on input order.
    pub fn balances_from_deltas(deltas: &[Delta]) -> Vec<BalancePoint> {
        let mut known: Vec<(DateTime<Utc>, f64)> = deltas
            .iter()
            .filter_map(|d| d.value.map(|value| (d.date, value)))
            .collect();
        known.sort_by_key(|(date, _)| *date);

        let mut running = 0.0;
        known
            .into_iter()
            .map(|(date, value)| {
                running += value;
                BalancePoint {
                    date,
                    value: running,
                }
            })
            .collect()
    }

    /// Total valuation across a balance set, skipping unknown values.
    pub fn sum_total_balance(balances: &[CoinBalance]) -> f64 {
        balances.iter().filter_map(|b| b.value).sum()
    }

    /// Value of the portfolio over its full transaction timeline, split
    /// into crypto-denominated and fiat-denominated wallets. Wallets that
    /// cannot be priced at a given date contribute nothing there.
    pub fn crypto_fiat_balance(&self, currency: &str, prices: &PriceTable) -> CryptoFiatSeries {
        let dates = self.transactions_dates();
        let mut crypto = vec![0.0; dates.len()];
        let mut fiat = vec![0.0; dates.len()];

        for wallet in &self.wallets {
            let series = wallet.balance_series(&dates, currency, prices);
            let accumulator = if wallet.is_crypto() {
                &mut crypto
            } else {
                &mut fiat
            };
            for (slot, value) in accumulator.iter_mut().zip(series) {
                if let Some(value) = value {
                    *slot += value;
                }
            }
        }

        CryptoFiatSeries {
            dates,
            crypto,
            fiat,
        }
    }

    /// Current balances plus, when a previous snapshot is readable, the
    /// change since it. A missing or malformed snapshot degrades to "no
    /// diff" with a warning; only persisting a new snapshot can fail.
    pub fn show_balance(
        &self,
        currency: &str,
        prices: &PriceTable,
        date: DateTime<Utc>,
        last: Option<&dyn SnapshotStore>,
        save_to: Option<&dyn SnapshotStore>,
    ) -> Result<BalanceReport, CoinfolioError> {
        let balances = self.current_balance(currency, prices, date);
        let total = Self::sum_total_balance(&balances);

        let last_snapshot = match last.map(|store| store.load()) {
            Some(Ok(snapshot)) => Some(snapshot),
            Some(Err(err)) => {
                eprintln!("Warning: ignoring previous balance snapshot ({err})");
                None
            }
            None => None,
        };

        let diff = last_snapshot.map(|snapshot| {
            let last_total = snapshot.total();
            let coin_deltas = balances
                .iter()
                .filter_map(|entry| {
                    let value = entry.value?;
                    let previous = snapshot.coins.get(&entry.symbol).copied();
                    relative_delta(value, previous).map(|d| (entry.symbol.clone(), d))
                })
                .collect();
            SnapshotDiff {
                taken_at: snapshot.taken_at,
                last_total,
                delta: total - last_total,
                percentage: relative_percentage(total, Some(last_total)),
                coin_deltas,
            }
        });

        if let Some(store) = save_to {
            let snapshot = BalanceSnapshot {
                taken_at: date,
                coins: balances
                    .iter()
                    .filter_map(|entry| entry.value.map(|v| (entry.symbol.clone(), v)))
                    .collect(),
            };
            store.save(&snapshot)?;
        }

        Ok(BalanceReport {
            balances,
            total,
            last: diff,
        })
    }
}
