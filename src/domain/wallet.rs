//! Per-coin transaction ledger and balance reconstruction.

use chrono::{DateTime, Utc};

use super::coins;
use super::portfolio::Delta;
use super::table::PriceTable;
use super::transaction::Transaction;

/// Ledger of every transaction touching one coin. Transactions are kept in
/// arrival order, not necessarily date-sorted; balance reconstruction sorts
/// the implied deltas before replaying them.
#[derive(Debug, Clone)]
pub struct Wallet {
    pub base_currency: String,
    pub transactions: Vec<Transaction>,
}

impl Wallet {
    pub fn new(base_currency: &str) -> Self {
        Self {
            base_currency: base_currency.to_string(),
            transactions: Vec::new(),
        }
    }

    pub fn add_transaction(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    pub fn is_crypto(&self) -> bool {
        !coins::is_fiat(&self.base_currency)
    }

    pub fn dates(&self) -> Vec<DateTime<Utc>> {
        self.transactions.iter().map(|t| t.date).collect()
    }

    /// Signed change of this wallet's coin caused by one transaction:
    /// the bought amount flows in, the sold amount flows out, and a
    /// commission paid in this coin flows out.
    pub fn delta_of(&self, transaction: &Transaction) -> f64 {
        let mut delta = 0.0;
        if let Some(buy) = &transaction.buy {
            if buy.coin == self.base_currency {
                delta += buy.amount;
            }
        }
        if let Some(sell) = &transaction.sell {
            if sell.coin == self.base_currency {
                delta -= sell.amount;
            }
        }
        if let Some(fee) = &transaction.commission {
            if fee.coin == self.base_currency {
                delta -= fee.amount;
            }
        }
        delta
    }

    /// Holding after replaying the full history.
    pub fn balance(&self) -> f64 {
        self.transactions.iter().map(|t| self.delta_of(t)).sum()
    }

    /// One delta per transaction, in arrival order.
    pub fn deltas(&self) -> Vec<Delta> {
        self.transactions
            .iter()
            .map(|t| Delta {
                date: t.date,
                value: Some(self.delta_of(t)),
            })
            .collect()
    }

    /// Value of `amount` of this wallet's coin in `currency` at `date`.
    /// `None` when the price table cannot price the coin within tolerance.
    pub fn value_of(
        &self,
        amount: f64,
        currency: &str,
        prices: &PriceTable,
        date: DateTime<Utc>,
    ) -> Option<f64> {
        if self.base_currency == currency {
            return Some(amount);
        }
        prices
            .price_of(&self.base_currency, date)
            .map(|price| amount * price)
    }

    /// Current holding valued in `currency` at `date`.
    pub fn balance_value(
        &self,
        currency: &str,
        prices: &PriceTable,
        date: DateTime<Utc>,
    ) -> Option<f64> {
        self.value_of(self.balance(), currency, prices, date)
    }

    /// Running balance aligned to each timeline date (holdings after all
    /// transactions dated at or before it), valued in `currency` at that
    /// date. `timeline` must be ascending.
    pub fn balance_series(
        &self,
        timeline: &[DateTime<Utc>],
        currency: &str,
        prices: &PriceTable,
    ) -> Vec<Option<f64>> {
        let mut deltas: Vec<(DateTime<Utc>, f64)> = self
            .transactions
            .iter()
            .map(|t| (t.date, self.delta_of(t)))
            .collect();
        deltas.sort_by_key(|(date, _)| *date);

        let mut series = Vec::with_capacity(timeline.len());
        let mut next = 0;
        let mut running = 0.0;
        for &date in timeline {
            while next < deltas.len() && deltas[next].0 <= date {
                running += deltas[next].1;
                next += 1;
            }
            series.push(self.value_of(running, currency, prices, date));
        }
        series
    }
}
