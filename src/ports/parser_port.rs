//! Exchange parser port: per-exchange classification and extraction.

use chrono::{DateTime, Utc};

use crate::domain::error::CoinfolioError;
use crate::domain::exchange::CryptoExchange;
use crate::domain::raw::RawRecord;
use crate::domain::transaction::{CoinAmount, Commission, RecordKind, Transaction};

/// Optional buy and sell sides as extracted from one raw record.
pub type CoinsAmounts = (Option<CoinAmount>, Option<CoinAmount>);

/// A raw record the driver refused, with why.
#[derive(Debug)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: CoinfolioError,
}

/// Outcome of normalizing one raw batch: the surviving exchange plus the
/// records that were dropped along the way.
#[derive(Debug)]
pub struct ExchangeBuild {
    pub exchange: CryptoExchange,
    pub skipped: Vec<SkippedRecord>,
}

/// Capability set every exchange adapter implements. There is no shared
/// discriminator across exchanges; each adapter inspects its own marker
/// fields, and classification must be total over trade/deposit/withdrawal
/// or fail with [`CoinfolioError::Unclassifiable`].
pub trait ExchangeParser {
    fn exchange_name(&self) -> &'static str;

    fn classify(&self, raw: &RawRecord) -> Result<RecordKind, CoinfolioError>;

    /// Buy/sell sides for the record: both for a trade, buy only for a
    /// deposit, sell only for a withdrawal.
    fn coins_amounts(&self, raw: &RawRecord) -> Result<CoinsAmounts, CoinfolioError>;

    /// Fee attached to the record. Missing or unparseable fee fields yield
    /// `None`; a commission failure never fails the transaction.
    fn commission(&self, raw: &RawRecord) -> Option<Commission>;

    fn date(&self, raw: &RawRecord) -> Result<DateTime<Utc>, CoinfolioError>;

    fn is_successful(&self, raw: &RawRecord) -> bool;

    /// Normalize one raw record into a canonical transaction.
    fn parse_transaction(&self, raw: &RawRecord) -> Result<Transaction, CoinfolioError> {
        self.classify(raw)?;
        let (buy, sell) = self.coins_amounts(raw)?;
        if buy.is_none() && sell.is_none() {
            return Err(CoinfolioError::MalformedRecord {
                exchange: self.exchange_name().to_string(),
                reason: "record moves no coin".to_string(),
            });
        }
        Ok(Transaction {
            buy,
            sell,
            date: self.date(raw)?,
            successful: self.is_successful(raw),
            commission: self.commission(raw),
            source_exchange: self.exchange_name().to_string(),
        })
    }

    /// Normalize a full batch in one pass. Per-record failures are skipped
    /// and recorded, never fatal to the rest of the batch; an empty
    /// surviving set fails with [`CoinfolioError::EmptyHistory`].
    fn build_exchange(&self, records: &[RawRecord]) -> Result<ExchangeBuild, CoinfolioError> {
        let mut transactions = Vec::new();
        let mut skipped = Vec::new();

        for (index, raw) in records.iter().enumerate() {
            match self.parse_transaction(raw) {
                Ok(transaction) => transactions.push(transaction),
                Err(reason) => {
                    eprintln!(
                        "Warning: skipping {} record {} ({})",
                        self.exchange_name(),
                        index,
                        reason
                    );
                    skipped.push(SkippedRecord { index, reason });
                }
            }
        }

        let exchange = CryptoExchange::new(self.exchange_name(), transactions)?;
        Ok(ExchangeBuild { exchange, skipped })
    }
}
