//! Exchange-level transaction grouping and wallet derivation.

use std::collections::HashMap;

use super::error::CoinfolioError;
use super::transaction::Transaction;
use super::wallet::Wallet;

/// All normalized transactions of one exchange.
#[derive(Debug, Clone)]
pub struct CryptoExchange {
    pub exchange_name: String,
    pub transactions: Vec<Transaction>,
}

impl CryptoExchange {
    /// Fails with [`CoinfolioError::EmptyHistory`] on an empty batch; an
    /// exchange with no past transaction is meaningless.
    pub fn new(
        exchange_name: &str,
        transactions: Vec<Transaction>,
    ) -> Result<Self, CoinfolioError> {
        if transactions.is_empty() {
            return Err(CoinfolioError::EmptyHistory {
                exchange: exchange_name.to_string(),
            });
        }
        Ok(Self {
            exchange_name: exchange_name.to_string(),
            transactions,
        })
    }

    pub fn transactions_count(&self) -> usize {
        self.transactions.len()
    }

    /// Transactions matching `predicate`, lazily, in arrival order.
    pub fn get_transactions<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = &'a Transaction>
    where
        P: Fn(&Transaction) -> bool + 'a,
    {
        self.transactions.iter().filter(move |t| predicate(t))
    }

    /// Earliest transaction by date; ties go to the first encountered.
    pub fn first_transaction(&self) -> Option<&Transaction> {
        self.transactions.iter().min_by_key(|t| t.date)
    }

    /// Latest transaction by date; ties go to the first encountered.
    pub fn last_transaction(&self) -> Option<&Transaction> {
        let mut last: Option<&Transaction> = None;
        for transaction in &self.transactions {
            match last {
                Some(current) if transaction.date <= current.date => {}
                _ => last = Some(transaction),
            }
        }
        last
    }

    /// One wallet per coin touched by the successful transactions. A trade
    /// lands in both touched coins' wallets, since each wallet tracks only
    /// its own currency's in/out flow.
    pub fn build_wallets(&self) -> HashMap<String, Wallet> {
        let mut wallets: HashMap<String, Wallet> = HashMap::new();
        for transaction in self.get_transactions(|t| t.successful) {
            for coin in transaction.coins() {
                wallets
                    .entry(coin.to_string())
                    .or_insert_with(|| Wallet::new(coin))
                    .add_transaction(transaction.clone());
            }
        }
        wallets
    }
}
