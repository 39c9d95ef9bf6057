//! Balance snapshot persistence port.

use crate::domain::error::CoinfolioError;
use crate::domain::portfolio::BalanceSnapshot;

/// Persisted balance snapshot access, the only cross-run state in the
/// system. Implementations own the on-disk encoding.
pub trait SnapshotStore {
    fn load(&self) -> Result<BalanceSnapshot, CoinfolioError>;

    fn save(&self, snapshot: &BalanceSnapshot) -> Result<(), CoinfolioError>;
}
