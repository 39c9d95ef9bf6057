//! JSON file implementation of the balance snapshot store.

use std::fs;
use std::path::PathBuf;

use crate::domain::error::CoinfolioError;
use crate::domain::portfolio::BalanceSnapshot;
use crate::ports::snapshot_port::SnapshotStore;

pub struct JsonSnapshotAdapter {
    path: PathBuf,
}

impl JsonSnapshotAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_error(&self, reason: impl ToString) -> CoinfolioError {
        CoinfolioError::SnapshotRead {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl SnapshotStore for JsonSnapshotAdapter {
    fn load(&self) -> Result<BalanceSnapshot, CoinfolioError> {
        let content = fs::read_to_string(&self.path).map_err(|e| self.read_error(e))?;
        serde_json::from_str(&content).map_err(|e| self.read_error(e))
    }

    fn save(&self, snapshot: &BalanceSnapshot) -> Result<(), CoinfolioError> {
        let content = serde_json::to_string_pretty(snapshot)
            .map_err(|e| CoinfolioError::Io(std::io::Error::other(e)))?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}
