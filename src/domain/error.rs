//! Domain error types.

/// Top-level error type for coinfolio.
#[derive(Debug, thiserror::Error)]
pub enum CoinfolioError {
    #[error("{exchange}: record matches no known shape ({detail})")]
    Unclassifiable { exchange: String, detail: String },

    #[error("{exchange}: malformed record: {reason}")]
    MalformedRecord { exchange: String, reason: String },

    #[error("exchange {exchange} has no transactions")]
    EmptyHistory { exchange: String },

    #[error("cannot read balance snapshot {path}: {reason}")]
    SnapshotRead { path: String, reason: String },

    #[error("cannot read export {path}: {reason}")]
    ExportRead { path: String, reason: String },

    #[error("unknown exchange: {name}")]
    UnknownExchange { name: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&CoinfolioError> for std::process::ExitCode {
    fn from(err: &CoinfolioError) -> Self {
        let code: u8 = match err {
            CoinfolioError::Io(_) => 1,
            CoinfolioError::ConfigParse { .. } | CoinfolioError::ConfigInvalid { .. } => 2,
            CoinfolioError::ExportRead { .. } | CoinfolioError::UnknownExchange { .. } => 3,
            CoinfolioError::Unclassifiable { .. } | CoinfolioError::MalformedRecord { .. } => 4,
            CoinfolioError::EmptyHistory { .. } => 5,
            CoinfolioError::SnapshotRead { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
