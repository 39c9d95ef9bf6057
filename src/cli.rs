//! CLI definition and dispatch.

use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_snapshot_adapter::JsonSnapshotAdapter;
use crate::adapters::parser_for;
use crate::adapters::record_loader::{load_price_table, load_records};
use crate::domain::coins::DEFAULT_FIAT;
use crate::domain::error::CoinfolioError;
use crate::domain::portfolio::Portfolio;
use crate::domain::wallet::Wallet;
use crate::ports::config_port::ConfigPort;
use crate::ports::snapshot_port::SnapshotStore;

/// Price snapshots further than this from a query date are not used.
const DEFAULT_PRICE_TOLERANCE_SECS: f64 = 7.0 * 86400.0;

#[derive(Parser, Debug)]
#[command(name = "coinfolio", about = "Multi-exchange crypto balance tracker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show current portfolio balances, optionally diffed against a
    /// previously saved snapshot
    Balance {
        /// Export files named after their exchange (e.g. binance.json)
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,
        /// Date-indexed price table (JSON)
        #[arg(short, long)]
        prices: PathBuf,
        /// Reference currency for valuation
        #[arg(long)]
        currency: Option<String>,
        /// Previous balance snapshot to diff against
        #[arg(long)]
        last: Option<PathBuf>,
        /// Where to persist the new balance snapshot
        #[arg(long)]
        save_to: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the portfolio's crypto/fiat value history as CSV
    History {
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,
        #[arg(short, long)]
        prices: PathBuf,
        #[arg(long)]
        currency: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Summarize parsed transactions per exchange
    Inspect {
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(&err)
        }
    }
}

fn dispatch(cli: Cli) -> Result<(), CoinfolioError> {
    match cli.command {
        Command::Balance {
            input,
            prices,
            currency,
            last,
            save_to,
            config,
        } => {
            let settings = Settings::load(config.as_deref(), currency)?;
            let prices = load_price_table(&prices, settings.price_tolerance)?;
            let portfolio = build_portfolio(&input)?;

            let last_store = last.map(JsonSnapshotAdapter::new);
            let save_store = save_to.map(JsonSnapshotAdapter::new);
            let report = portfolio.show_balance(
                &settings.currency,
                &prices,
                Utc::now(),
                last_store.as_ref().map(|s| s as &dyn SnapshotStore),
                save_store.as_ref().map(|s| s as &dyn SnapshotStore),
            )?;

            print_report(&report, &settings.currency);
            Ok(())
        }
        Command::History {
            input,
            prices,
            currency,
            config,
        } => {
            let settings = Settings::load(config.as_deref(), currency)?;
            let prices = load_price_table(&prices, settings.price_tolerance)?;
            let portfolio = build_portfolio(&input)?;

            let series = portfolio.crypto_fiat_balance(&settings.currency, &prices);
            println!("date,crypto,fiat");
            for ((date, crypto), fiat) in series
                .dates
                .iter()
                .zip(&series.crypto)
                .zip(&series.fiat)
            {
                println!("{},{:.3},{:.3}", date.to_rfc3339(), crypto, fiat);
            }
            Ok(())
        }
        Command::Inspect { input } => {
            for path in &input {
                let exchange = build_one_exchange(path)?.exchange;
                let coins = exchange.build_wallets().len();
                println!(
                    "{}: {} transactions across {} coins",
                    exchange.exchange_name,
                    exchange.transactions_count(),
                    coins
                );
                if let (Some(first), Some(last)) =
                    (exchange.first_transaction(), exchange.last_transaction())
                {
                    println!(
                        "  from {} to {}",
                        first.date.to_rfc3339(),
                        last.date.to_rfc3339()
                    );
                }
            }
            Ok(())
        }
    }
}

struct Settings {
    currency: String,
    price_tolerance: Duration,
}

impl Settings {
    /// Flag beats config file beats built-in default.
    fn load(config: Option<&Path>, currency_flag: Option<String>) -> Result<Self, CoinfolioError> {
        let config = match config {
            Some(path) => Some(FileConfigAdapter::from_file(path).map_err(|e| {
                CoinfolioError::ConfigParse {
                    file: path.display().to_string(),
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        let currency = currency_flag
            .or_else(|| {
                config
                    .as_ref()
                    .and_then(|c| c.get_string("portfolio", "currency"))
            })
            .unwrap_or_else(|| DEFAULT_FIAT.to_string());

        let tolerance_secs = config
            .as_ref()
            .map(|c| c.get_double("prices", "max_error_secs", DEFAULT_PRICE_TOLERANCE_SECS))
            .unwrap_or(DEFAULT_PRICE_TOLERANCE_SECS);
        if tolerance_secs < 0.0 {
            return Err(CoinfolioError::ConfigInvalid {
                section: "prices".to_string(),
                key: "max_error_secs".to_string(),
                reason: "must be >= 0".to_string(),
            });
        }

        Ok(Self {
            currency,
            price_tolerance: Duration::seconds(tolerance_secs as i64),
        })
    }
}

fn build_one_exchange(
    path: &Path,
) -> Result<crate::ports::parser_port::ExchangeBuild, CoinfolioError> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_lowercase();
    let parser = parser_for(&name).ok_or_else(|| CoinfolioError::UnknownExchange {
        name: name.clone(),
    })?;
    let records = load_records(path)?;
    let build = parser.build_exchange(&records)?;
    if !build.skipped.is_empty() {
        eprintln!(
            "Parsed {} of {} {} records",
            build.exchange.transactions_count(),
            build.exchange.transactions_count() + build.skipped.len(),
            name
        );
    }
    Ok(build)
}

fn build_portfolio(inputs: &[PathBuf]) -> Result<Portfolio, CoinfolioError> {
    let mut wallets: Vec<Wallet> = Vec::new();
    for path in inputs {
        let build = build_one_exchange(path)?;
        wallets.extend(build.exchange.build_wallets().into_values());
    }
    Ok(Portfolio::new(wallets, None))
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value:.3}"),
        None => "?".to_string(),
    }
}

fn print_report(report: &crate::domain::portfolio::BalanceReport, currency: &str) {
    println!("symbol  balance  value ({currency})  price  %");
    for entry in &report.balances {
        let delta = report
            .last
            .as_ref()
            .and_then(|diff| diff.coin_deltas.get(&entry.symbol))
            .map(|d| format!("  ({d:+.3})"))
            .unwrap_or_default();
        println!(
            "{}  {:.5}  {}  {}  {}{}",
            entry.symbol,
            entry.balance,
            fmt_opt(entry.value),
            fmt_opt(entry.price),
            fmt_opt(entry.percentage),
            delta
        );
    }
    println!("total: {:.3} {currency}", report.total);
    if let Some(diff) = &report.last {
        println!(
            "since {}: {:+.3} {currency} ({}%)",
            diff.taken_at.to_rfc3339(),
            diff.delta,
            fmt_opt(diff.percentage)
        );
    }
}
