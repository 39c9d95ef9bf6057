//! Raw record loading from exchange export files.
//!
//! Exchanges export either JSON (an array of records, or an object mapping
//! account names to record arrays, as Coinbase does) or CSV with a header
//! row. Everything is loaded into [`RawRecord`]s; CSV cells stay strings,
//! which the tolerant field accessors parse on demand.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use crate::domain::error::CoinfolioError;
use crate::domain::raw::RawRecord;
use crate::domain::table::PriceTable;

fn export_error(path: &Path, reason: impl ToString) -> CoinfolioError {
    CoinfolioError::ExportRead {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Load one export file, dispatching on the file extension.
pub fn load_records(path: &Path) -> Result<Vec<RawRecord>, CoinfolioError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json(path),
        Some("csv") => load_csv(path),
        other => Err(export_error(
            path,
            format!("unsupported export format {other:?}"),
        )),
    }
}

fn load_json(path: &Path) -> Result<Vec<RawRecord>, CoinfolioError> {
    let file = File::open(path).map_err(|e| export_error(path, e))?;
    let value: Value = serde_json::from_reader(file).map_err(|e| export_error(path, e))?;

    let mut records = Vec::new();
    match value {
        Value::Array(items) => collect_objects(path, items, &mut records)?,
        Value::Object(groups) => {
            // account name -> record array
            for (account, group) in groups {
                match group {
                    Value::Array(items) => collect_objects(path, items, &mut records)?,
                    _ => {
                        return Err(export_error(
                            path,
                            format!("account `{account}` does not hold a record array"),
                        ));
                    }
                }
            }
        }
        _ => return Err(export_error(path, "top-level value is not array or object")),
    }
    Ok(records)
}

fn collect_objects(
    path: &Path,
    items: Vec<Value>,
    records: &mut Vec<RawRecord>,
) -> Result<(), CoinfolioError> {
    for item in items {
        match item {
            Value::Object(record) => records.push(record),
            _ => return Err(export_error(path, "record is not a JSON object")),
        }
    }
    Ok(())
}

fn load_csv(path: &Path) -> Result<Vec<RawRecord>, CoinfolioError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| export_error(path, e))?;
    let headers = reader
        .headers()
        .map_err(|e| export_error(path, e))?
        .clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| export_error(path, e))?;
        let record: RawRecord = headers
            .iter()
            .zip(row.iter())
            .map(|(header, cell)| (header.to_string(), Value::String(cell.to_string())))
            .collect();
        records.push(record);
    }
    Ok(records)
}

/// Load a date-indexed price table: a JSON array of snapshots, each with a
/// RFC 3339 `date` field and one numeric field per coin.
pub fn load_price_table(
    path: &Path,
    max_error: Duration,
) -> Result<PriceTable, CoinfolioError> {
    let file = File::open(path).map_err(|e| export_error(path, e))?;
    let snapshots: Vec<RawRecord> =
        serde_json::from_reader(file).map_err(|e| export_error(path, e))?;

    let mut entries = Vec::with_capacity(snapshots.len());
    for snapshot in snapshots {
        let date_text = snapshot
            .get("date")
            .and_then(Value::as_str)
            .ok_or_else(|| export_error(path, "price snapshot has no `date`"))?;
        let date: DateTime<Utc> = DateTime::parse_from_rfc3339(date_text)
            .map_err(|e| export_error(path, e))?
            .with_timezone(&Utc);

        let prices: HashMap<String, f64> = snapshot
            .iter()
            .filter(|(key, _)| key.as_str() != "date")
            .filter_map(|(coin, value)| value.as_f64().map(|v| (coin.clone(), v)))
            .collect();
        entries.push((date, prices));
    }
    Ok(PriceTable::new(entries, max_error))
}
