//! Raw exchange records and tolerant field access.
//!
//! Exports are opaque JSON objects with no shared schema; adapters alone
//! know their shape. Numeric fields arrive as numbers or as strings
//! depending on the exchange, so the accessors accept both.

use serde_json::{Map, Value};

/// One raw record as exported by an exchange. Never mutated after ingestion.
pub type RawRecord = Map<String, Value>;

pub fn get_str<'a>(raw: &'a RawRecord, field: &str) -> Option<&'a str> {
    raw.get(field).and_then(Value::as_str)
}

pub fn get_f64(raw: &RawRecord, field: &str) -> Option<f64> {
    match raw.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn get_i64(raw: &RawRecord, field: &str) -> Option<i64> {
    match raw.get(field)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn get_bool(raw: &RawRecord, field: &str) -> Option<bool> {
    match raw.get(field)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.to_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub fn get_object<'a>(raw: &'a RawRecord, field: &str) -> Option<&'a RawRecord> {
    raw.get(field).and_then(Value::as_object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> RawRecord {
        json!({
            "symbol": "ETHBTC",
            "qty": "8.51",
            "time": 1499865549590i64,
            "isBuyer": true,
            "status": "6",
            "details": { "transfer_type": "deposit" }
        })
        .as_object()
        .unwrap()
        .clone()
    }

    #[test]
    fn str_field() {
        let raw = sample_record();
        assert_eq!(get_str(&raw, "symbol"), Some("ETHBTC"));
        assert_eq!(get_str(&raw, "time"), None);
        assert_eq!(get_str(&raw, "missing"), None);
    }

    #[test]
    fn f64_accepts_numbers_and_strings() {
        let raw = sample_record();
        assert_eq!(get_f64(&raw, "qty"), Some(8.51));
        assert_eq!(get_f64(&raw, "time"), Some(1499865549590.0));
        assert_eq!(get_f64(&raw, "symbol"), None);
    }

    #[test]
    fn i64_accepts_numbers_and_strings() {
        let raw = sample_record();
        assert_eq!(get_i64(&raw, "time"), Some(1499865549590));
        assert_eq!(get_i64(&raw, "status"), Some(6));
    }

    #[test]
    fn bool_field() {
        let raw = sample_record();
        assert_eq!(get_bool(&raw, "isBuyer"), Some(true));
        assert_eq!(get_bool(&raw, "symbol"), None);
    }

    #[test]
    fn nested_object() {
        let raw = sample_record();
        let details = get_object(&raw, "details").unwrap();
        assert_eq!(get_str(details, "transfer_type"), Some("deposit"));
        assert!(get_object(&raw, "qty").is_none());
    }
}
