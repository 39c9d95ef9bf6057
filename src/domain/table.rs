//! Date-indexed lookup tables with bounded nearest-match semantics.

use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap};

/// Sorted-by-date table of records supporting bounded nearest-neighbor
/// lookup: a query returns the closest entry only if it lies within
/// `max_error` of the queried date, else nothing.
///
/// Built once from a finite record set; read-only thereafter.
#[derive(Debug, Clone)]
pub struct DateIndexedTable<T> {
    content: BTreeMap<DateTime<Utc>, T>,
    max_error: Duration,
}

impl<T> DateIndexedTable<T> {
    /// Duplicate date keys keep the last entry seen.
    pub fn new(
        entries: impl IntoIterator<Item = (DateTime<Utc>, T)>,
        max_error: Duration,
    ) -> Self {
        Self {
            content: entries.into_iter().collect(),
            max_error,
        }
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Indexed dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.content.keys().copied()
    }

    /// The record nearest to `date`, if within `max_error` (inclusive).
    ///
    /// Candidates are the entries immediately at-or-before and at-or-after
    /// `date`; a missing neighbor counts as infinitely far. An exact key
    /// match has error zero and always hits.
    pub fn get_values_on(&self, date: DateTime<Utc>) -> Option<&T> {
        let before = self
            .content
            .range(..=date)
            .next_back()
            .map(|(d, v)| (date - *d, v));
        let after = self
            .content
            .range(date..)
            .next()
            .map(|(d, v)| (*d - date, v));

        let (error, value) = match (before, after) {
            (Some(b), Some(a)) => {
                if b.0 <= a.0 {
                    b
                } else {
                    a
                }
            }
            (Some(b), None) => b,
            (None, Some(a)) => a,
            (None, None) => return None,
        };

        if error <= self.max_error { Some(value) } else { None }
    }

    /// All records with `since <= date <= until`, ascending.
    pub fn get_values_between(
        &self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> impl Iterator<Item = &T> {
        self.content.range(since..=until).map(|(_, v)| v)
    }
}

/// Date-indexed `coin -> fiat value` price source.
#[derive(Debug, Clone)]
pub struct PriceTable {
    table: DateIndexedTable<HashMap<String, f64>>,
}

impl PriceTable {
    pub fn new(
        entries: impl IntoIterator<Item = (DateTime<Utc>, HashMap<String, f64>)>,
        max_error: Duration,
    ) -> Self {
        Self {
            table: DateIndexedTable::new(entries, max_error),
        }
    }

    /// Unit price of `coin` at `date`, `None` when no snapshot lies within
    /// tolerance or the snapshot does not quote the coin.
    pub fn price_of(&self, coin: &str, date: DateTime<Utc>) -> Option<f64> {
        self.table
            .get_values_on(date)
            .and_then(|prices| prices.get(coin))
            .copied()
    }
}
