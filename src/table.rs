//! Date-indexed numeric tables.
//!
//! A [`Table`] holds one tracked dataset (GitHub stars or PyPI downloads) as
//! one [`DatedRow`] per snapshot day and one column per repository/package.
//! Rows are kept sorted ascending by date and dates are unique, so every
//! date-dependent lookup can binary-search.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Date format used by snapshot files and bucket keys.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which tracked dataset a table holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Stars,
    Downloads,
}

/// How values of a dataset accumulate over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Point-in-time running total (total stars); change is a value difference.
    Gauge,
    /// Per-period count (daily downloads); change is a sum-over-period difference.
    Additive,
}

impl DatasetKind {
    pub fn metric(self) -> Metric {
        match self {
            DatasetKind::Stars => Metric::Gauge,
            DatasetKind::Downloads => Metric::Additive,
        }
    }

    /// Section title used in the text report.
    pub fn title(self) -> &'static str {
        match self {
            DatasetKind::Stars => "GitHub Stars",
            DatasetKind::Downloads => "PyPI Downloads",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            DatasetKind::Stars => "stars",
            DatasetKind::Downloads => "downloads",
        }
    }
}

/// One snapshot day. A column missing from `values` is absent, not zero.
#[derive(Debug, Clone, PartialEq)]
pub struct DatedRow {
    pub date: NaiveDate,
    values: HashMap<String, f64>,
}

impl DatedRow {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            values: HashMap::new(),
        }
    }

    /// Sets `column` to `value` on this row.
    pub fn with_value(mut self, column: &str, value: f64) -> Self {
        self.values.insert(column.to_string(), value);
        self
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }
}

/// Immutable, date-sorted table of snapshot rows.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<DatedRow>,
}

impl Table {
    /// Builds a table from typed rows.
    ///
    /// Rows are sorted ascending by date. When the same date appears more than
    /// once the later row wins, matching how a re-recorded snapshot replaces the
    /// earlier one. Values for columns outside `columns` are discarded.
    pub fn new(columns: Vec<String>, rows: impl IntoIterator<Item = DatedRow>) -> Self {
        let mut rows: Vec<DatedRow> = {
            let declared: HashSet<&str> = columns.iter().map(String::as_str).collect();
            rows.into_iter()
                .map(|mut row| {
                    row.values.retain(|column, _| declared.contains(column.as_str()));
                    row
                })
                .collect()
        };

        // stable, so duplicate dates keep input order and the last one survives below
        rows.sort_by_key(|row| row.date);

        let mut unique: Vec<DatedRow> = Vec::with_capacity(rows.len());
        for row in rows {
            match unique.last_mut() {
                Some(last) if last.date == row.date => {
                    debug!(date = %row.date, "Duplicate date, keeping the later row");
                    *last = row;
                }
                _ => unique.push(row),
            }
        }

        Self {
            columns,
            rows: unique,
        }
    }

    /// Builds a table from raw `(date, cells)` pairs as handed over by a parser.
    ///
    /// `cells[i]` belongs to `columns[i]`; `None` is an absent value. Rows whose
    /// date is blank or not `YYYY-MM-DD` are dropped silently (upstream files may
    /// carry blank trailing rows).
    pub fn from_raw<I, S>(columns: Vec<String>, rows: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<Option<f64>>)>,
        S: AsRef<str>,
    {
        let mut dropped = 0usize;
        let typed: Vec<DatedRow> = rows
            .into_iter()
            .filter_map(|(date, cells)| {
                let date = date.as_ref().trim();
                let Ok(date) = NaiveDate::parse_from_str(date, DATE_FORMAT) else {
                    dropped += 1;
                    return None;
                };

                let mut row = DatedRow::new(date);
                for (column, cell) in columns.iter().zip(cells) {
                    if let Some(value) = cell {
                        row.values.insert(column.clone(), value);
                    }
                }
                Some(row)
            })
            .collect();

        if dropped > 0 {
            debug!(dropped, "Dropped rows without a valid date");
        }

        Self::new(columns, typed)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in ascending date order.
    pub fn rows(&self) -> &[DatedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|row| row.date)
    }

    /// Value in the most recent row where `column` is present.
    pub fn latest(&self, column: &str) -> Option<f64> {
        self.rows.iter().rev().find_map(|row| row.get(column))
    }

    /// The last row dated on or before `date`.
    pub fn row_on_or_before(&self, date: NaiveDate) -> Option<&DatedRow> {
        let idx = self.rows.partition_point(|row| row.date <= date);
        idx.checked_sub(1).map(|i| &self.rows[i])
    }

    /// `column` as read from [`Table::row_on_or_before`]. Absent when there is
    /// no such row or that row lacks the column.
    pub fn value_on_or_before(&self, column: &str, date: NaiveDate) -> Option<f64> {
        self.row_on_or_before(date)?.get(column)
    }

    /// Rows with `from <= date <= to`.
    pub fn rows_between(&self, from: NaiveDate, to: NaiveDate) -> &[DatedRow] {
        let start = self.rows.partition_point(|row| row.date < from);
        let end = self.rows.partition_point(|row| row.date <= to);
        if start >= end {
            return &[];
        }
        &self.rows[start..end]
    }

    /// Sum of `column` over rows with `after < date <= through`, absent as zero.
    pub fn sum_within(&self, column: &str, after: NaiveDate, through: NaiveDate) -> f64 {
        self.rows
            .iter()
            .filter(|row| row.date > after && row.date <= through)
            .filter_map(|row| row.get(column))
            .sum()
    }

    /// Chronological present values of `column`, optionally from `since` onwards.
    pub fn series(&self, column: &str, since: Option<NaiveDate>) -> Vec<f64> {
        let start = match since {
            Some(since) => self.rows.partition_point(|row| row.date < since),
            None => 0,
        };
        self.rows[start..]
            .iter()
            .filter_map(|row| row.get(column))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sorts_rows_by_date() {
        let table = Table::new(
            cols(&["a"]),
            vec![
                DatedRow::new(date("2024-01-03")).with_value("a", 3.0),
                DatedRow::new(date("2024-01-01")).with_value("a", 1.0),
                DatedRow::new(date("2024-01-02")).with_value("a", 2.0),
            ],
        );

        let dates: Vec<_> = table.rows().iter().map(|r| r.date).collect();
        assert_eq!(
            dates,
            vec![date("2024-01-01"), date("2024-01-02"), date("2024-01-03")]
        );
    }

    #[test]
    fn test_duplicate_date_keeps_later_row() {
        let table = Table::new(
            cols(&["a"]),
            vec![
                DatedRow::new(date("2024-01-01")).with_value("a", 1.0),
                DatedRow::new(date("2024-01-01")).with_value("a", 5.0),
            ],
        );

        assert_eq!(table.len(), 1);
        assert_eq!(table.latest("a"), Some(5.0));
    }

    #[test]
    fn test_undeclared_columns_are_discarded() {
        let table = Table::new(
            cols(&["a"]),
            vec![
                DatedRow::new(date("2024-01-01"))
                    .with_value("a", 1.0)
                    .with_value("b", 2.0),
            ],
        );

        assert_eq!(table.latest("b"), None);
        assert!(!table.has_column("b"));
    }

    #[test]
    fn test_from_raw_drops_rows_without_date() {
        let table = Table::from_raw(
            cols(&["a", "b"]),
            vec![
                ("2024-01-01", vec![Some(1.0), None]),
                ("", vec![Some(9.0), Some(9.0)]),
                ("not-a-date", vec![Some(9.0), Some(9.0)]),
                (" 2024-01-02 ", vec![Some(2.0), Some(4.0)]),
            ],
        );

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].get("b"), None);
        assert_eq!(table.latest("b"), Some(4.0));
    }

    #[test]
    fn test_latest_skips_absent_values() {
        let table = Table::new(
            cols(&["a"]),
            vec![
                DatedRow::new(date("2024-01-01")).with_value("a", 10.0),
                DatedRow::new(date("2024-01-02")),
            ],
        );

        assert_eq!(table.latest("a"), Some(10.0));
        assert_eq!(table.latest("missing"), None);
    }

    #[test]
    fn test_value_on_or_before() {
        let table = Table::new(
            cols(&["a"]),
            vec![
                DatedRow::new(date("2024-01-01")).with_value("a", 1.0),
                DatedRow::new(date("2024-01-05")).with_value("a", 5.0),
                DatedRow::new(date("2024-01-07")),
            ],
        );

        assert_eq!(table.value_on_or_before("a", date("2023-12-31")), None);
        assert_eq!(table.value_on_or_before("a", date("2024-01-01")), Some(1.0));
        assert_eq!(table.value_on_or_before("a", date("2024-01-04")), Some(1.0));
        assert_eq!(table.value_on_or_before("a", date("2024-01-06")), Some(5.0));
        // the last row on or before the date lacks the column
        assert_eq!(table.value_on_or_before("a", date("2024-01-08")), None);
    }

    #[test]
    fn test_rows_between_is_inclusive() {
        let table = daily(&["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04"]);

        assert_eq!(
            table
                .rows_between(date("2024-01-02"), date("2024-01-03"))
                .len(),
            2
        );
        assert!(
            table
                .rows_between(date("2024-01-04"), date("2024-01-02"))
                .is_empty()
        );
    }

    #[test]
    fn test_sum_within_is_half_open() {
        let table = daily(&["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04"]);

        // values are 1, 2, 3, 4; (01-01, 01-03] covers 2 + 3
        assert_eq!(
            table.sum_within("a", date("2024-01-01"), date("2024-01-03")),
            5.0
        );
    }

    #[test]
    fn test_series_drops_absent_and_clips() {
        let table = Table::new(
            cols(&["a"]),
            vec![
                DatedRow::new(date("2024-01-01")).with_value("a", 1.0),
                DatedRow::new(date("2024-01-02")),
                DatedRow::new(date("2024-01-03")).with_value("a", 3.0),
            ],
        );

        assert_eq!(table.series("a", None), vec![1.0, 3.0]);
        assert_eq!(table.series("a", Some(date("2024-01-02"))), vec![3.0]);
    }

    // Helper functions for tests
    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn daily(dates: &[&str]) -> Table {
        let rows = dates
            .iter()
            .enumerate()
            .map(|(i, d)| DatedRow::new(date(d)).with_value("a", (i + 1) as f64));
        Table::new(cols(&["a"]), rows)
    }
}
