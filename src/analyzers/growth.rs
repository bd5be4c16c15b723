//! Incremental growth series for charting.
//!
//! Rows inside the window are grouped into contiguous day/week/month buckets;
//! each bucket keeps the last present value per column, and consecutive
//! buckets are differenced into non-negative growth.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::analyzers::utility::days_before;
use crate::table::{DATE_FORMAT, Table};

/// Bucket width, derived from the window length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl Granularity {
    pub fn for_window(window_days: u32) -> Self {
        match window_days {
            0..=7 => Granularity::Day,
            8..=30 => Granularity::Week,
            _ => Granularity::Month,
        }
    }

    /// Bucket identity for `date`. Weeks start on Sunday.
    pub fn key(self, date: NaiveDate) -> String {
        match self {
            Granularity::Day => date.format(DATE_FORMAT).to_string(),
            Granularity::Week => week_start(date).format(DATE_FORMAT).to_string(),
            Granularity::Month => date.format("%Y-%m").to_string(),
        }
    }

    pub fn label(self, date: NaiveDate) -> String {
        match self {
            Granularity::Day => date.format("%b %-d").to_string(),
            Granularity::Week => format!("Week of {}", week_start(date).format("%b %-d")),
            Granularity::Month => date.format("%b %Y").to_string(),
        }
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    days_before(date, date.weekday().num_days_from_sunday())
}

/// One charted bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthBucket {
    pub key: String,
    pub label: String,
    /// Last present value of each column inside the bucket.
    pub latest: BTreeMap<String, f64>,
    /// `max(0, latest - previous bucket's latest)`, previous defaulting to 0.
    pub growth: BTreeMap<String, f64>,
}

/// Growth buckets for `columns` over `[today - window_days, today]`, or the
/// whole table when `window_days` is 0.
///
/// The first bucket only serves as the reference for the second, so the
/// result has one bucket fewer than there are distinct bucket keys. Fewer
/// than two rows in range yields an empty series.
pub fn bucket(
    table: &Table,
    columns: &[String],
    window_days: u32,
    today: NaiveDate,
) -> Vec<GrowthBucket> {
    let rows = if window_days > 0 {
        table.rows_between(days_before(today, window_days), today)
    } else {
        table.rows()
    };
    if rows.len() < 2 {
        return Vec::new();
    }

    let granularity = Granularity::for_window(window_days);

    // rows are sorted by the table, so equal keys are contiguous
    let mut buckets: Vec<GrowthBucket> = Vec::new();
    for row in rows {
        let key = granularity.key(row.date);
        if buckets.last().map(|b| &b.key) != Some(&key) {
            buckets.push(GrowthBucket {
                key,
                label: granularity.label(row.date),
                latest: BTreeMap::new(),
                growth: BTreeMap::new(),
            });
        }

        if let Some(open) = buckets.last_mut() {
            for column in columns {
                if let Some(value) = row.get(column) {
                    open.latest.insert(column.clone(), value);
                }
            }
        }
    }

    let growth: Vec<BTreeMap<String, f64>> = buckets
        .windows(2)
        .map(|pair| growth_between(&pair[0].latest, &pair[1].latest, columns))
        .collect();

    buckets
        .into_iter()
        .skip(1)
        .zip(growth)
        .map(|(mut bucket, growth)| {
            bucket.growth = growth;
            bucket
        })
        .collect()
}

fn growth_between(
    previous: &BTreeMap<String, f64>,
    current: &BTreeMap<String, f64>,
    columns: &[String],
) -> BTreeMap<String, f64> {
    columns
        .iter()
        .map(|column| {
            let before = previous.get(column).copied().unwrap_or(0.0);
            let after = current.get(column).copied().unwrap_or(0.0);
            (column.clone(), (after - before).max(0.0))
        })
        .collect()
}
