use chrono::NaiveDate;

use crate::analyzers::change::change_of;
use crate::analyzers::streak::classify;
use crate::analyzers::types::StatRecord;
use crate::analyzers::utility::days_before;
use crate::table::{Metric, Table};

/// Builds the [`StatRecord`] for one column.
pub fn stat_record(
    table: &Table,
    column: &str,
    metric: Metric,
    window_days: u32,
    today: NaiveDate,
) -> StatRecord {
    let change = change_of(table, column, window_days, today);
    let streak = classify(table, column, metric, window_days, today);
    let since = (window_days > 0).then(|| days_before(today, window_days));

    StatRecord {
        name: column.to_string(),
        current: change.current,
        change_abs: change.abs,
        change_percent: change.percent,
        streak,
        series: table.series(column, since),
    }
}

/// Stat records for `columns`, in the order given.
pub fn stat_records(
    table: &Table,
    columns: &[String],
    metric: Metric,
    window_days: u32,
    today: NaiveDate,
) -> Vec<StatRecord> {
    columns
        .iter()
        .map(|column| stat_record(table, column, metric, window_days, today))
        .collect()
}

/// Stat records for `columns`, sorted by current value descending (absent as 0).
///
/// The sort is stable, so equal values keep the order of `columns`.
pub fn aggregate(
    table: &Table,
    columns: &[String],
    metric: Metric,
    window_days: u32,
    today: NaiveDate,
) -> Vec<StatRecord> {
    let mut records = stat_records(table, columns, metric, window_days, today);
    records.sort_by(|a, b| {
        b.current
            .unwrap_or(0.0)
            .total_cmp(&a.current.unwrap_or(0.0))
    });
    records
}

/// Record with the largest absolute change. On ties the earliest record wins.
pub fn top_grower(records: &[StatRecord]) -> Option<&StatRecord> {
    records.iter().fold(None, |best, record| match best {
        Some(best) if best.change_abs >= record.change_abs => Some(best),
        _ => Some(record),
    })
}

/// Sum of the latest value of each column, absent as 0.
pub fn total(table: &Table, columns: &[String]) -> f64 {
    columns
        .iter()
        .map(|column| table.latest(column).unwrap_or(0.0))
        .sum()
}
