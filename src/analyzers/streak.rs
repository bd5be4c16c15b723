//! Multi-window momentum ("streak") classification.
//!
//! Gauge metrics (total stars) compare boundary values of three consecutive
//! windows ending at today, today - w and today - 2w. Additive metrics (daily
//! downloads) compare window sums instead and only look at two
//! period-over-period comparisons. Both share the threshold schedule from
//! [`threshold`] and the "most recent window first" priority order.

use chrono::NaiveDate;

use crate::analyzers::threshold::{threshold, window_label};
use crate::analyzers::types::{StreakResult, StreakSymbol};
use crate::analyzers::utility::{days_before, percent_change};
use crate::table::{DATE_FORMAT, Metric, Table};

/// Classification of a single window against the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WindowTrend {
    Growth,
    Decline,
    Stagnant,
}

impl WindowTrend {
    fn from_percent(percent: f64, threshold: f64) -> Self {
        if percent >= threshold {
            WindowTrend::Growth
        } else if percent <= -threshold {
            WindowTrend::Decline
        } else {
            WindowTrend::Stagnant
        }
    }
}

/// Classifies `column` with the strategy that matches `metric`.
pub fn classify(
    table: &Table,
    column: &str,
    metric: Metric,
    window_days: u32,
    today: NaiveDate,
) -> StreakResult {
    match metric {
        Metric::Gauge => classify_gauge(table, column, window_days, today),
        Metric::Additive => classify_additive(table, column, window_days, today),
    }
}

/// Three-window classification for point-in-time counters.
///
/// Window `i` (0 = most recent) ends at `today - i * w` and starts `w` days
/// earlier; each boundary reads the last row on or before it. A window missing
/// either boundary value is dropped, and the rules below run over the
/// remaining windows, most recent first. First match wins:
///
/// 1. no window evaluated: insufficient data
/// 2. every evaluated window grew: triple up
/// 3. the first two evaluated windows grew: double up
/// 4. the first evaluated window grew: single up
/// 5. the first evaluated window declined: single down
/// 6. at least two windows declined: double down
/// 7. otherwise flat
pub fn classify_gauge(
    table: &Table,
    column: &str,
    window_days: u32,
    today: NaiveDate,
) -> StreakResult {
    let threshold = threshold(window_days);
    let label = window_label(window_days);
    let window_end = |i: u32| days_before(today, window_days.saturating_mul(i));

    // (position, trend) of each evaluable window, most recent first
    let windows: Vec<(u32, WindowTrend)> = (0..3)
        .filter_map(|i| {
            let end = window_end(i);
            let to = table.value_on_or_before(column, end)?;
            let from = table.value_on_or_before(column, days_before(end, window_days))?;
            Some((i, WindowTrend::from_percent(percent_change(from, to), threshold)))
        })
        .collect();

    let Some(&(first, first_trend)) = windows.first() else {
        return StreakResult::new(
            StreakSymbol::InsufficientData,
            format!("Not enough history for a {label} comparison (threshold {threshold:.1}%)"),
        );
    };

    let grew = |w: &(u32, WindowTrend)| w.1 == WindowTrend::Growth;
    let declines = windows
        .iter()
        .filter(|w| w.1 == WindowTrend::Decline)
        .count();
    let evaluated = windows.len();
    let latest = if first == 0 {
        format!("the last {label} window")
    } else {
        format!(
            "the {label} window ending {}",
            window_end(first).format(DATE_FORMAT)
        )
    };

    let (symbol, rationale) = if windows.iter().all(grew) {
        let scope = match evaluated {
            1 => format!("{latest}, the only one with data"),
            3 => format!("each of the last 3 {label} windows"),
            n => format!("each of the {n} {label} windows with data"),
        };
        (StreakSymbol::TripleUp, format!("Grew ≥{threshold:.1}% in {scope}"))
    } else if windows.iter().take(2).filter(|w| grew(*w)).count() == 2 {
        (
            StreakSymbol::DoubleUp,
            format!("Grew ≥{threshold:.1}% in each of the last 2 {label} windows"),
        )
    } else if first_trend == WindowTrend::Growth {
        (
            StreakSymbol::SingleUp,
            format!("Grew ≥{threshold:.1}% in {latest}"),
        )
    } else if first_trend == WindowTrend::Decline {
        (
            StreakSymbol::SingleDown,
            format!("Declined ≥{threshold:.1}% in {latest}"),
        )
    } else if declines >= 2 {
        (
            StreakSymbol::DoubleDown,
            format!("Declined ≥{threshold:.1}% in {declines} of the {evaluated} {label} windows with data"),
        )
    } else {
        (
            StreakSymbol::Flat,
            format!("No move beyond ±{threshold:.1}% in {latest}"),
        )
    };

    StreakResult::new(symbol, rationale)
}

/// Two-comparison classification for per-period counts.
///
/// Sums the column over the half-open windows `(end - w, end]` for the three
/// most recent windows and compares current vs previous and previous vs the
/// one before. Both comparisons growing is a double up; otherwise the most
/// recent comparison alone decides. Two empty recent windows mean
/// insufficient data.
pub fn classify_additive(
    table: &Table,
    column: &str,
    window_days: u32,
    today: NaiveDate,
) -> StreakResult {
    let threshold = threshold(window_days);
    let label = window_label(window_days);

    let sums: [f64; 3] = std::array::from_fn(|i| {
        let through = days_before(today, window_days.saturating_mul(i as u32));
        let after = days_before(through, window_days);
        table.sum_within(column, after, through)
    });

    if sums[0] == 0.0 && sums[1] == 0.0 {
        return StreakResult::new(
            StreakSymbol::InsufficientData,
            format!("No activity in the last two {label} windows (threshold {threshold:.1}%)"),
        );
    }

    let recent = WindowTrend::from_percent(percent_change(sums[1], sums[0]), threshold);
    let prior = WindowTrend::from_percent(percent_change(sums[2], sums[1]), threshold);

    let (symbol, rationale) = match (recent, prior) {
        (WindowTrend::Growth, WindowTrend::Growth) => (
            StreakSymbol::DoubleUp,
            format!("Total up ≥{threshold:.1}% {label} over {label}, twice in a row"),
        ),
        (WindowTrend::Growth, _) => (
            StreakSymbol::SingleUp,
            format!("Total up ≥{threshold:.1}% {label} over {label}"),
        ),
        (WindowTrend::Decline, _) => (
            StreakSymbol::SingleDown,
            format!("Total down ≥{threshold:.1}% {label} over {label}"),
        ),
        (WindowTrend::Stagnant, _) => (
            StreakSymbol::Flat,
            format!("Total within ±{threshold:.1}% {label} over {label}"),
        ),
    };

    StreakResult::new(symbol, rationale)
}
