use chrono::NaiveDate;

use crate::analyzers::types::Change;
use crate::analyzers::utility::{days_before, percent_change};
use crate::table::Table;

/// Change of `column` over the last `window_days` as seen from `today`.
///
/// `current` is the most recent present value. `previous` is read from the
/// last row dated on or before `today - window_days`; `today` is a calendar
/// date, not the table's last date, so a stale table understates change.
/// When `previous` is absent or zero the absolute change is the current value
/// and the percent change is 0.
pub fn change_of(table: &Table, column: &str, window_days: u32, today: NaiveDate) -> Change {
    let current = table.latest(column);
    let previous = table.value_on_or_before(column, days_before(today, window_days));

    let (abs, percent) = match (current, previous) {
        (Some(cur), Some(prev)) if prev != 0.0 => (cur - prev, percent_change(prev, cur)),
        _ => (current.unwrap_or(0.0), 0.0),
    };

    Change {
        current,
        previous,
        abs,
        percent,
    }
}
