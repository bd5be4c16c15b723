//! Query interface over the tracked star and download tables.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::analyzers::aggregate::{aggregate, stat_records, top_grower, total};
use crate::analyzers::growth::{GrowthBucket, bucket};
use crate::analyzers::types::StatRecord;
use crate::output::render;
use crate::selection::Selection;
use crate::table::{DatasetKind, Table};

/// Digest period; weekly compares against 7 days ago, monthly against 30.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Weekly,
    Monthly,
}

impl ReportPeriod {
    pub fn window_days(self) -> u32 {
        match self {
            ReportPeriod::Weekly => 7,
            ReportPeriod::Monthly => 30,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReportPeriod::Weekly => "Weekly",
            ReportPeriod::Monthly => "Monthly",
        }
    }
}

/// Both datasets of one data load, plus the date queries treat as today.
///
/// Tables are immutable for the lifetime of the dashboard; every query
/// recomputes from them. The active-column [`Selection`] is passed per call.
#[derive(Debug, Clone)]
pub struct Dashboard {
    stars: Table,
    downloads: Table,
    today: NaiveDate,
}

impl Dashboard {
    /// Creates a dashboard whose "today" is the current UTC date.
    pub fn new(stars: Table, downloads: Table) -> Self {
        Dashboard {
            stars,
            downloads,
            today: Utc::now().date_naive(),
        }
    }

    /// Pins the date used as "today" by every query.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn table(&self, kind: DatasetKind) -> &Table {
        match kind {
            DatasetKind::Stars => &self.stars,
            DatasetKind::Downloads => &self.downloads,
        }
    }

    /// Stat records for the active columns of `kind`, highest current value first.
    #[tracing::instrument(skip(self, selection), fields(today = %self.today))]
    pub fn stats(
        &self,
        kind: DatasetKind,
        selection: &Selection,
        window_days: u32,
    ) -> Vec<StatRecord> {
        let table = self.table(kind);
        let columns = self.active_columns(kind, selection);
        let records = aggregate(table, &columns, kind.metric(), window_days, self.today);
        debug!(records = records.len(), "Computed stats");
        records
    }

    /// Growth buckets for the given columns of `kind`.
    #[tracing::instrument(skip(self, columns), fields(columns = columns.len(), today = %self.today))]
    pub fn growth_buckets(
        &self,
        kind: DatasetKind,
        columns: &[String],
        window_days: u32,
    ) -> Vec<GrowthBucket> {
        let buckets = bucket(self.table(kind), columns, window_days, self.today);
        debug!(buckets = buckets.len(), "Computed growth buckets");
        buckets
    }

    /// Sum of the latest values of the active columns of `kind`.
    pub fn total(&self, kind: DatasetKind, selection: &Selection) -> f64 {
        let columns = self.active_columns(kind, selection);
        total(self.table(kind), &columns)
    }

    /// Active GitHub repository with the largest absolute star change.
    ///
    /// Ties go to the repository listed first in the selection.
    #[tracing::instrument(skip(self, selection), fields(today = %self.today))]
    pub fn top_grower(&self, selection: &Selection, window_days: u32) -> Option<StatRecord> {
        let kind = DatasetKind::Stars;
        let columns = self.active_columns(kind, selection);
        let records = stat_records(
            self.table(kind),
            &columns,
            kind.metric(),
            window_days,
            self.today,
        );
        top_grower(&records).cloned()
    }

    /// Plain-text digest of both datasets for `period`.
    #[tracing::instrument(skip(self, selection), fields(today = %self.today))]
    pub fn report(&self, selection: &Selection, period: ReportPeriod) -> String {
        let window_days = period.window_days();
        let github = self.stats(DatasetKind::Stars, selection, window_days);
        let pypi = self.stats(DatasetKind::Downloads, selection, window_days);
        render(&github, &pypi, period.label())
    }

    /// Selected columns of `kind` that exist in the table, in selection order.
    pub fn active_columns(&self, kind: DatasetKind, selection: &Selection) -> Vec<String> {
        let table = self.table(kind);
        selection
            .active(kind, table)
            .iter()
            .filter(|column| {
                let known = table.has_column(column);
                if !known {
                    warn!(dataset = ?kind, column = %column, "Selected column not in table, skipping");
                }
                known
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::DatedRow;

    #[test]
    fn test_report_period_windows() {
        assert_eq!(ReportPeriod::Weekly.window_days(), 7);
        assert_eq!(ReportPeriod::Monthly.window_days(), 30);
        assert_eq!(ReportPeriod::Monthly.label(), "Monthly");
    }

    #[test]
    fn test_with_today_pins_date() {
        let dashboard = dashboard();
        assert_eq!(dashboard.today(), date("2024-01-08"));
    }

    #[test]
    fn test_stats_respects_selection() {
        let dashboard = dashboard();
        let selection = Selection::all().with_active(DatasetKind::Stars, vec!["orgA/repoX".to_string()]);

        let records = dashboard.stats(DatasetKind::Stars, &selection, 7);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "orgA/repoX");
    }

    #[test]
    fn test_unknown_selected_columns_are_skipped() {
        let dashboard = dashboard();
        let selection = Selection::all().with_active(
            DatasetKind::Stars,
            vec!["orgZ/nope".to_string(), "orgB/repoY".to_string()],
        );

        let records = dashboard.stats(DatasetKind::Stars, &selection, 7);
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["orgB/repoY"]);
    }

    #[test]
    fn test_active_columns_drop_unknown() {
        let dashboard = dashboard();
        let selection = Selection::all().with_active(
            DatasetKind::Stars,
            vec!["orgZ/nope".to_string(), "orgA/repoX".to_string()],
        );

        let columns = dashboard.active_columns(DatasetKind::Stars, &selection);
        assert_eq!(columns, vec!["orgA/repoX".to_string()]);

        let buckets = dashboard.growth_buckets(DatasetKind::Stars, &columns, 7);
        assert!(buckets.iter().all(|b| !b.growth.contains_key("orgZ/nope")));
        assert_eq!(
            dashboard.active_columns(DatasetKind::Downloads, &selection),
            vec!["pkg".to_string()]
        );
    }

    #[test]
    fn test_total_per_dataset() {
        let dashboard = dashboard();
        let selection = Selection::all();

        assert_eq!(dashboard.total(DatasetKind::Stars, &selection), 320.0);
        assert_eq!(dashboard.total(DatasetKind::Downloads, &selection), 40.0);
    }

    #[test]
    fn test_top_grower_follows_selection_order_on_tie() {
        let dashboard = dashboard();

        let forward = Selection::all();
        assert_eq!(
            dashboard.top_grower(&forward, 7).unwrap().name,
            "orgA/repoX"
        );

        let reversed = Selection::all().with_active(
            DatasetKind::Stars,
            vec!["orgB/repoY".to_string(), "orgA/repoX".to_string()],
        );
        assert_eq!(
            dashboard.top_grower(&reversed, 7).unwrap().name,
            "orgB/repoY"
        );
    }

    #[test]
    fn test_selection_is_not_modified() {
        let dashboard = dashboard();
        let selection = Selection::all().with_active(DatasetKind::Stars, vec!["orgB/repoY".to_string()]);
        let before = selection.clone();

        dashboard.stats(DatasetKind::Stars, &selection, 7);
        dashboard.report(&selection, ReportPeriod::Weekly);
        assert_eq!(selection, before);
    }

    #[test]
    fn test_growth_buckets() {
        let dashboard = dashboard();
        let columns = vec!["orgA/repoX".to_string()];

        let buckets = dashboard.growth_buckets(DatasetKind::Stars, &columns, 7);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].growth["orgA/repoX"], 10.0);
    }

    #[test]
    fn test_report_has_both_sections() {
        let dashboard = dashboard();

        let text = dashboard.report(&Selection::all(), ReportPeriod::Weekly);
        assert!(text.starts_with("Weekly Report\n"));
        assert!(text.contains("GitHub Stars"));
        assert!(text.contains("PyPI Downloads"));
        assert!(text.contains("pkg"));
    }

    // Helper functions for tests
    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn dashboard() -> Dashboard {
        let stars = Table::new(
            vec!["orgA/repoX".to_string(), "orgB/repoY".to_string()],
            vec![
                DatedRow::new(date("2024-01-01"))
                    .with_value("orgA/repoX", 100.0)
                    .with_value("orgB/repoY", 200.0),
                DatedRow::new(date("2024-01-08"))
                    .with_value("orgA/repoX", 110.0)
                    .with_value("orgB/repoY", 210.0),
            ],
        );
        let downloads = Table::new(
            vec!["pkg".to_string()],
            vec![
                DatedRow::new(date("2024-01-07")).with_value("pkg", 30.0),
                DatedRow::new(date("2024-01-08")).with_value("pkg", 40.0),
            ],
        );
        Dashboard::new(stars, downloads).with_today(date("2024-01-08"))
    }
}
