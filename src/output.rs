//! Output formatting for stat records.
//!
//! Renders the fixed-width plain-text digest, pretty JSON, and CSV exports.

use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use tracing::debug;

use crate::analyzers::types::{StatRecord, StreakSymbol};
use crate::table::DatasetKind;

/// Name column width for GitHub repositories (org stripped).
pub const STARS_NAME_WIDTH: usize = 20;
/// Name column width for PyPI packages.
pub const DOWNLOADS_NAME_WIDTH: usize = 25;
pub const VALUE_WIDTH: usize = 10;
pub const CHANGE_WIDTH: usize = 18;

/// Display convention for the banner, independent of per-window thresholds.
const BANNER_THRESHOLDS: &str = "↗ >2.5%, ↘ <−2.5%";

/// Renders the plain-text digest for both datasets.
///
/// Sections without records are left out. Every row has the same column
/// layout regardless of content, so the text can be pasted as-is.
pub fn render(github: &[StatRecord], pypi: &[StatRecord], period_label: &str) -> String {
    let mut lines = vec![
        format!("{period_label} Report"),
        format!("Trend: {BANNER_THRESHOLDS}"),
    ];

    for (kind, records) in [(DatasetKind::Stars, github), (DatasetKind::Downloads, pypi)] {
        if records.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(kind.title().to_string());
        lines.extend(table_lines(kind, records));
    }

    lines.push(String::new());
    lines.push(summary_line(github, pypi));

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Renders one dataset as a header line plus one row per record.
pub fn render_table(kind: DatasetKind, records: &[StatRecord]) -> String {
    let mut text = table_lines(kind, records).join("\n");
    text.push('\n');
    text
}

fn table_lines(kind: DatasetKind, records: &[StatRecord]) -> Vec<String> {
    let (name_width, name_header, value_header) = match kind {
        DatasetKind::Stars => (STARS_NAME_WIDTH, "Repository", "Stars"),
        DatasetKind::Downloads => (DOWNLOADS_NAME_WIDTH, "Package", "Downloads"),
    };

    let mut lines = vec![format!(
        "{}{}{}Trend",
        fit(name_header, name_width),
        fit(value_header, VALUE_WIDTH),
        fit("Change", CHANGE_WIDTH)
    )];

    for record in records {
        let value = match record.current {
            Some(current) => format_compact(current),
            None => StreakSymbol::InsufficientData.glyph().to_string(),
        };
        lines.push(format!(
            "{}{}{}{}",
            fit(display_name(kind, &record.name), name_width),
            fit(&value, VALUE_WIDTH),
            fit(
                &format_change(record.change_abs, record.change_percent),
                CHANGE_WIDTH
            ),
            record.streak.symbol.glyph()
        ));
    }

    lines
}

fn summary_line(github: &[StatRecord], pypi: &[StatRecord]) -> String {
    let sum = |records: &[StatRecord]| -> (f64, f64) {
        records.iter().fold((0.0, 0.0), |(total, change), r| {
            (total + r.current.unwrap_or(0.0), change + r.change_abs)
        })
    };
    let (stars, stars_change) = sum(github);
    let (downloads, downloads_change) = sum(pypi);

    format!(
        "Summary: {} {}, {} stars ({:+.0}); {} {}, {} downloads ({:+.0})",
        github.len(),
        plural(github.len(), "repository", "repositories"),
        format_compact(stars),
        stars_change,
        pypi.len(),
        plural(pypi.len(), "package", "packages"),
        format_compact(downloads),
        downloads_change
    )
}

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 { one } else { many }
}

/// Repository names drop their `org/` prefix; package names are shown as-is.
fn display_name(kind: DatasetKind, name: &str) -> &str {
    match kind {
        DatasetKind::Stars => name.rsplit('/').next().unwrap_or(name),
        DatasetKind::Downloads => name,
    }
}

/// Formats a count with one decimal and a `k`/`M` suffix from a thousand up.
pub fn format_compact(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if magnitude >= 1_000.0 {
        format!("{:.1}k", value / 1_000.0)
    } else {
        format!("{value:.0}")
    }
}

/// Formats a change as `+N (+P.P%)`, e.g. `+282 (+0.8%)`, not `(+282 / +0.8%)`.
pub fn format_change(abs: f64, percent: f64) -> String {
    format!("{abs:+.0} ({percent:+.1}%)")
}

/// Pads `text` to exactly `width` characters, keeping at least one trailing
/// space. Longer text is cut and marked with `…`.
fn fit(text: &str, width: usize) -> String {
    let visible = width.saturating_sub(1);
    if text.chars().count() > visible {
        let mut cut: String = text.chars().take(visible.saturating_sub(1)).collect();
        cut.push('…');
        format!("{cut:<width$}")
    } else {
        format!("{text:<width$}")
    }
}

/// Serializes any result as pretty JSON.
pub fn to_json(value: &impl Serialize) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Prints any result as pretty JSON on stdout.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", to_json(value)?);
    Ok(())
}

#[derive(Serialize)]
struct StatRow<'a> {
    name: &'a str,
    current: Option<f64>,
    change_abs: f64,
    change_percent: f64,
    streak: StreakSymbol,
    magnitude: i8,
    rationale: &'a str,
}

/// Writes stat records to a CSV file at `path`, replacing any existing file.
pub fn write_stats_csv(path: &str, records: &[StatRecord]) -> Result<()> {
    debug!(path, records = records.len(), "Writing stats CSV");

    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for record in records {
        writer.serialize(StatRow {
            name: &record.name,
            current: record.current,
            change_abs: record.change_abs,
            change_percent: record.change_percent,
            streak: record.streak.symbol,
            magnitude: record.streak.magnitude,
            rationale: &record.streak.rationale,
        })?;
    }
    writer.flush()?;

    Ok(())
}
