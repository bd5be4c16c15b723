//! CSV parser for daily snapshot tables.
//!
//! The first column holds the snapshot date (its header is usually blank);
//! every other header is an entity id (`org/repo` or a package name).

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::table::Table;

/// Parses a snapshot CSV into a [`Table`].
///
/// Empty cells are absent values. Rows with a blank or invalid date are
/// dropped by table construction.
///
/// # Errors
///
/// Returns an error if the input is not readable CSV.
pub fn parse_table<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = rdr.headers()?.iter().skip(1).map(str::to_string).collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let date = record.get(0).unwrap_or_default().to_string();
        let cells = columns
            .iter()
            .enumerate()
            .map(|(i, column)| parse_cell(record.get(i + 1), column, &date))
            .collect();
        rows.push((date, cells));
    }

    debug!(columns = columns.len(), rows = rows.len(), "Parsed snapshot CSV");
    Ok(Table::from_raw(columns, rows))
}

/// Opens and parses a snapshot file, gunzipping `*.gz` paths.
pub fn load_table(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;

    let parsed = if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        parse_table(GzDecoder::new(file))
    } else {
        parse_table(file)
    };
    let table = parsed.with_context(|| format!("failed to parse {}", path.display()))?;

    info!(
        path = %path.display(),
        rows = table.len(),
        columns = table.columns().len(),
        "Loaded snapshot table"
    );
    Ok(table)
}

fn parse_cell(cell: Option<&str>, column: &str, date: &str) -> Option<f64> {
    let cell = cell?;
    if cell.is_empty() {
        return None;
    }
    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            warn!(column, date, cell, "Unparseable cell treated as absent");
            None
        }
    }
}
