use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::table::{DatasetKind, Table};

/// Which columns of each dataset take part in stats, totals and reports.
///
/// Owned by the caller and only borrowed by queries. A dataset without an
/// explicit list uses every column of its table.
///
/// Stored as a JSON object on disk:
/// ```json
/// {
///   "stars": ["orgA/repoX", "orgB/repoY"],
///   "downloads": ["packagex"]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default)]
    stars: Option<Vec<String>>,
    #[serde(default)]
    downloads: Option<Vec<String>>,
}

impl Selection {
    /// Selects every column of both datasets.
    pub fn all() -> Self {
        Self::default()
    }

    /// Loads a selection from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read selection {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("failed to parse selection {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Restricts `kind` to `columns`, in that order.
    pub fn with_active(mut self, kind: DatasetKind, columns: Vec<String>) -> Self {
        match kind {
            DatasetKind::Stars => self.stars = Some(columns),
            DatasetKind::Downloads => self.downloads = Some(columns),
        }
        self
    }

    /// Active columns of `kind`, falling back to all columns of `table`.
    pub fn active<'a>(&'a self, kind: DatasetKind, table: &'a Table) -> &'a [String] {
        let explicit = match kind {
            DatasetKind::Stars => self.stars.as_deref(),
            DatasetKind::Downloads => self.downloads.as_deref(),
        };
        explicit.unwrap_or(table.columns())
    }
}
