//! Data types produced by the analyzers.

use serde::Serialize;

/// Output of the change calculator for one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Change {
    pub current: Option<f64>,
    pub previous: Option<f64>,
    pub abs: f64,
    pub percent: f64,
}

/// Momentum state of an entity across consecutive look-back windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StreakSymbol {
    TripleUp,
    DoubleUp,
    SingleUp,
    Flat,
    SingleDown,
    DoubleDown,
    InsufficientData,
}

impl StreakSymbol {
    /// Glyph shown in tables and the text report.
    pub fn glyph(self) -> &'static str {
        match self {
            StreakSymbol::TripleUp => "↗↗↗",
            StreakSymbol::DoubleUp => "↗↗",
            StreakSymbol::SingleUp => "↗",
            StreakSymbol::Flat => "→",
            StreakSymbol::SingleDown => "↘",
            StreakSymbol::DoubleDown => "↘↘",
            StreakSymbol::InsufficientData => "—",
        }
    }

    /// Signed rank for sorting; insufficient data sorts lowest.
    pub fn magnitude(self) -> i8 {
        match self {
            StreakSymbol::TripleUp => 3,
            StreakSymbol::DoubleUp => 2,
            StreakSymbol::SingleUp => 1,
            StreakSymbol::Flat => 0,
            StreakSymbol::SingleDown => -1,
            StreakSymbol::DoubleDown => -2,
            StreakSymbol::InsufficientData => -3,
        }
    }
}

/// Streak classification with the reasoning shown in tooltips.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreakResult {
    pub symbol: StreakSymbol,
    pub magnitude: i8,
    pub rationale: String,
}

impl StreakResult {
    pub fn new(symbol: StreakSymbol, rationale: String) -> Self {
        Self {
            symbol,
            magnitude: symbol.magnitude(),
            rationale,
        }
    }
}

/// Per-entity statistics for one dataset and window. Recomputed on every query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatRecord {
    pub name: String,
    pub current: Option<f64>,
    pub change_abs: f64,
    pub change_percent: f64,
    pub streak: StreakResult,
    /// Chronological present values inside the window.
    pub series: Vec<f64>,
}
