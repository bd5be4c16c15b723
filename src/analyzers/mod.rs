//! Time-series analysis over snapshot tables.
//!
//! This module computes per-entity change over a look-back window, classifies
//! multi-window momentum streaks, buckets incremental growth for charts, and
//! aggregates the results into sorted stat records.

pub mod aggregate;
pub mod change;
pub mod growth;
pub mod streak;
pub mod threshold;
pub mod types;
pub mod utility;
