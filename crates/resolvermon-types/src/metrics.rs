use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Session-wide totals, always derived from the subject ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalMetrics {
    pub total_shots: u64,
    pub total_hits: u64,
    pub total_misses: u64,
    /// Rounded hit percentage; 0 while no shots exist.
    pub accuracy_percent: u32,
}

impl GlobalMetrics {
    pub fn from_counts(total_hits: u64, total_misses: u64) -> Self {
        let total_shots = total_hits + total_misses;
        Self {
            total_shots,
            total_hits,
            total_misses,
            accuracy_percent: percent(total_hits, total_shots).unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesSample {
    pub bucket_label: String,
    pub accuracy_percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveTypeShare {
    pub resolve_type: String,
    pub subjects: usize,
    pub percent: u32,
}

/// `round(100 * part / whole)` with halves rounded up, `None` when `whole == 0`.
pub fn percent(part: u64, whole: u64) -> Option<u32> {
    if whole == 0 {
        return None;
    }
    let scaled = (200 * part as u128 + whole as u128) / (2 * whole as u128);
    Some(scaled as u32)
}

/// Formats elapsed session time as `MM:SS`.
pub fn clock_label(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
