use serde::{Deserialize, Serialize};

use crate::metrics::percent;

/// Resolve modes the resolver is known to report. The set stays open.
pub const RESOLVE_ANIM: &str = "ANIM";
pub const RESOLVE_BRUTE: &str = "BRUTE";
pub const RESOLVE_GAME: &str = "GAME";

/// Rolling record for one tracked player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub hits: u64,
    pub misses: u64,
    /// Unset until the first resolver change that names a mode.
    pub resolve_type: Option<String>,
    pub last_angle: Option<f64>,
    pub last_side: Option<i8>,
    pub is_jitter: bool,
    pub is_breaker: bool,
    pub resolved: bool,
}

impl Subject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hits: 0,
            misses: 0,
            resolve_type: None,
            last_angle: None,
            last_side: None,
            is_jitter: false,
            is_breaker: false,
            resolved: false,
        }
    }

    pub fn total_shots(&self) -> u64 {
        self.hits + self.misses
    }

    /// Hit ratio in `[0, 1]`, or `None` before the first shot.
    pub fn accuracy(&self) -> Option<f64> {
        match self.total_shots() {
            0 => None,
            total => Some(self.hits as f64 / total as f64),
        }
    }

    pub fn accuracy_percent(&self) -> Option<u32> {
        percent(self.hits, self.total_shots())
    }
}

/// Subject snapshot enriched for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    #[serde(flatten)]
    pub subject: Subject,
    /// `None` when no shots have been observed; never reported as 0 or 100.
    pub accuracy_percent: Option<u32>,
}

impl From<&Subject> for PlayerStats {
    fn from(subject: &Subject) -> Self {
        Self {
            accuracy_percent: subject.accuracy_percent(),
            subject: subject.clone(),
        }
    }
}
