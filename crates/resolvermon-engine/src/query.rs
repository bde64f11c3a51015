use std::collections::HashMap;

use chrono::{DateTime, Utc};
use resolvermon_types::{
    events::ResolverEvent,
    metrics::{percent, GlobalMetrics, ResolveTypeShare, TimeSeriesSample},
    subject::PlayerStats,
};
use serde::{Deserialize, Serialize};

use crate::aggregator::Aggregator;

/// Read-only view handed to renderers. Every value returned is an owned copy.
pub trait QuerySurface {
    fn global_stats(&self) -> GlobalMetrics;
    fn player_stats(&self) -> Vec<PlayerStats>;
    /// Samples oldest first.
    fn time_series(&self) -> Vec<TimeSeriesSample>;
    /// Share of classified subjects per resolve type, largest first.
    fn resolve_type_distribution(&self) -> Vec<ResolveTypeShare>;
    fn recent_events(&self, limit: usize) -> Vec<ResolverEvent>;

    fn dashboard(&self, recent_limit: usize) -> DashboardSnapshot {
        DashboardSnapshot {
            generated_at: Utc::now(),
            global: self.global_stats(),
            players: self.player_stats(),
            time_series: self.time_series(),
            resolve_types: self.resolve_type_distribution(),
            recent_events: self.recent_events(recent_limit),
        }
    }
}

/// Everything a dashboard needs for one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub global: GlobalMetrics,
    pub players: Vec<PlayerStats>,
    pub time_series: Vec<TimeSeriesSample>,
    pub resolve_types: Vec<ResolveTypeShare>,
    pub recent_events: Vec<ResolverEvent>,
}

impl QuerySurface for Aggregator {
    fn global_stats(&self) -> GlobalMetrics {
        self.metrics()
    }

    fn player_stats(&self) -> Vec<PlayerStats> {
        self.ledger().iter().map(PlayerStats::from).collect()
    }

    fn time_series(&self) -> Vec<TimeSeriesSample> {
        self.samples().to_vec()
    }

    fn resolve_type_distribution(&self) -> Vec<ResolveTypeShare> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for mode in self
            .ledger()
            .iter()
            .filter_map(|subject| subject.resolve_type.as_deref())
        {
            *counts.entry(mode).or_default() += 1;
        }
        let classified: usize = counts.values().sum();

        // Rounded shares are reported as-is even when they do not total 100.
        let mut shares: Vec<ResolveTypeShare> = counts
            .into_iter()
            .map(|(mode, subjects)| ResolveTypeShare {
                resolve_type: mode.to_string(),
                subjects,
                percent: percent(subjects as u64, classified as u64).unwrap_or(0),
            })
            .collect();
        shares.sort_by(|a, b| {
            b.subjects
                .cmp(&a.subjects)
                .then_with(|| a.resolve_type.cmp(&b.resolve_type))
        });
        shares
    }

    fn recent_events(&self, limit: usize) -> Vec<ResolverEvent> {
        Aggregator::recent_events(self, limit)
    }
}
