use std::{cell::Cell, collections::VecDeque};

use resolvermon_types::{
    config::EngineConfig,
    events::{RawEvent, ResolverEvent},
    metrics::{GlobalMetrics, TimeSeriesSample},
    Result,
};
use tracing::debug;
use uuid::Uuid;

use crate::ledger::SubjectLedger;

#[derive(Debug, Clone)]
struct Recorded {
    sequence: u64,
    event: ResolverEvent,
}

/// Single entry point for event ingestion and sole owner of derived metrics.
///
/// Not internally synchronised: hosts that share one across threads wrap the
/// whole aggregator in a lock.
#[derive(Debug, Clone)]
pub struct Aggregator {
    config: EngineConfig,
    ledger: SubjectLedger,
    history: VecDeque<Recorded>,
    next_sequence: u64,
    time_series: Vec<TimeSeriesSample>,
    /// `None` marks the metrics dirty.
    cached_metrics: Cell<Option<GlobalMetrics>>,
}

impl Aggregator {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ledger: SubjectLedger::new(&config),
            history: VecDeque::with_capacity(config.max_event_history.min(1024)),
            next_sequence: 0,
            time_series: Vec::new(),
            cached_metrics: Cell::new(None),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ledger(&self) -> &SubjectLedger {
        &self.ledger
    }

    /// Validates and records one event. A rejected event leaves no trace.
    pub fn ingest(&mut self, raw: RawEvent) -> Result<Uuid> {
        let event = ResolverEvent::validate(raw).map_err(|err| {
            debug!("Rejected resolver event: {err}");
            err
        })?;
        let id = event.id;

        let subject = self.ledger.apply_event(&event);
        debug!(
            subject = %subject.name,
            kind = %event.kind,
            hits = subject.hits,
            misses = subject.misses,
            resolved = subject.resolved,
            "Applied resolver event"
        );

        if self.history.len() == self.config.max_event_history {
            self.history.pop_front();
        }
        self.history.push_back(Recorded {
            sequence: self.next_sequence,
            event,
        });
        self.next_sequence += 1;
        self.cached_metrics.set(None);
        Ok(id)
    }

    /// Current totals, recomputed from the ledger only after a write.
    pub fn metrics(&self) -> GlobalMetrics {
        if let Some(metrics) = self.cached_metrics.get() {
            return metrics;
        }
        let (hits, misses) = self
            .ledger
            .iter()
            .fold((0, 0), |(hits, misses), subject| {
                (hits + subject.hits, misses + subject.misses)
            });
        let metrics = GlobalMetrics::from_counts(hits, misses);
        self.cached_metrics.set(Some(metrics));
        metrics
    }

    /// Appends the accuracy-to-date under `bucket_label`. Cadence is up to the caller.
    pub fn sample_time_series(&mut self, bucket_label: impl Into<String>) -> TimeSeriesSample {
        let sample = TimeSeriesSample {
            bucket_label: bucket_label.into(),
            accuracy_percent: self.metrics().accuracy_percent,
        };
        self.time_series.push(sample.clone());
        sample
    }

    /// Up to `limit` retained events, newest timestamp first; ties go to the later arrival.
    pub fn recent_events(&self, limit: usize) -> Vec<ResolverEvent> {
        let mut ordered: Vec<&Recorded> = self.history.iter().collect();
        ordered.sort_by(|a, b| {
            b.event
                .timestamp
                .cmp(&a.event.timestamp)
                .then_with(|| b.sequence.cmp(&a.sequence))
        });
        ordered
            .into_iter()
            .take(limit)
            .map(|recorded| recorded.event.clone())
            .collect()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub(crate) fn samples(&self) -> &[TimeSeriesSample] {
        &self.time_series
    }
}
