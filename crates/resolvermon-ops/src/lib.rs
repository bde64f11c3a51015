//! Operational helpers: logging and the shared, lock-guarded aggregator.

use std::sync::Arc;

use resolvermon_engine::{Aggregator, DashboardSnapshot, QuerySurface};
use resolvermon_types::{
    config::{EngineConfig, OpsConfig},
    events::RawEvent,
    metrics::{GlobalMetrics, TimeSeriesSample},
    ResolverError, Result,
};
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

pub fn init_tracing(config: &OpsConfig) -> Result<()> {
    let filter = EnvFilter::try_new(config.log_level.clone())
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|err| ResolverError::Ops(format!("failed to create log filter: {err}")))?;

    fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| ResolverError::Ops(format!("tracing init error: {err}")))?;
    Ok(())
}

/// One aggregator behind a single coarse lock, cloneable across tasks.
///
/// Each call holds the lock for its whole duration, so readers never see a
/// half-applied event.
#[derive(Clone)]
pub struct MonitorStore {
    aggregator: Arc<Mutex<Aggregator>>,
}

impl MonitorStore {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let aggregator = Aggregator::new(config)?;
        info!(
            "Monitor store ready (min_samples={}, threshold={}, history={})",
            aggregator.config().min_samples,
            aggregator.config().resolved_threshold,
            aggregator.config().max_event_history
        );
        Ok(Self {
            aggregator: Arc::new(Mutex::new(aggregator)),
        })
    }

    pub async fn ingest(&self, raw: RawEvent) -> Result<Uuid> {
        self.aggregator.lock().await.ingest(raw)
    }

    pub async fn sample(&self, bucket_label: impl Into<String>) -> TimeSeriesSample {
        self.aggregator.lock().await.sample_time_series(bucket_label)
    }

    pub async fn global_stats(&self) -> GlobalMetrics {
        self.aggregator.lock().await.global_stats()
    }

    pub async fn dashboard(&self, recent_limit: usize) -> DashboardSnapshot {
        self.aggregator.lock().await.dashboard(recent_limit)
    }

    /// Runs a read-only query while holding the lock.
    pub async fn read<R>(&self, query: impl FnOnce(&Aggregator) -> R) -> R {
        let guard = self.aggregator.lock().await;
        query(&guard)
    }
}
