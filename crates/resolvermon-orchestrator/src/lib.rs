//! Monitoring session: feeds raw events into the store, samples accuracy on a
//! timer, and publishes dashboard snapshots.

use futures::{Stream, StreamExt};
use resolvermon_network::SnapshotServer;
use resolvermon_ops::MonitorStore;
use resolvermon_types::{
    config::{MonitorConfig, ResolverMonConfig},
    events::RawEvent,
    metrics::{clock_label, TimeSeriesSample},
    ResolverError, Result,
};
use serde::Serialize;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub accepted: u64,
    pub rejected: u64,
    pub samples: u64,
}

pub struct Monitor<N>
where
    N: SnapshotServer,
{
    store: MonitorStore,
    network: N,
    config: MonitorConfig,
    started_at: Instant,
}

impl<N> Monitor<N>
where
    N: SnapshotServer,
{
    pub fn new(config: MonitorConfig, store: MonitorStore, network: N) -> Self {
        Self {
            store,
            network,
            config,
            started_at: Instant::now(),
        }
    }

    pub fn store(&self) -> &MonitorStore {
        &self.store
    }

    pub async fn boot(&mut self, full_config: &ResolverMonConfig) -> Result<()> {
        full_config.validate()?;
        self.config.validate()?;
        self.network.run().await?;
        self.started_at = Instant::now();
        info!(
            "Monitor boot complete (sampling every {} ms)",
            self.config.sample_interval_ms
        );
        Ok(())
    }

    pub async fn ingest(&self, raw: RawEvent) -> Result<Uuid> {
        self.store.ingest(raw).await
    }

    /// Records one time-series sample labelled with session time and publishes
    /// the resulting dashboard.
    pub async fn tick(&self) -> Result<TimeSeriesSample> {
        let label = clock_label(self.started_at.elapsed());
        let sample = self.store.sample(label).await;
        info!(
            "Accuracy sample {} -> {}%",
            sample.bucket_label, sample.accuracy_percent
        );
        let snapshot = self.store.dashboard(self.config.recent_events).await;
        self.network.publish(snapshot).await?;
        Ok(sample)
    }

    /// Drains `events` until it ends, sampling on the configured interval and
    /// once more when the stream is exhausted. Invalid events are logged and
    /// counted, never retried.
    pub async fn run<S>(&mut self, mut events: S) -> Result<RunSummary>
    where
        S: Stream<Item = RawEvent> + Unpin,
    {
        self.config.validate()?;
        let period = Duration::from_millis(self.config.sample_interval_ms);
        let mut next_sample = Instant::now() + period;
        let mut summary = RunSummary::default();
        info!("Monitor run started");

        loop {
            // Checked against the clock on every pass so a stream that is
            // always ready cannot hold sampling back.
            if Instant::now() >= next_sample {
                self.tick().await?;
                summary.samples += 1;
                next_sample = Instant::now() + period;
            }

            tokio::select! {
                biased;
                _ = sleep_until(next_sample) => {}
                next = events.next() => match next {
                    Some(raw) => match self.ingest(raw).await {
                        Ok(_) => summary.accepted += 1,
                        Err(ResolverError::InvalidEvent(reason)) => {
                            warn!("Skipping invalid resolver event: {reason}");
                            summary.rejected += 1;
                        }
                        Err(other) => return Err(other),
                    },
                    None => break,
                },
            }
        }

        self.tick().await?;
        summary.samples += 1;
        info!(
            "Monitor run finished: {} accepted, {} rejected, {} samples",
            summary.accepted, summary.rejected, summary.samples
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use resolvermon_engine::QuerySurface;
    use resolvermon_network::LocalServer;
    use resolvermon_types::config::{EngineConfig, NetworkConfig};

    fn monitor() -> Monitor<LocalServer> {
        let store = MonitorStore::new(EngineConfig::default()).unwrap();
        let network = LocalServer::new(&NetworkConfig::default()).unwrap();
        let config = MonitorConfig {
            sample_interval_ms: 60_000,
            recent_events: 3,
        };
        Monitor::new(config, store, network)
    }

    #[tokio::test]
    async fn run_counts_and_publishes_final_snapshot() {
        let mut monitor = monitor();
        monitor.boot(&ResolverMonConfig::default()).await.unwrap();
        let mut snapshots = monitor.network.subscribe();

        let events = vec![
            RawEvent::new("hit", "Enemy_01").angle(58.0),
            RawEvent::new("jitter_detected", "Enemy_02").side(1),
            RawEvent::new("miss", "Enemy_02").detail("Miss resolver • Switching to BRUTE mode"),
            RawEvent::new("teleport", "Enemy_03"),
            RawEvent::new("hit", "Enemy_03").angle(43.0),
            RawEvent::new("breaker_detected", "Enemy_01"),
        ];
        let summary = monitor.run(stream::iter(events)).await.unwrap();
        assert_eq!(
            summary,
            RunSummary {
                accepted: 5,
                rejected: 1,
                samples: 1,
            }
        );

        let snapshot = snapshots.next().await.expect("final snapshot");
        assert_eq!(snapshot.global.total_shots, 3);
        assert_eq!(snapshot.global.accuracy_percent, 67);
        assert_eq!(snapshot.recent_events.len(), 3);
        assert_eq!(snapshot.time_series.len(), 1);
        assert_eq!(snapshot.time_series[0].bucket_label, "00:00");
    }

    #[tokio::test]
    async fn ready_stream_still_samples_on_interval() {
        let store = MonitorStore::new(EngineConfig::default()).unwrap();
        let network = LocalServer::new(&NetworkConfig::default()).unwrap();
        let config = MonitorConfig {
            sample_interval_ms: 1,
            recent_events: 3,
        };
        let mut monitor = Monitor::new(config, store, network);

        // Every item is immediately ready; each one just takes a little wall time.
        let events = stream::iter(0..40).map(|_| {
            std::thread::sleep(std::time::Duration::from_micros(500));
            RawEvent::new("hit", "Enemy_01")
        });
        let summary = monitor.run(events).await.unwrap();

        assert_eq!(summary.accepted, 40);
        assert!(summary.samples > 1, "only {} sample(s)", summary.samples);
        let recorded = monitor.store().read(|agg| agg.time_series().len()).await;
        assert_eq!(recorded as u64, summary.samples);
    }

    #[tokio::test]
    async fn ingest_surfaces_invalid_events() {
        let monitor = monitor();
        let result = monitor
            .ingest(RawEvent::new("resolver_change", "Enemy_01").angle(10.0))
            .await;
        assert!(matches!(result, Err(ResolverError::InvalidEvent(_))));
    }

    #[tokio::test]
    async fn boot_rejects_invalid_monitor_configuration() {
        let store = MonitorStore::new(EngineConfig::default()).unwrap();
        let network = LocalServer::new(&NetworkConfig::default()).unwrap();
        let config = MonitorConfig {
            sample_interval_ms: 0,
            recent_events: 3,
        };
        let mut monitor = Monitor::new(config, store, network);
        assert!(matches!(
            monitor.boot(&ResolverMonConfig::default()).await,
            Err(ResolverError::Configuration(_))
        ));
        assert!(matches!(
            monitor.run(stream::iter(Vec::<RawEvent>::new())).await,
            Err(ResolverError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn boot_rejects_invalid_configuration() {
        let mut monitor = monitor();
        let mut config = ResolverMonConfig::default();
        config.monitor.sample_interval_ms = 0;
        assert!(matches!(
            monitor.boot(&config).await,
            Err(ResolverError::Configuration(_))
        ));
    }
}
