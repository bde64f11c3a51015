//! Fan-out of dashboard snapshots to subscribed renderers.

use async_trait::async_trait;
use futures::{stream::BoxStream, StreamExt};
use resolvermon_engine::DashboardSnapshot;
use resolvermon_types::{config::NetworkConfig, ResolverError, Result};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info};

#[async_trait]
pub trait SnapshotServer: Send + Sync {
    async fn run(&self) -> Result<()>;
    async fn publish(&self, snapshot: DashboardSnapshot) -> Result<()>;
    fn subscribe(&self) -> BoxStream<'static, DashboardSnapshot>;
}

/// Simple in-process server backed by a broadcast channel.
#[derive(Clone)]
pub struct LocalServer {
    tx: broadcast::Sender<DashboardSnapshot>,
}

impl LocalServer {
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        if config.channel_capacity == 0 {
            return Err(ResolverError::Network(
                "snapshot channel capacity must be greater than zero".into(),
            ));
        }
        let (tx, _) = broadcast::channel(config.channel_capacity);
        Ok(Self { tx })
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[async_trait]
impl SnapshotServer for LocalServer {
    async fn run(&self) -> Result<()> {
        info!("Starting local snapshot server (in-process)");
        Ok(())
    }

    async fn publish(&self, snapshot: DashboardSnapshot) -> Result<()> {
        // No subscribers is not an error; the snapshot is simply dropped.
        if let Ok(receivers) = self.tx.send(snapshot) {
            debug!("Published dashboard snapshot to {receivers} subscriber(s)");
        }
        Ok(())
    }

    fn subscribe(&self) -> BoxStream<'static, DashboardSnapshot> {
        BroadcastStream::new(self.tx.subscribe())
            .filter_map(|snapshot| async move { snapshot.ok() })
            .boxed()
    }
}
