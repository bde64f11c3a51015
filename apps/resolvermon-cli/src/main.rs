use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use futures::stream;
use resolvermon_network::LocalServer;
use resolvermon_ops::{init_tracing, MonitorStore};
use resolvermon_orchestrator::Monitor;
use resolvermon_types::{config::ResolverMonConfig, events::RawEvent};
use tracing::info;

mod demo;

/// Replays resolver events through the aggregation engine and prints the
/// resulting dashboard snapshot as JSON.
#[derive(Debug, Parser)]
#[command(name = "resolvermon", version)]
struct Args {
    /// TOML configuration file.
    #[arg(long, env = "RESOLVERMON_CONFIG")]
    config: Option<PathBuf>,
    /// JSON-lines file of raw events. Replays the built-in demo session when omitted.
    #[arg(long)]
    events: Option<PathBuf>,
    /// Print the snapshot on a single line.
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref());
    init_tracing(&config.ops)?;

    let store = MonitorStore::new(config.engine.clone())?;
    let network = LocalServer::new(&config.network)?;
    let mut monitor = Monitor::new(config.monitor.clone(), store, network);
    monitor.boot(&config).await?;

    let events = match &args.events {
        Some(path) => read_events(path)?,
        None => {
            info!("No event file given; replaying demo session");
            demo::session(Utc::now())
        }
    };
    let summary = monitor.run(stream::iter(events)).await?;
    info!(?summary, "Replay complete");

    let snapshot = monitor.store().dashboard(config.monitor.recent_events).await;
    let rendered = if args.compact {
        serde_json::to_string(&snapshot)?
    } else {
        serde_json::to_string_pretty(&snapshot)?
    };
    println!("{rendered}");
    Ok(())
}

fn read_events(path: &Path) -> Result<Vec<RawEvent>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("unable to read event file {}", path.display()))?;
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("{}:{}: malformed event record", path.display(), idx + 1))
        })
        .collect()
}

fn load_config(path: Option<&Path>) -> ResolverMonConfig {
    let Some(path) = path else {
        return ResolverMonConfig::default();
    };
    match ResolverMonConfig::from_file(path) {
        Ok(cfg) => {
            if let Err(err) = cfg.validate() {
                eprintln!(
                    "Invalid config in '{}': {err}. Falling back to internal defaults.",
                    path.display()
                );
                ResolverMonConfig::default()
            } else {
                cfg
            }
        }
        Err(err) => {
            eprintln!(
                "Failed to load config from '{}': {err}. Falling back to internal defaults.",
                path.display()
            );
            ResolverMonConfig::default()
        }
    }
}
