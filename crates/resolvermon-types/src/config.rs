use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{ResolverError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Shots required before a subject can count as resolved.
    #[serde(default = "EngineConfig::default_min_samples")]
    pub min_samples: u64,
    /// Hit ratio at or above which a subject counts as resolved.
    #[serde(default = "EngineConfig::default_resolved_threshold")]
    pub resolved_threshold: f64,
    #[serde(default = "EngineConfig::default_max_event_history")]
    pub max_event_history: usize,
}

impl EngineConfig {
    pub const DEFAULT_MIN_SAMPLES: u64 = 5;
    pub const DEFAULT_RESOLVED_THRESHOLD: f64 = 0.7;
    pub const DEFAULT_MAX_EVENT_HISTORY: usize = 500;

    fn default_min_samples() -> u64 {
        Self::DEFAULT_MIN_SAMPLES
    }

    fn default_resolved_threshold() -> f64 {
        Self::DEFAULT_RESOLVED_THRESHOLD
    }

    fn default_max_event_history() -> usize {
        Self::DEFAULT_MAX_EVENT_HISTORY
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_samples == 0 {
            return Err(ResolverError::Configuration(
                "engine.min_samples must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.resolved_threshold) {
            return Err(ResolverError::Configuration(
                "engine.resolved_threshold must be between 0.0 and 1.0".into(),
            ));
        }
        if self.max_event_history == 0 {
            return Err(ResolverError::Configuration(
                "engine.max_event_history must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_samples: Self::DEFAULT_MIN_SAMPLES,
            resolved_threshold: Self::DEFAULT_RESOLVED_THRESHOLD,
            max_event_history: Self::DEFAULT_MAX_EVENT_HISTORY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsConfig {
    pub log_level: String,
}

impl Default for OpsConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Snapshots buffered per subscriber before slow readers start lagging.
    pub channel_capacity: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub sample_interval_ms: u64,
    /// Number of recent events bundled into each published snapshot.
    #[serde(default = "MonitorConfig::default_recent_events")]
    pub recent_events: usize,
}

impl MonitorConfig {
    fn default_recent_events() -> usize {
        20
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_interval_ms == 0 {
            return Err(ResolverError::Configuration(
                "monitor.sample_interval_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 30_000,
            recent_events: Self::default_recent_events(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverMonConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub ops: OpsConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
}

impl ResolverMonConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref).map_err(|err| {
            ResolverError::Configuration(format!(
                "unable to read config file {}: {err}",
                path_ref.display()
            ))
        })?;
        toml::from_str(&contents).map_err(|err| {
            ResolverError::Configuration(format!(
                "failed to parse config file {}: {err}",
                path_ref.display()
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        if self.network.channel_capacity == 0 {
            return Err(ResolverError::Configuration(
                "network.channel_capacity must be greater than zero".into(),
            ));
        }
        self.monitor.validate()
    }
}
