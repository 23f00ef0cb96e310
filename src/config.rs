use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use url::Url;

use crate::routing::RoutingKey;
use crate::store::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL_SECS};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LogConfig,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub forwarder: ForwarderConfig,
    /// Record accepted quotes/transfers so callbacks can be correlated
    #[serde(default = "default_track_requests")]
    pub track_requests: bool,
    /// Retention of tracked objects
    #[serde(default)]
    pub tracking: TrackingConfig,
    /// Endpoints registered at startup
    #[serde(default)]
    pub peers: Vec<PeerConfig>,
}

fn default_track_requests() -> bool {
    true
}

/// Log file rotation policy
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    Hourly,
    #[default]
    Daily,
    Never,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogConfig {
    pub level: String,
    pub dir: String,
    pub file: String,
    pub json: bool,
    pub rotation: Rotation,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "./logs".to_string(),
            file: "fspiop_router.log".to_string(),
            json: false,
            rotation: Rotation::Daily,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ForwarderConfig {
    pub timeout_ms: u64,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self { timeout_ms: 30_000 }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TrackingConfig {
    pub ttl_secs: u64,
    /// Per object table
    pub max_entries: usize,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL_SECS,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

/// One `(participant, currency) -> url` registration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PeerConfig {
    pub participant_id: String,
    pub currency: String,
    pub url: String,
}

impl PeerConfig {
    pub fn routing_key(&self) -> anyhow::Result<RoutingKey> {
        RoutingKey::new(&self.participant_id, &self.currency)
            .with_context(|| format!("Invalid peer {}/{}", self.participant_id, self.currency))
    }

    pub fn parsed_url(&self) -> anyhow::Result<Url> {
        Url::parse(&self.url).with_context(|| format!("Invalid url for peer {}", self.participant_id))
    }
}

impl AppConfig {
    pub fn load(env: &str) -> anyhow::Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid config file: {}", config_path))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: AppConfig = serde_yaml::from_str(content).context("Failed to parse config yaml")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject peer entries that could never be routed to and empty
    /// tracking limits
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.tracking.ttl_secs == 0 || self.tracking.max_entries == 0 {
            bail!("tracking.ttl_secs and tracking.max_entries must be non-zero");
        }
        let mut seen = std::collections::HashSet::new();
        for peer in &self.peers {
            let key = peer.routing_key()?;
            peer.parsed_url()?;
            if !seen.insert(key.to_table_key()) {
                bail!("Duplicate peer registration for {}", key);
            }
        }
        Ok(())
    }
}
