use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PollerConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // AWS configuration
    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint, e.g. a local emulator
    #[serde(default)]
    pub endpoint_url: Option<String>,

    // Delta configuration
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Max records per write call
    #[serde(default = "default_max_chunk")]
    pub max_chunk: usize,

    /// Seconds between directory snapshots
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Take a single snapshot and exit
    #[serde(default)]
    pub run_once: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_region() -> String {
    "eu-west-2".to_string()
}

fn default_output_dir() -> String {
    "./output".to_string()
}

fn default_max_chunk() -> usize {
    connect_pipeline::DEFAULT_MAX_CHUNK
}

fn default_poll_interval_secs() -> u64 {
    3600
}

impl PollerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("DIRECTORY_POLLER"))
            .build()?
            .try_deserialize()
    }
}
