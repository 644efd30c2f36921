use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConsumerConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // Kafka configuration
    #[serde(default = "default_bootstrap_servers")]
    pub bootstrap_servers: String,

    #[serde(default = "default_group_id")]
    pub group_id: String,

    /// Topic carrying base64-encoded agent events and CTRs
    #[serde(default = "default_agent_topic")]
    pub agent_topic: String,

    /// Topic carrying plain-JSON contact bus events
    #[serde(default = "default_contact_topic")]
    pub contact_topic: String,

    /// Max messages mapped and written together
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Max wait time for a batch to fill, in seconds
    #[serde(default = "default_batch_wait_secs")]
    pub batch_wait_secs: u64,

    // Delta configuration
    /// Root directory holding one Delta table per destination table
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Max records per write call
    #[serde(default = "default_max_chunk")]
    pub max_chunk: usize,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bootstrap_servers() -> String {
    "127.0.0.1:9092".to_string()
}

fn default_group_id() -> String {
    "connect-stream-consumer".to_string()
}

fn default_agent_topic() -> String {
    "connect-agent-stream".to_string()
}

fn default_contact_topic() -> String {
    "connect-contact-events".to_string()
}

fn default_batch_size() -> usize {
    500
}

fn default_batch_wait_secs() -> u64 {
    5
}

fn default_output_dir() -> String {
    "./output".to_string()
}

fn default_max_chunk() -> usize {
    connect_pipeline::DEFAULT_MAX_CHUNK
}

impl ConsumerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("STREAM_CONSUMER"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let _lock = TEST_LOCK.lock().unwrap();
        std::env::remove_var("STREAM_CONSUMER_OUTPUT_DIR");

        let config = ConsumerConfig::from_env().unwrap();
        assert_eq!(config.output_dir, "./output");
        assert_eq!(config.max_chunk, 100);
        assert_eq!(config.agent_topic, "connect-agent-stream");
        assert_eq!(config.contact_topic, "connect-contact-events");
    }

    #[test]
    fn test_custom_config() {
        let _lock = TEST_LOCK.lock().unwrap();
        std::env::set_var("STREAM_CONSUMER_OUTPUT_DIR", "/tmp/delta");

        let config = ConsumerConfig::from_env().unwrap();
        assert_eq!(config.output_dir, "/tmp/delta");

        std::env::remove_var("STREAM_CONSUMER_OUTPUT_DIR");
    }
}
