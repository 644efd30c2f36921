use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProducerConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Kafka bootstrap servers
    #[serde(default = "default_kafka_server")]
    pub kafka_server: String,

    /// Topic standing in for the agent/CTR data stream
    #[serde(default = "default_topic")]
    pub topic: String,

    /// Total number of records to publish
    #[serde(default = "default_record_count")]
    pub record_count: usize,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_delay_between_batches_secs")]
    pub delay_between_batches_secs: u64,

    #[serde(default = "default_account_id")]
    pub account_id: String,

    #[serde(default = "default_instance_id")]
    pub instance_id: String,

    /// Seconds to wait for the delivery queue on each flush
    #[serde(default = "default_flush_timeout_secs")]
    pub flush_timeout_secs: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_kafka_server() -> String {
    "127.0.0.1:9092".to_string()
}

fn default_topic() -> String {
    "connect-agent-stream".to_string()
}

fn default_record_count() -> usize {
    100
}

fn default_batch_size() -> usize {
    25
}

fn default_delay_between_batches_secs() -> u64 {
    1
}

fn default_account_id() -> String {
    "123456789012".to_string()
}

fn default_instance_id() -> String {
    "11111111-2222-3333-4444-555555555555".to_string()
}

fn default_flush_timeout_secs() -> u64 {
    10
}

impl ProducerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("CTR_PRODUCER"))
            .build()?
            .try_deserialize()
    }
}
