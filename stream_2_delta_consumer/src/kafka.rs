use std::collections::BTreeMap;
use std::time::Duration;

use rdkafka::config::RDKafkaLogLevel;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::KafkaResult;
use rdkafka::message::OwnedMessage;
use rdkafka::{ClientConfig, Message, Offset, TopicPartitionList};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use crate::config::ConsumerConfig;

/// Offsets are stored by hand once a batch is durably written; the
/// auto-commit then picks them up.
pub fn create_consumer(config: &ConsumerConfig) -> KafkaResult<StreamConsumer> {
    let consumer: StreamConsumer = ClientConfig::new()
        .set("group.id", &config.group_id)
        .set("bootstrap.servers", &config.bootstrap_servers)
        .set("enable.partition.eof", "false")
        .set("session.timeout.ms", "6000")
        .set("auto.commit.interval.ms", "5000")
        .set("enable.auto.offset.store", "false")
        .set("enable.auto.commit", "true")
        .set("auto.offset.reset", "earliest")
        .set_log_level(RDKafkaLogLevel::Info)
        .create()?;

    consumer.subscribe(&[config.agent_topic.as_str(), config.contact_topic.as_str()])?;
    Ok(consumer)
}

/// Collects up to `max` messages, returning early once `wait` has elapsed.
pub async fn next_batch(consumer: &StreamConsumer, max: usize, wait: Duration) -> Vec<OwnedMessage> {
    let deadline = Instant::now() + wait;
    let mut messages = Vec::with_capacity(max);

    while messages.len() < max {
        match timeout_at(deadline, consumer.recv()).await {
            Err(_) => break,
            Ok(Err(e)) => {
                warn!(error = %e, "kafka error");
                continue;
            }
            Ok(Ok(m)) => messages.push(m.detach()),
        }
    }

    debug!(count = messages.len(), "collected messages");
    messages
}

/// Next offset to consume for every partition seen in `messages`.
pub fn next_offsets(messages: &[OwnedMessage]) -> BTreeMap<(String, i32), i64> {
    let mut offsets = BTreeMap::new();
    for m in messages {
        let next = offsets
            .entry((m.topic().to_string(), m.partition()))
            .or_insert(m.offset() + 1);
        *next = (*next).max(m.offset() + 1);
    }
    offsets
}

pub fn store_offsets(consumer: &StreamConsumer, messages: &[OwnedMessage]) -> KafkaResult<()> {
    let offsets = next_offsets(messages);
    if offsets.is_empty() {
        return Ok(());
    }

    let mut tpl = TopicPartitionList::new();
    for ((topic, partition), offset) in &offsets {
        tpl.add_partition_offset(topic, *partition, Offset::Offset(*offset))?;
    }
    consumer.store_offsets(&tpl)
}
