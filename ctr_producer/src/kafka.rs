// https://docs.rs/rdkafka/latest/rdkafka/producer/base_producer/struct.BaseProducer.html
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaResult;
use rdkafka::producer::{BaseProducer, BaseRecord, Producer};
use tracing::{debug, warn};

use crate::ctr::ContactTraceRecord;

/// Stream payloads carry base64 of the record's JSON, as the stream
/// consumer expects.
pub fn encode_payload(record: &ContactTraceRecord) -> serde_json::Result<String> {
    Ok(STANDARD.encode(serde_json::to_vec(record)?))
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishReport {
    pub sent: usize,
    pub failed: usize,
}

pub struct CtrPublisher {
    producer: BaseProducer,
    topic: String,
    flush_timeout: Duration,
}

impl CtrPublisher {
    pub fn new(
        kafka_server: &str,
        topic: impl Into<String>,
        flush_timeout: Duration,
    ) -> KafkaResult<Self> {
        let producer: BaseProducer = ClientConfig::new()
            .set("bootstrap.servers", kafka_server)
            .create()?;

        Ok(Self {
            producer,
            topic: topic.into(),
            flush_timeout,
        })
    }

    /// Enqueues every record keyed by contact id, then flushes. Records that
    /// fail to serialize or enqueue are counted and skipped.
    pub fn publish_batch(&self, records: &[ContactTraceRecord]) -> KafkaResult<PublishReport> {
        let mut report = PublishReport::default();

        for record in records {
            let payload = match encode_payload(record) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(contact_id = %record.contact_id, error = %e, "failed to serialize record");
                    report.failed += 1;
                    continue;
                }
            };

            let sent = self.producer.send(
                BaseRecord::to(&self.topic)
                    .payload(&payload)
                    .key(&record.contact_id),
            );
            match sent {
                Ok(()) => report.sent += 1,
                Err((e, _)) => {
                    warn!(contact_id = %record.contact_id, error = %e, "failed to enqueue record");
                    report.failed += 1;
                }
            }
        }

        self.producer.flush(self.flush_timeout)?;
        debug!(sent = report.sent, failed = report.failed, "flushed batch");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctr::CtrGenerator;
    use chrono::Utc;
    use connect_pipeline::decode_stream_payload;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_payload_decodes_as_stream_event() {
        let mut rng = StdRng::seed_from_u64(1);
        let record = CtrGenerator::new("123456789012", "instance-1")
            .generate_with(&mut rng, Utc::now(), 1)
            .remove(0);

        let payload = encode_payload(&record).unwrap();
        let event = decode_stream_payload(payload.as_bytes()).unwrap();

        assert_eq!(event["ContactId"], record.contact_id.as_str());
        assert_eq!(event["InstanceId"], "instance-1");
    }
}
