use connect_pipeline::{
    decode_bus_payload, decode_stream_payload, AgentEventMapper, Batch, BatchTime,
    ContactEventMapper, MapError,
};
use rdkafka::message::OwnedMessage;
use rdkafka::Message;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    /// Base64-wrapped agent events and CTRs.
    AgentStream,
    /// Plain-JSON contact bus events.
    ContactBus,
}

#[derive(Debug, Clone)]
pub struct Topics {
    pub agent: String,
    pub contact: String,
}

impl Topics {
    pub fn source(&self, topic: &str) -> Option<EventSource> {
        if topic == self.agent {
            Some(EventSource::AgentStream)
        } else if topic == self.contact {
            Some(EventSource::ContactBus)
        } else {
            None
        }
    }
}

/// Decodes and maps one consumed batch. Undecodable messages are counted as
/// skipped; messages from unknown topics are dropped.
pub fn build_batch(messages: &[OwnedMessage], topics: &Topics, time: BatchTime) -> Batch {
    let mut batch = Batch::new(time);

    for m in messages {
        let Some(source) = topics.source(m.topic()) else {
            warn!(topic = m.topic(), "message from unexpected topic");
            continue;
        };
        let payload = m.payload().unwrap_or_default();

        let decoded = match source {
            EventSource::AgentStream => decode_stream_payload(payload),
            EventSource::ContactBus => decode_bus_payload(payload),
        };
        match decoded {
            Ok(event) => match source {
                EventSource::AgentStream => batch.ingest(&AgentEventMapper, &event),
                EventSource::ContactBus => batch.ingest(&ContactEventMapper, &event),
            },
            Err(e) => skip(&mut batch, m, &e),
        }
    }

    batch
}

fn skip(batch: &mut Batch, m: &OwnedMessage, error: &MapError) {
    warn!(
        topic = m.topic(),
        partition = m.partition(),
        offset = m.offset(),
        "undecodable message"
    );
    batch.skip(error);
}
