use std::sync::Mutex;

use async_trait::async_trait;
use connect_pipeline::{
    decode_bus_payload, AgentEventMapper, Batch, BatchTime, ChunkedWriter, ContactEventMapper,
    DestinationTable, Dimension, DimensionalRecord, RecordWriter, SinkError,
};
use serde_json::json;

/// Keeps every write call so tests can inspect slicing and order.
#[derive(Default)]
struct RecordingWriter {
    calls: Mutex<Vec<(DestinationTable, Vec<DimensionalRecord>)>>,
}

#[async_trait]
impl RecordWriter for RecordingWriter {
    async fn write_records(
        &self,
        table: DestinationTable,
        records: &[DimensionalRecord],
    ) -> Result<(), SinkError> {
        self.calls.lock().unwrap().push((table, records.to_vec()));
        Ok(())
    }
}

#[tokio::test]
async fn test_bus_contact_event_end_to_end() {
    let payload = json!({
        "source": "aws.connect",
        "detail-type": "Amazon Connect Contact Event",
        "detail": {"ContactId": "c1", "Channel": "VOICE", "EventType": "DISCONNECT"}
    })
    .to_string();

    let event = decode_bus_payload(payload.as_bytes()).unwrap();
    let mut batch = Batch::new(BatchTime::from_millis(1_718_000_000_000));
    batch.ingest(&ContactEventMapper, &event);

    let writer = ChunkedWriter::new(RecordingWriter::default(), 100).unwrap();
    let summary = writer.write_batch(batch).await.unwrap();

    assert_eq!(summary.total(), 1);
    let calls = writer.inner().calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (table, records) = &calls[0];
    assert_eq!(*table, DestinationTable::ContactEvent);
    assert_eq!(
        records[0].dimensions,
        vec![
            Dimension::new("ContactId", "c1"),
            Dimension::new("InstanceId", "unknown"),
            Dimension::new("Channel", "VOICE"),
            Dimension::new("EventType", "DISCONNECT"),
        ]
    );
    assert_eq!(records[0].time, "1718000000000");
}

#[tokio::test]
async fn test_agent_event_contacts_are_sliced() {
    let contacts: Vec<_> = (0..150)
        .map(|i| json!({"ContactId": format!("c{i}"), "Channel": "CHAT"}))
        .collect();
    let event = json!({
        "Agent": {"ARN": "arn:aws:connect:eu-west-2:1:instance/i-1/agent/a-1"},
        "EventType": "HEART_BEAT",
        "InstanceId": "i-1",
        "Contacts": contacts,
    });

    let mut batch = Batch::new(BatchTime::from_millis(5));
    batch.ingest(&AgentEventMapper, &event);

    let writer = ChunkedWriter::new(RecordingWriter::default(), 100).unwrap();
    let summary = writer.write_batch(batch).await.unwrap();

    assert_eq!(
        summary.tables,
        vec![
            (DestinationTable::AgentEvent, 1),
            (DestinationTable::AgentEventContact, 150),
        ]
    );
    let calls = writer.inner().calls.lock().unwrap();
    let sizes: Vec<(DestinationTable, usize)> =
        calls.iter().map(|(t, r)| (*t, r.len())).collect();
    assert_eq!(
        sizes,
        vec![
            (DestinationTable::AgentEvent, 1),
            (DestinationTable::AgentEventContact, 100),
            (DestinationTable::AgentEventContact, 50),
        ]
    );
    assert_eq!(calls[2].1[0].dimension("ContactId"), Some("c100"));
    assert_eq!(calls[2].1[0].dimension("InstanceId"), Some("i-1"));
}
