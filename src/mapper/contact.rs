use serde_json::Value;

use super::{extract, EventMapper, FieldRule, MapOutcome};
use crate::error::MapError;
use crate::event::{lookup, InboundEvent};
use crate::record::{BatchTime, DestinationTable, DimensionalRecord, RoutedRecord};

pub const CONNECT_SOURCE: &str = "aws.connect";
pub const CONTACT_EVENT_DETAIL_TYPE: &str = "Amazon Connect Contact Event";

const CONTACT_EVENT_PLAN: &[FieldRule] = &[
    FieldRule::dimension("ContactId", &["ContactId"]),
    FieldRule::dimension("InstanceId", &["InstanceArn"]).arn_suffix(),
    FieldRule::dimension("Channel", &["Channel"]),
    FieldRule::dimension("EventType", &["EventType"]),
    FieldRule::dimension("InitiationMethod", &["InitiationMethod"]).optional(),
    FieldRule::varchar("ContactEventTimestamp", &["EventTimestamp"]),
    FieldRule::varchar("InitiationTimestamp", &["InitiationTimestamp"]),
    FieldRule::varchar("DisconnectTimestamp", &["DisconnectTimestamp"]),
    FieldRule::varchar("QueueName", &["Queue", "Name"]),
    FieldRule::varchar("QueueARN", &["Queue", "ARN"]),
    FieldRule::varchar("EnqueueTimestamp", &["Queue", "EnqueueTimestamp"]),
    FieldRule::varchar("DequeueTimestamp", &["Queue", "DequeueTimestamp"]),
    FieldRule::varchar("AgentARN", &["Agent", "ARN"]),
    FieldRule::varchar(
        "ConnectedToAgentTimestamp",
        &["Agent", "ConnectedToAgentTimestamp"],
    ),
    FieldRule::varchar("CustomerEndpointAddress", &["CustomerEndpoint", "Address"]),
    FieldRule::varchar("CustomerEndpointType", &["CustomerEndpoint", "Type"]),
    FieldRule::varchar("SystemEndpointAddress", &["SystemEndpoint", "Address"]),
    FieldRule::varchar("SystemEndpointType", &["SystemEndpoint", "Type"]),
];

/// Maps contact events delivered through the event bus into `ContactEvent`
/// records. Any other bus traffic is ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContactEventMapper;

impl EventMapper for ContactEventMapper {
    fn map(&self, event: &InboundEvent, time: BatchTime) -> Result<MapOutcome, MapError> {
        if !event.is_object() {
            return Err(MapError::NotAnObject);
        }
        let source = lookup(event, &["source"])?.and_then(Value::as_str);
        let detail_type = lookup(event, &["detail-type"])?.and_then(Value::as_str);
        if source != Some(CONNECT_SOURCE) || detail_type != Some(CONTACT_EVENT_DETAIL_TYPE) {
            return Ok(MapOutcome::Ignored("not a Connect contact event"));
        }

        let empty = Value::Object(Default::default());
        let detail = lookup(event, &["detail"])?.unwrap_or(&empty);
        if !detail.is_object() {
            return Err(MapError::NotAnObjectAt {
                path: "detail".to_string(),
            });
        }
        let extracted = extract(detail, CONTACT_EVENT_PLAN)?;

        Ok(MapOutcome::Records(vec![RoutedRecord {
            table: DestinationTable::ContactEvent,
            record: DimensionalRecord::new(
                "ContactEvent",
                extracted.dimensions,
                extracted.measures,
                time,
            ),
        }]))
    }
}
