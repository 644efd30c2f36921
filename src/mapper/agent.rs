use serde_json::Value;

use super::{extract, EventMapper, FieldRule, MapOutcome};
use crate::error::MapError;
use crate::event::{lookup, InboundEvent};
use crate::record::{BatchTime, DestinationTable, Dimension, DimensionalRecord, RoutedRecord};

const AGENT_EVENT_DIMENSIONS: &[FieldRule] = &[
    FieldRule::dimension("AgentARN", &["Agent", "ARN"]),
    FieldRule::dimension("InstanceId", &["InstanceId"]),
    FieldRule::dimension("EventType", &["EventType"]),
    FieldRule::dimension("EventTimestamp", &["EventTimestamp"]),
];

const AGENT_EVENT_MEASURES: &[FieldRule] = &[
    FieldRule::varchar("EventId", &["EventId"]).or("unknown"),
    FieldRule::varchar("StateReason", &["StateReason"]),
    FieldRule::varchar(
        "Username",
        &["CurrentAgentSnapshot", "Configuration", "Username"],
    ),
    FieldRule::varchar(
        "FirstName",
        &["CurrentAgentSnapshot", "Configuration", "FirstName"],
    ),
    FieldRule::varchar(
        "LastName",
        &["CurrentAgentSnapshot", "Configuration", "LastName"],
    ),
    FieldRule::varchar(
        "AgentStatusName",
        &["CurrentAgentSnapshot", "AgentStatus", "Name"],
    ),
    FieldRule::varchar(
        "AgentStatusType",
        &["CurrentAgentSnapshot", "AgentStatus", "Type"],
    ),
    FieldRule::bigint(
        "AgentStatusDuration",
        &["CurrentAgentSnapshot", "AgentStatus", "Duration"],
    ),
];

// Dimensions the contact sub-records take from the parent event.
const PARENT_AGENT_DIMENSION: &[FieldRule] = &[
    FieldRule::dimension("AgentARN", &["Agent", "ARN"]),
    FieldRule::dimension("InstanceId", &["InstanceId"]),
];

const PARENT_EVENT_TYPE: &[FieldRule] = &[FieldRule::dimension("EventType", &["EventType"])];

const CONTACT_DIMENSIONS: &[FieldRule] = &[
    FieldRule::dimension("ContactId", &["ContactId"]),
    FieldRule::dimension("Channel", &["Channel"]),
];

const CONTACT_MEASURES: &[FieldRule] = &[
    FieldRule::varchar("StateStartTimestamp", &["StateStartTimestamp"]),
    FieldRule::varchar("ContactState", &["State"]),
    FieldRule::varchar("ConnectedToAgentTimestamp", &["ConnectedToAgentTimestamp"]),
    FieldRule::varchar("QueueName", &["Queue", "Name"]),
];

/// Maps agent events read off the agent-event stream into `AgentEvent` and
/// `AgentEvent_Contact` records.
#[derive(Debug, Default, Clone, Copy)]
pub struct AgentEventMapper;

impl AgentEventMapper {
    fn agent_event(&self, event: &Value, time: BatchTime) -> Result<DimensionalRecord, MapError> {
        let mut dims = extract(event, AGENT_EVENT_DIMENSIONS)?;
        dims.dimensions.extend(hierarchy_dimensions(event)?);
        let measures = extract(event, AGENT_EVENT_MEASURES)?;

        Ok(DimensionalRecord::new(
            "AgentEvent",
            dims.dimensions,
            measures.measures,
            time,
        ))
    }

    fn contact_records(
        &self,
        event: &Value,
        time: BatchTime,
    ) -> Result<Vec<DimensionalRecord>, MapError> {
        let Some(contacts) = lookup(event, &["Contacts"])? else {
            return Ok(Vec::new());
        };
        let contacts = contacts.as_array().ok_or_else(|| MapError::NotAList {
            path: "Contacts".to_string(),
        })?;

        let parent = extract(event, PARENT_AGENT_DIMENSION)?;
        let event_type = extract(event, PARENT_EVENT_TYPE)?;

        contacts
            .iter()
            .enumerate()
            .map(|(index, contact)| {
                if !contact.is_object() {
                    return Err(MapError::BadListEntry {
                        path: "Contacts".to_string(),
                        index,
                    });
                }
                let mut dimensions = parent.dimensions.clone();
                dimensions.extend(extract(contact, CONTACT_DIMENSIONS)?.dimensions);
                dimensions.extend(event_type.dimensions.iter().cloned());
                let measures = extract(contact, CONTACT_MEASURES)?.measures;

                Ok(DimensionalRecord::new(
                    "AgentEventContact",
                    dimensions,
                    measures,
                    time,
                ))
            })
            .collect()
    }
}

impl EventMapper for AgentEventMapper {
    fn map(&self, event: &InboundEvent, time: BatchTime) -> Result<MapOutcome, MapError> {
        if !event.is_object() {
            return Err(MapError::NotAnObject);
        }
        let Some(agent) = lookup(event, &["Agent"])? else {
            return Ok(MapOutcome::Ignored("not an agent event"));
        };
        if lookup(event, &["EventType"])?.is_none() {
            return Ok(MapOutcome::Ignored("not an agent event"));
        }
        if !agent.is_object() {
            return Err(MapError::NotAnObjectAt {
                path: "Agent".to_string(),
            });
        }

        let mut records = vec![RoutedRecord {
            table: DestinationTable::AgentEvent,
            record: self.agent_event(event, time)?,
        }];
        records.extend(
            self.contact_records(event, time)?
                .into_iter()
                .map(|record| RoutedRecord {
                    table: DestinationTable::AgentEventContact,
                    record,
                }),
        );

        Ok(MapOutcome::Records(records))
    }
}

/// `Agent.HierarchyPath` levels as `Hierarchy<Level>` dimensions. A level is
/// either a plain name or an object carrying `Name`; anything else is dropped.
fn hierarchy_dimensions(event: &Value) -> Result<Vec<Dimension>, MapError> {
    let Some(levels) = lookup(event, &["Agent", "HierarchyPath"])?.and_then(Value::as_object)
    else {
        return Ok(Vec::new());
    };

    Ok(levels
        .iter()
        .filter_map(|(level, entry)| {
            let name = match entry {
                Value::String(name) => Some(name.as_str()),
                Value::Object(fields) => fields.get("Name").and_then(Value::as_str),
                _ => None,
            }?;
            Some(Dimension::new(format!("Hierarchy{level}"), name))
        })
        .collect())
}
