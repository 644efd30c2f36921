use std::fmt;

use chrono::Utc;
use serde::Serialize;

/// Literal used for key fields the upstream event did not carry.
pub const UNKNOWN: &str = "unknown";

/// Logical destination of a record. Ordering is the order tables are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DestinationTable {
    AgentEvent,
    #[serde(rename = "AgentEvent_Contact")]
    AgentEventContact,
    ContactEvent,
    Instance,
    Queue,
    User,
}

impl DestinationTable {
    pub const ALL: [DestinationTable; 6] = [
        DestinationTable::AgentEvent,
        DestinationTable::AgentEventContact,
        DestinationTable::ContactEvent,
        DestinationTable::Instance,
        DestinationTable::Queue,
        DestinationTable::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DestinationTable::AgentEvent => "AgentEvent",
            DestinationTable::AgentEventContact => "AgentEvent_Contact",
            DestinationTable::ContactEvent => "ContactEvent",
            DestinationTable::Instance => "Instance",
            DestinationTable::Queue => "Queue",
            DestinationTable::User => "User",
        }
    }
}

impl fmt::Display for DestinationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MeasureType {
    Varchar,
    Bigint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Measure {
    pub name: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: MeasureType,
}

impl Measure {
    pub fn varchar(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            kind: MeasureType::Varchar,
        }
    }

    pub fn bigint(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            kind: MeasureType::Bigint,
        }
    }
}

/// Records always bundle several typed values under one measure name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MeasureValueType {
    #[default]
    Multi,
}

impl MeasureValueType {
    pub fn as_str(&self) -> &'static str {
        "MULTI"
    }
}

/// Epoch-milliseconds timestamp shared by every record of one processing batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BatchTime(i64);

impl BatchTime {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }
}

impl fmt::Display for BatchTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionalRecord {
    pub dimensions: Vec<Dimension>,
    pub measure_name: String,
    pub measure_value_type: MeasureValueType,
    pub measures: Vec<Measure>,
    pub time: String,
}

impl DimensionalRecord {
    pub fn new(
        measure_name: impl Into<String>,
        dimensions: Vec<Dimension>,
        measures: Vec<Measure>,
        time: BatchTime,
    ) -> Self {
        Self {
            dimensions,
            measure_name: measure_name.into(),
            measure_value_type: MeasureValueType::Multi,
            measures,
            time: time.to_string(),
        }
    }

    pub fn dimension(&self, name: &str) -> Option<&str> {
        self.dimensions
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.value.as_str())
    }

    pub fn measure(&self, name: &str) -> Option<&Measure> {
        self.measures.iter().find(|m| m.name == name)
    }
}

/// A mapped record together with the table it is routed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedRecord {
    pub table: DestinationTable,
    pub record: DimensionalRecord,
}

/// Body of one write call to the time-series store.
#[derive(Debug, Serialize)]
pub struct WriteRequest<'a> {
    pub table: DestinationTable,
    pub records: &'a [DimensionalRecord],
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_request_wire_shape() {
        let record = DimensionalRecord::new(
            "ContactEvent",
            vec![Dimension::new("ContactId", "c1")],
            vec![
                Measure::varchar("QueueName", "Sales"),
                Measure::bigint("MaxContacts", "12"),
            ],
            BatchTime::from_millis(1_700_000_000_000),
        );
        let records = vec![record];
        let request = WriteRequest {
            table: DestinationTable::ContactEvent,
            records: &records,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "table": "ContactEvent",
                "records": [{
                    "dimensions": [{"name": "ContactId", "value": "c1"}],
                    "measureName": "ContactEvent",
                    "measureValueType": "MULTI",
                    "measures": [
                        {"name": "QueueName", "value": "Sales", "type": "VARCHAR"},
                        {"name": "MaxContacts", "value": "12", "type": "BIGINT"}
                    ],
                    "time": "1700000000000"
                }]
            })
        );
    }

    #[test]
    fn test_agent_contact_table_name() {
        assert_eq!(
            DestinationTable::AgentEventContact.to_string(),
            "AgentEvent_Contact"
        );
        let value = serde_json::to_value(DestinationTable::AgentEventContact).unwrap();
        assert_eq!(value, json!("AgentEvent_Contact"));
    }
}
