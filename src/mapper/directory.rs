use serde_json::{json, Value};

use super::{extract, FieldRule};
use crate::error::MapError;
use crate::record::{BatchTime, DestinationTable, DimensionalRecord, RoutedRecord};

const INSTANCE_PLAN: &[FieldRule] = &[
    FieldRule::dimension("InstanceId", &["Id"]),
    FieldRule::dimension("InstanceType", &["InstanceType"]),
    FieldRule::varchar("InstanceARN", &["Arn"]).or("unknown"),
    FieldRule::varchar("InstanceAlias", &["InstanceAlias"]).or(""),
    FieldRule::varchar("CreatedTime", &["CreatedTime"]).or(""),
    FieldRule::varchar("ServiceRole", &["ServiceRole"]),
    FieldRule::varchar("InstanceStatus", &["InstanceStatus"]),
];

// Queue and user plans read a composite of the listing summary and the
// describe detail, so both sources flow through the same interpreter.
const QUEUE_PLAN: &[FieldRule] = &[
    FieldRule::dimension("InstanceId", &["InstanceId"]),
    FieldRule::dimension("QueueId", &["Summary", "Id"]),
    FieldRule::varchar("QueueARN", &["Summary", "Arn"]).or("unknown"),
    FieldRule::varchar("QueueName", &["Detail", "Name"]).or(""),
    FieldRule::varchar("QueueDescription", &["Detail", "Description"]).or(""),
    FieldRule::varchar("QueueType", &["Detail", "QueueType"]),
    FieldRule::varchar("QueueStatus", &["Detail", "Status"]),
    FieldRule::bigint("MaxContacts", &["Detail", "MaxContacts"]),
];

const USER_PLAN: &[FieldRule] = &[
    FieldRule::dimension("InstanceId", &["InstanceId"]),
    FieldRule::dimension("UserId", &["Summary", "Id"]),
    FieldRule::dimension("RoutingProfileId", &["Detail", "RoutingProfileId"]).optional(),
    FieldRule::varchar("UserARN", &["Summary", "Arn"]).or("unknown"),
    FieldRule::varchar("Username", &["Detail", "Username"]).or(""),
    FieldRule::varchar("FirstName", &["Detail", "IdentityInfo", "FirstName"]),
    FieldRule::varchar("LastName", &["Detail", "IdentityInfo", "LastName"]),
    FieldRule::varchar("Email", &["Detail", "IdentityInfo", "Email"]),
    FieldRule::varchar("PhoneType", &["Detail", "PhoneConfig", "PhoneType"]),
    FieldRule::varchar("HierarchyGroupId", &["Detail", "HierarchyGroupId"]),
];

pub fn map_instance(summary: &Value, time: BatchTime) -> Result<RoutedRecord, MapError> {
    if !summary.is_object() {
        return Err(MapError::NotAnObject);
    }
    let extracted = extract(summary, INSTANCE_PLAN)?;
    Ok(RoutedRecord {
        table: DestinationTable::Instance,
        record: DimensionalRecord::new(
            "Instance",
            extracted.dimensions,
            extracted.measures,
            time,
        ),
    })
}

/// `detail` is the describe result; callers pass the summary again when the
/// describe call failed.
pub fn map_queue(
    instance_id: &str,
    summary: &Value,
    detail: &Value,
    time: BatchTime,
) -> Result<RoutedRecord, MapError> {
    map_entity(
        DestinationTable::Queue,
        "Queue",
        QUEUE_PLAN,
        instance_id,
        summary,
        detail,
        time,
    )
}

pub fn map_user(
    instance_id: &str,
    summary: &Value,
    detail: &Value,
    time: BatchTime,
) -> Result<RoutedRecord, MapError> {
    map_entity(
        DestinationTable::User,
        "User",
        USER_PLAN,
        instance_id,
        summary,
        detail,
        time,
    )
}

fn map_entity(
    table: DestinationTable,
    measure_name: &str,
    plan: &[FieldRule],
    instance_id: &str,
    summary: &Value,
    detail: &Value,
    time: BatchTime,
) -> Result<RoutedRecord, MapError> {
    if !summary.is_object() || !detail.is_object() {
        return Err(MapError::NotAnObject);
    }
    let composite = json!({
        "InstanceId": instance_id,
        "Summary": summary,
        "Detail": detail,
    });
    let extracted = extract(&composite, plan)?;

    Ok(RoutedRecord {
        table,
        record: DimensionalRecord::new(
            measure_name,
            extracted.dimensions,
            extracted.measures,
            time,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Dimension, Measure};

    const TIME: BatchTime = BatchTime::from_millis(1_718_000_000_000);

    #[test]
    fn test_instance_record() {
        let summary = json!({
            "Id": "inst-1",
            "Arn": "arn:aws:connect:eu-west-2:1:instance/inst-1",
            "InstanceAlias": "contact-centre",
            "InstanceStatus": "ACTIVE"
        });

        let routed = map_instance(&summary, TIME).unwrap();

        assert_eq!(routed.table, DestinationTable::Instance);
        assert_eq!(
            routed.record.dimensions,
            vec![
                Dimension::new("InstanceId", "inst-1"),
                Dimension::new("InstanceType", "unknown"),
            ]
        );
        assert_eq!(
            routed.record.measures,
            vec![
                Measure::varchar("InstanceARN", "arn:aws:connect:eu-west-2:1:instance/inst-1"),
                Measure::varchar("InstanceAlias", "contact-centre"),
                Measure::varchar("CreatedTime", ""),
                Measure::varchar("InstanceStatus", "ACTIVE"),
            ]
        );
    }

    #[test]
    fn test_queue_from_detail() {
        let summary = json!({"Id": "q1", "Arn": "arn:queue/q1", "Name": "Sales"});
        let detail = json!({"Name": "Sales", "Status": "ENABLED", "MaxContacts": 25});

        let routed = map_queue("inst-1", &summary, &detail, TIME).unwrap();

        assert_eq!(routed.record.dimension("QueueId"), Some("q1"));
        assert_eq!(
            routed.record.measures,
            vec![
                Measure::varchar("QueueARN", "arn:queue/q1"),
                Measure::varchar("QueueName", "Sales"),
                Measure::varchar("QueueDescription", ""),
                Measure::varchar("QueueStatus", "ENABLED"),
                Measure::bigint("MaxContacts", "25"),
            ]
        );
    }

    #[test]
    fn test_user_falls_back_to_summary() {
        let summary = json!({"Id": "u1", "Arn": "arn:user/u1", "Username": "jsmith"});

        let routed = map_user("inst-1", &summary, &summary, TIME).unwrap();

        assert_eq!(
            routed.record.dimensions,
            vec![
                Dimension::new("InstanceId", "inst-1"),
                Dimension::new("UserId", "u1"),
            ]
        );
        assert_eq!(
            routed.record.measures,
            vec![
                Measure::varchar("UserARN", "arn:user/u1"),
                Measure::varchar("Username", "jsmith"),
            ]
        );
    }

    #[test]
    fn test_user_detail_fields() {
        let summary = json!({"Id": "u2", "Arn": "arn:user/u2"});
        let detail = json!({
            "Username": "mlee",
            "RoutingProfileId": "rp-1",
            "IdentityInfo": {"FirstName": "Morgan", "Email": "morgan@example.com"},
            "PhoneConfig": {"PhoneType": "SOFT_PHONE"}
        });

        let routed = map_user("inst-1", &summary, &detail, TIME).unwrap();

        assert_eq!(routed.record.dimension("RoutingProfileId"), Some("rp-1"));
        assert!(routed.record.measure("LastName").is_none());
        assert_eq!(
            routed.record.measure("PhoneType"),
            Some(&Measure::varchar("PhoneType", "SOFT_PHONE"))
        );
    }
}
