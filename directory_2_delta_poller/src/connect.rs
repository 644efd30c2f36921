//! Amazon Connect implementation of [`DirectoryClient`].
//!
//! SDK shapes are converted to JSON under the Connect API's own key names so
//! the directory plans read them the same way they would read a raw response.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_connect::primitives::{DateTime, DateTimeFormat};
use aws_sdk_connect::types::{
    InstanceSummary, PhoneType, Queue, QueueSummary, QueueType, User, UserSummary,
};
use aws_sdk_connect::Client;
use connect_pipeline::{DirectoryClient, Page, ResourceKind};
use serde_json::{Map, Value};
use tracing::debug;

const INSTANCE_PAGE_SIZE: i32 = 10;
const ENTITY_PAGE_SIZE: i32 = 100;

pub struct ConnectDirectory {
    client: Client,
}

impl ConnectDirectory {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn list_instances(&self, next_token: Option<String>) -> Result<Page> {
        let out = self
            .client
            .list_instances()
            .max_results(INSTANCE_PAGE_SIZE)
            .set_next_token(next_token)
            .send()
            .await
            .context("ListInstances failed")?;

        Ok(Page {
            items: out.instance_summary_list().iter().map(instance_json).collect(),
            next_token: out.next_token().map(str::to_string),
        })
    }

    async fn list_queues(&self, instance_id: String, next_token: Option<String>) -> Result<Page> {
        let out = self
            .client
            .list_queues()
            .instance_id(instance_id)
            .queue_types(QueueType::Standard)
            .max_results(ENTITY_PAGE_SIZE)
            .set_next_token(next_token)
            .send()
            .await
            .context("ListQueues failed")?;

        Ok(Page {
            items: out.queue_summary_list().iter().map(queue_summary_json).collect(),
            next_token: out.next_token().map(str::to_string),
        })
    }

    async fn list_users(&self, instance_id: String, next_token: Option<String>) -> Result<Page> {
        let out = self
            .client
            .list_users()
            .instance_id(instance_id)
            .max_results(ENTITY_PAGE_SIZE)
            .set_next_token(next_token)
            .send()
            .await
            .context("ListUsers failed")?;

        Ok(Page {
            items: out.user_summary_list().iter().map(user_summary_json).collect(),
            next_token: out.next_token().map(str::to_string),
        })
    }
}

#[async_trait]
impl DirectoryClient for ConnectDirectory {
    async fn list_page(
        &self,
        kind: ResourceKind,
        instance_id: Option<String>,
        next_token: Option<String>,
    ) -> Result<Page> {
        debug!(%kind, ?instance_id, "listing page");
        match (kind, instance_id) {
            (ResourceKind::Instance, _) => self.list_instances(next_token).await,
            (ResourceKind::Queue, Some(id)) => self.list_queues(id, next_token).await,
            (ResourceKind::User, Some(id)) => self.list_users(id, next_token).await,
            (kind, None) => anyhow::bail!("listing {kind} requires an instance id"),
        }
    }

    async fn describe(&self, kind: ResourceKind, instance_id: String, id: String) -> Result<Value> {
        match kind {
            ResourceKind::Queue => {
                let out = self
                    .client
                    .describe_queue()
                    .instance_id(instance_id)
                    .queue_id(id)
                    .send()
                    .await
                    .context("DescribeQueue failed")?;
                out.queue()
                    .map(queue_json)
                    .context("DescribeQueue returned no queue")
            }
            ResourceKind::User => {
                let out = self
                    .client
                    .describe_user()
                    .instance_id(instance_id)
                    .user_id(id)
                    .send()
                    .await
                    .context("DescribeUser failed")?;
                out.user()
                    .map(user_json)
                    .context("DescribeUser returned no user")
            }
            ResourceKind::Instance => anyhow::bail!("instances are not described"),
        }
    }
}

fn put(map: &mut Map<String, Value>, key: &str, value: Option<impl Into<Value>>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value.into());
    }
}

fn timestamp(time: &DateTime) -> Option<String> {
    time.fmt(DateTimeFormat::DateTime).ok()
}

fn instance_json(summary: &InstanceSummary) -> Value {
    let mut m = Map::new();
    put(&mut m, "Id", summary.id());
    put(&mut m, "Arn", summary.arn());
    put(
        &mut m,
        "IdentityManagementType",
        summary.identity_management_type().map(|t| t.as_str()),
    );
    put(&mut m, "InstanceAlias", summary.instance_alias());
    put(&mut m, "CreatedTime", summary.created_time().and_then(timestamp));
    put(&mut m, "ServiceRole", summary.service_role());
    put(
        &mut m,
        "InstanceStatus",
        summary.instance_status().map(|s| s.as_str()),
    );
    Value::Object(m)
}

fn queue_summary_json(summary: &QueueSummary) -> Value {
    let mut m = Map::new();
    put(&mut m, "Id", summary.id());
    put(&mut m, "Arn", summary.arn());
    put(&mut m, "Name", summary.name());
    put(&mut m, "QueueType", summary.queue_type().map(|t| t.as_str()));
    Value::Object(m)
}

fn queue_json(queue: &Queue) -> Value {
    let mut m = Map::new();
    put(&mut m, "QueueId", queue.queue_id());
    put(&mut m, "QueueArn", queue.queue_arn());
    put(&mut m, "Name", queue.name());
    put(&mut m, "Description", queue.description());
    put(&mut m, "HoursOfOperationId", queue.hours_of_operation_id());
    put(&mut m, "MaxContacts", queue.max_contacts());
    put(&mut m, "Status", queue.status().map(|s| s.as_str()));
    Value::Object(m)
}

fn user_summary_json(summary: &UserSummary) -> Value {
    let mut m = Map::new();
    put(&mut m, "Id", summary.id());
    put(&mut m, "Arn", summary.arn());
    put(&mut m, "Username", summary.username());
    Value::Object(m)
}

fn user_json(user: &User) -> Value {
    let mut m = Map::new();
    put(&mut m, "Id", user.id());
    put(&mut m, "Arn", user.arn());
    put(&mut m, "Username", user.username());
    put(&mut m, "RoutingProfileId", user.routing_profile_id());
    put(&mut m, "HierarchyGroupId", user.hierarchy_group_id());

    if let Some(info) = user.identity_info() {
        let mut identity = Map::new();
        put(&mut identity, "FirstName", info.first_name());
        put(&mut identity, "LastName", info.last_name());
        put(&mut identity, "Email", info.email());
        m.insert("IdentityInfo".to_string(), Value::Object(identity));
    }

    if let Some(phone) = user.phone_config() {
        let phone_type: Option<&PhoneType> = phone.phone_type().into();
        let mut config = Map::new();
        put(&mut config, "PhoneType", phone_type.map(|t| t.as_str()));
        put(&mut config, "DeskPhoneNumber", phone.desk_phone_number());
        m.insert("PhoneConfig".to_string(), Value::Object(config));
    }

    Value::Object(m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_connect::types::{InstanceStatus, QueueStatus, UserIdentityInfo};
    use serde_json::json;

    #[test]
    fn test_instance_json_uses_connect_keys() {
        let summary = InstanceSummary::builder()
            .id("i-1")
            .arn("arn:aws:connect:eu-west-2:1:instance/i-1")
            .instance_alias("support")
            .instance_status(InstanceStatus::Active)
            .created_time(DateTime::from_secs(0))
            .build();

        assert_eq!(
            instance_json(&summary),
            json!({
                "Id": "i-1",
                "Arn": "arn:aws:connect:eu-west-2:1:instance/i-1",
                "InstanceAlias": "support",
                "CreatedTime": "1970-01-01T00:00:00Z",
                "InstanceStatus": "ACTIVE",
            })
        );
    }

    #[test]
    fn test_queue_detail_keeps_numbers() {
        let queue = Queue::builder()
            .queue_id("q-1")
            .name("Sales")
            .max_contacts(25)
            .status(QueueStatus::Enabled)
            .build();

        let value = queue_json(&queue);

        assert_eq!(value["MaxContacts"], 25);
        assert_eq!(value["Status"], "ENABLED");
        assert!(value.get("Description").is_none());
    }

    #[test]
    fn test_user_json_nests_identity() {
        let user = User::builder()
            .id("u-1")
            .username("jdoe")
            .routing_profile_id("rp-1")
            .identity_info(
                UserIdentityInfo::builder()
                    .first_name("Jane")
                    .last_name("Doe")
                    .build(),
            )
            .build();

        let value = user_json(&user);

        assert_eq!(value["IdentityInfo"], json!({"FirstName": "Jane", "LastName": "Doe"}));
        assert_eq!(value["RoutingProfileId"], "rp-1");
        assert!(value.get("PhoneConfig").is_none());
    }

    #[test]
    fn test_summaries_flow_through_directory_plans() {
        let summary = queue_summary_json(
            &QueueSummary::builder()
                .id("q-1")
                .arn("arn:q-1")
                .name("Sales")
                .queue_type(QueueType::Standard)
                .build(),
        );
        let detail = queue_json(&Queue::builder().name("Sales").max_contacts(5).build());

        let routed = connect_pipeline::map_queue(
            "i-1",
            &summary,
            &detail,
            connect_pipeline::BatchTime::from_millis(1),
        )
        .unwrap();

        assert_eq!(routed.record.dimension("QueueId"), Some("q-1"));
        assert_eq!(
            routed.record.measure("MaxContacts").map(|m| m.value.as_str()),
            Some("5")
        );
    }
}
