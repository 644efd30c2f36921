//! Paginated walks over the contact-center directory (instances, queues,
//! users) and the periodic snapshot built from them.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::batch::Batch;
use crate::error::{DirectoryError, MapError};
use crate::mapper::{map_instance, map_queue, map_user};
use crate::record::BatchTime;
use crate::writer::{ChunkedWriter, RecordWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Instance,
    Queue,
    User,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::Instance => "instances",
            ResourceKind::Queue => "queues",
            ResourceKind::User => "users",
        })
    }
}

/// One page of a listing call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Value>,
    pub next_token: Option<String>,
}

/// Listing and describe calls of the directory API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// `instance_id` is `None` only for [`ResourceKind::Instance`].
    async fn list_page(
        &self,
        kind: ResourceKind,
        instance_id: Option<String>,
        next_token: Option<String>,
    ) -> anyhow::Result<Page>;

    /// Full entity for a queue or user summary.
    async fn describe(
        &self,
        kind: ResourceKind,
        instance_id: String,
        id: String,
    ) -> anyhow::Result<Value>;
}

/// Follows continuation tokens until a page comes back without one.
/// A failed page discards everything gathered so far.
pub async fn list_all(
    client: &dyn DirectoryClient,
    kind: ResourceKind,
    instance_id: Option<&str>,
) -> Result<Vec<Value>, DirectoryError> {
    let mut items = Vec::new();
    let mut next_token = None;
    let mut page = 0;

    loop {
        let result = client
            .list_page(kind, instance_id.map(str::to_string), next_token.take())
            .await
            .map_err(|source| DirectoryError::Listing {
                kind,
                scope: instance_id.unwrap_or("account").to_string(),
                page,
                source,
            })?;

        debug!(%kind, page, count = result.items.len(), "fetched page");
        items.extend(result.items);
        page += 1;

        match result.next_token {
            Some(token) if !token.is_empty() => next_token = Some(token),
            _ => break,
        }
    }

    Ok(items)
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PollReport {
    pub instances: usize,
    pub failed_instances: usize,
    pub records_written: usize,
    pub skipped: usize,
}

/// Collects every instance with its queues and users, writing each instance's
/// records before moving to the next one.
///
/// A failed instance listing or write aborts the cycle. A failed queue or user
/// listing only abandons that instance.
#[instrument(skip_all, fields(time = %time))]
pub async fn poll_directory<W: RecordWriter>(
    client: &dyn DirectoryClient,
    writer: &ChunkedWriter<W>,
    time: BatchTime,
) -> Result<PollReport, DirectoryError> {
    let instances = list_all(client, ResourceKind::Instance, None).await?;
    info!(count = instances.len(), "listed instances");

    let mut report = PollReport::default();
    for instance in &instances {
        report.instances += 1;
        let Some(instance_id) = instance.get("Id").and_then(Value::as_str) else {
            warn!("instance summary without Id, skipping");
            report.skipped += 1;
            report.failed_instances += 1;
            continue;
        };

        let batch = match snapshot_instance(client, instance_id, instance, time).await {
            Ok(batch) => batch,
            Err(e) => {
                error!(instance_id, error = %e, "failed to collect instance data");
                report.failed_instances += 1;
                continue;
            }
        };

        report.skipped += batch.counts().skipped;
        match writer.write_batch(batch).await {
            Ok(summary) => report.records_written += summary.total(),
            Err(source) => {
                report.records_written += source.records_committed();
                error!(
                    instance_id,
                    instances = report.instances,
                    records_written = report.records_written,
                    error = %source,
                    "write failed, aborting poll"
                );
                return Err(DirectoryError::Write { report, source });
            }
        }
    }

    info!(
        instances = report.instances,
        failed_instances = report.failed_instances,
        records_written = report.records_written,
        "directory poll complete"
    );
    Ok(report)
}

async fn snapshot_instance(
    client: &dyn DirectoryClient,
    instance_id: &str,
    instance: &Value,
    time: BatchTime,
) -> Result<Batch, DirectoryError> {
    let mut batch = Batch::new(time);
    admit(&mut batch, map_instance(instance, time));

    let queues = list_all(client, ResourceKind::Queue, Some(instance_id)).await?;
    for queue in &queues {
        let detail = describe_or_summary(client, ResourceKind::Queue, instance_id, queue).await;
        admit(&mut batch, map_queue(instance_id, queue, &detail, time));
    }

    let users = list_all(client, ResourceKind::User, Some(instance_id)).await?;
    for user in &users {
        let detail = describe_or_summary(client, ResourceKind::User, instance_id, user).await;
        admit(&mut batch, map_user(instance_id, user, &detail, time));
    }

    debug!(
        instance_id,
        queues = queues.len(),
        users = users.len(),
        "collected instance snapshot"
    );
    Ok(batch)
}

fn admit(batch: &mut Batch, mapped: Result<crate::record::RoutedRecord, MapError>) {
    match mapped {
        Ok(routed) => batch.push(routed),
        Err(e) => batch.skip(&e),
    }
}

async fn describe_or_summary(
    client: &dyn DirectoryClient,
    kind: ResourceKind,
    instance_id: &str,
    summary: &Value,
) -> Value {
    let Some(id) = summary.get("Id").and_then(Value::as_str) else {
        return summary.clone();
    };
    match client
        .describe(kind, instance_id.to_string(), id.to_string())
        .await
    {
        Ok(detail) => detail,
        Err(e) => {
            warn!(%kind, instance_id, id, error = %e, "describe failed, using summary");
            summary.clone()
        }
    }
}
