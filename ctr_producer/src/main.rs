use std::time::Duration;

use anyhow::{Context, Result};
use connect_pipeline::telemetry::init_tracing;
use tracing::{info, warn};

mod config;
mod ctr;
mod kafka;

use config::ProducerConfig;
use ctr::CtrGenerator;
use kafka::{CtrPublisher, PublishReport};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ProducerConfig::from_env().context("failed to load configuration")?;
    init_tracing(&config.log_level)?;

    info!(
        kafka_server = %config.kafka_server,
        topic = %config.topic,
        record_count = config.record_count,
        batch_size = config.batch_size,
        "starting CTR producer"
    );

    let publisher = CtrPublisher::new(
        &config.kafka_server,
        config.topic.clone(),
        Duration::from_secs(config.flush_timeout_secs),
    )
    .context("failed to create kafka producer")?;

    let generator = CtrGenerator::new(config.account_id.clone(), config.instance_id.clone());
    let batch_size = config.batch_size.max(1);
    let mut total = PublishReport::default();
    let mut remaining = config.record_count;
    let mut batch_number = 0;

    while remaining > 0 {
        let count = remaining.min(batch_size);
        let records = generator.generate(count);

        let report = publisher
            .publish_batch(&records)
            .context("failed to flush kafka queue")?;
        batch_number += 1;
        info!(batch = batch_number, sent = report.sent, failed = report.failed, "published batch");

        total.sent += report.sent;
        total.failed += report.failed;
        remaining -= count;

        if remaining > 0 {
            tokio::time::sleep(Duration::from_secs(config.delay_between_batches_secs)).await;
        }
    }

    if total.failed > 0 {
        warn!(failed = total.failed, "some records were not published");
    }
    info!(sent = total.sent, "all record(s) sent");
    Ok(())
}
