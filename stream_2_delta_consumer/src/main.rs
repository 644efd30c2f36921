use std::time::Duration;

use anyhow::{Context, Result};
use connect_pipeline::delta::{report_existing_tables, DeltaRecordWriter};
use connect_pipeline::telemetry::init_tracing;
use connect_pipeline::{BatchTime, ChunkedWriter, DestinationTable};
use tracing::info;

mod config;
mod kafka;
mod pipeline;

use config::ConsumerConfig;
use pipeline::Topics;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ConsumerConfig::from_env().context("failed to load configuration")?;
    init_tracing(&config.log_level)?;

    info!(
        bootstrap_servers = %config.bootstrap_servers,
        agent_topic = %config.agent_topic,
        contact_topic = %config.contact_topic,
        output_dir = %config.output_dir,
        "starting stream consumer"
    );

    let sink = DeltaRecordWriter::new(config.output_dir.clone());
    report_existing_tables(&sink, &DestinationTable::ALL).await?;
    let writer = ChunkedWriter::new(sink, config.max_chunk)?;
    info!(max_chunk = writer.max_chunk(), "delta writer ready");

    let consumer = kafka::create_consumer(&config).context("failed to create kafka consumer")?;
    let topics = Topics {
        agent: config.agent_topic.clone(),
        contact: config.contact_topic.clone(),
    };
    let batch_size = config.batch_size.max(1);
    let batch_wait = Duration::from_secs(config.batch_wait_secs);

    loop {
        let messages = kafka::next_batch(&consumer, batch_size, batch_wait).await;
        if messages.is_empty() {
            continue;
        }

        let batch = pipeline::build_batch(&messages, &topics, BatchTime::now());
        let counts = batch.counts();

        // A failed write leaves the offsets unstored so the batch is redelivered.
        let summary = writer.write_batch(batch).await?;
        kafka::store_offsets(&consumer, &messages).context("failed to store offsets")?;

        info!(
            messages = messages.len(),
            mapped = counts.mapped,
            ignored = counts.ignored,
            skipped = counts.skipped,
            written = summary.total(),
            "processed batch"
        );
    }
}
