use std::time::Duration;

use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use connect_pipeline::delta::DeltaRecordWriter;
use connect_pipeline::telemetry::init_tracing;
use connect_pipeline::{poll_directory, BatchTime, ChunkedWriter};
use tracing::{error, info};

mod config;
mod connect;

use config::PollerConfig;
use connect::ConnectDirectory;

async fn create_client(config: &PollerConfig) -> aws_sdk_connect::Client {
    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()))
        .load()
        .await;

    let mut builder = aws_sdk_connect::config::Builder::from(&sdk_config);
    if let Some(endpoint) = &config.endpoint_url {
        builder = builder.endpoint_url(endpoint);
    }
    aws_sdk_connect::Client::from_conf(builder.build())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = PollerConfig::from_env().context("failed to load configuration")?;
    init_tracing(&config.log_level)?;

    info!(
        region = %config.region,
        output_dir = %config.output_dir,
        poll_interval_secs = config.poll_interval_secs,
        "starting directory poller"
    );

    let directory = ConnectDirectory::new(create_client(&config).await);
    let writer = ChunkedWriter::new(
        DeltaRecordWriter::new(config.output_dir.clone()),
        config.max_chunk,
    )?;
    info!(max_chunk = writer.max_chunk(), "delta writer ready");
    let interval = Duration::from_secs(config.poll_interval_secs);

    loop {
        match poll_directory(&directory, &writer, BatchTime::now()).await {
            Ok(report) => info!(
                instances = report.instances,
                records_written = report.records_written,
                "snapshot stored"
            ),
            Err(e) if config.run_once => return Err(e.into()),
            Err(e) => error!(error = %e, "directory poll failed"),
        }

        if config.run_once {
            return Ok(());
        }
        tokio::time::sleep(interval).await;
    }
}
