use anyhow::Context;
use clap::Parser;
use ib_sync_service::adapters::feed_client::HttpFeedClient;
use ib_sync_service::adapters::s3_store::S3ObjectStore;
use ib_sync_service::config::Cli;
use ib_sync_service::logging::init_tracing;
use ib_sync_service::scheduler::{install_shutdown_signal, run_schedule};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse()
        .into_config()
        .context("invalid configuration")?;
    init_tracing(config.log_format);
    let shutdown = install_shutdown_signal().context("failed to install shutdown signal handlers")?;

    let store = S3ObjectStore::connect(&config.storage)
        .await
        .context("failed to configure object storage client")?;
    let feed_client = HttpFeedClient::new(&config.upstream.base_url, config.upstream.request_timeout)
        .context("failed to build upstream HTTP client")?;

    let feeds: Vec<String> = config
        .sync
        .feeds
        .iter()
        .map(|target| format!("{}->{}", target.kind, target.bucket))
        .collect();
    info!(
        event = "service_started",
        upstream = %feed_client.base_url(),
        storage_endpoint = config.storage.endpoint.as_deref().unwrap_or("aws-default"),
        feeds = %feeds.join(","),
        interval_secs = config.schedule.interval.as_secs(),
        identifier_delay_secs = config.cycle.identifier_delay.as_secs(),
        failure_policy = ?config.cycle.failure_policy,
        run_once = config.schedule.run_once,
    );

    let cycles = run_schedule(&config, &feed_client, &store, shutdown).await;
    info!(event = "service_stopped", cycles);
    Ok(())
}
