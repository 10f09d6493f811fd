use chrono::{DateTime, Utc};
use ib_sync_core::contract::parse_master_list;
use ib_sync_core::identifier::CustomerIdentifier;
use tracing::{error, info, info_span, Instrument};

use crate::adapters::feed_client::FeedClient;
use crate::adapters::object_store::{ObjectStore, StoreError};
use crate::config::{CycleSettings, FailurePolicy, ServiceConfig};
use crate::handlers::identifier::{sync_identifier, SyncError};

#[derive(Debug, thiserror::Error)]
pub enum ListLoadError {
    #[error("failed to load master list: {0}")]
    Store(#[from] StoreError),
    #[error("master list s3://{bucket}/{key} is not a valid identifier list: {source}")]
    Parse {
        bucket: String,
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug)]
pub struct IdentifierFailure {
    pub gdun: CustomerIdentifier,
    pub error: SyncError,
}

#[derive(Debug)]
pub struct CycleReport {
    pub cycle: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub identifiers_listed: usize,
    pub identifiers_attempted: usize,
    pub identifiers_synced: usize,
    pub objects_written: usize,
    pub bodies_skipped: usize,
    pub failures: Vec<IdentifierFailure>,
}

impl CycleReport {
    fn start(cycle: u64, identifiers_listed: usize) -> Self {
        let now = Utc::now();
        Self {
            cycle,
            started_at: now,
            finished_at: now,
            identifiers_listed,
            identifiers_attempted: 0,
            identifiers_synced: 0,
            objects_written: 0,
            bodies_skipped: 0,
            failures: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub enum CycleOutcome {
    /// Every listed identifier was attempted.
    Completed(CycleReport),
    /// [`FailurePolicy::Halt`] stopped the batch; the failure that stopped it
    /// is the last entry of `failures`.
    Halted(CycleReport),
    /// No identifier was attempted.
    ListLoadFailed(ListLoadError),
}

impl CycleOutcome {
    pub fn report(&self) -> Option<&CycleReport> {
        match self {
            Self::Completed(report) | Self::Halted(report) => Some(report),
            Self::ListLoadFailed(_) => None,
        }
    }
}

pub async fn load_master_list(
    settings: &CycleSettings,
    store: &impl ObjectStore,
) -> Result<Vec<CustomerIdentifier>, ListLoadError> {
    let body = store
        .get_object(&settings.master_list_bucket, &settings.master_list_key)
        .await?;

    parse_master_list(&body).map_err(|source| ListLoadError::Parse {
        bucket: settings.master_list_bucket.clone(),
        key: settings.master_list_key.clone(),
        source,
    })
}

/// Runs one full pass over the master list.
///
/// Identifiers are processed one at a time in list order: every feed of one
/// identifier is fetched and stored before the next identifier starts.
/// Consecutive identifiers are separated by the configured pacing delay.
pub async fn run_cycle(
    cycle: u64,
    config: &ServiceConfig,
    feed_client: &impl FeedClient,
    store: &impl ObjectStore,
) -> CycleOutcome {
    info!(
        event = "cycle_started",
        cycle,
        bucket = %config.cycle.master_list_bucket,
        key = %config.cycle.master_list_key,
    );

    let identifiers = match load_master_list(&config.cycle, store).await {
        Ok(identifiers) => identifiers,
        Err(load_error) => {
            error!(
                event = "master_list_failed",
                cycle,
                error = %load_error,
                "cycle aborted before any identifier was attempted"
            );
            return CycleOutcome::ListLoadFailed(load_error);
        }
    };
    info!(event = "master_list_loaded", cycle, identifiers = identifiers.len());

    let mut report = CycleReport::start(cycle, identifiers.len());
    let mut halted = false;

    for (index, gdun) in identifiers.iter().enumerate() {
        if index > 0 && !config.cycle.identifier_delay.is_zero() {
            tokio::time::sleep(config.cycle.identifier_delay).await;
        }

        report.identifiers_attempted += 1;
        info!(
            event = "identifier_started",
            cycle,
            gdun = %gdun,
            position = index + 1,
            of = identifiers.len(),
        );

        let span = info_span!("identifier", cycle, gdun = %gdun);
        match sync_identifier(gdun, &config.sync, feed_client, store)
            .instrument(span)
            .await
        {
            Ok(identifier_report) => {
                report.identifiers_synced += 1;
                report.objects_written += identifier_report.objects_written();
                report.bodies_skipped += identifier_report.bodies_skipped();
            }
            Err(sync_error) => {
                error!(
                    event = "identifier_failed",
                    cycle,
                    gdun = %gdun,
                    error = %sync_error,
                    policy = ?config.cycle.failure_policy,
                );
                report.failures.push(IdentifierFailure {
                    gdun: gdun.clone(),
                    error: sync_error,
                });

                if config.cycle.failure_policy == FailurePolicy::Halt {
                    halted = true;
                    break;
                }
            }
        }
    }

    report.finished_at = Utc::now();
    info!(
        event = "cycle_finished",
        cycle,
        halted,
        listed = report.identifiers_listed,
        attempted = report.identifiers_attempted,
        synced = report.identifiers_synced,
        failed = report.failures.len(),
        objects_written = report.objects_written,
        bodies_skipped = report.bodies_skipped,
        duration_ms = (report.finished_at - report.started_at).num_milliseconds(),
    );

    if halted {
        CycleOutcome::Halted(report)
    } else {
        CycleOutcome::Completed(report)
    }
}
