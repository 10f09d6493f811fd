//! Startup configuration.
//!
//! Every setting is a flag with an `IB_SYNC_*` environment fallback. [`Cli`]
//! is parsed once in `main`, validated into a [`ServiceConfig`], and that value
//! is passed by reference to everything that needs it.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use ib_sync_core::feeds::{validate_feed_order, FeedKind, FeedListError};

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "http://pnwreport.bellevuelab.isus.emc.com";
pub const DEFAULT_MASTER_LIST_BUCKET: &str = "testSRS";
pub const DEFAULT_MASTER_LIST_KEY: &str = "PNWandNCAcustomers.json";
pub const DEFAULT_INSTALLS_BUCKET: &str = "testInstalls";
pub const DEFAULT_SRS_BUCKET: &str = "testSRS";
pub const DEFAULT_CYCLE_INTERVAL_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_IDENTIFIER_DELAY_SECS: u64 = 5;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// What the cycle driver does when one identifier fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FailurePolicy {
    /// Record the failure and move on to the next identifier.
    #[default]
    Continue,
    /// Stop the remaining batch at the first failed identifier.
    Halt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "ib_sync",
    about = "Mirrors per-customer install-base feeds from the reporting API into object storage",
    long_about = "Loads the master GDUN list from object storage, fetches every configured feed\n\
                  for each GDUN in order, stores each as <gdun>.json, then waits for the next cycle."
)]
pub struct Cli {
    /// S3-compatible endpoint (enables path-style addressing)
    #[arg(long, env = "IB_SYNC_STORAGE_ENDPOINT")]
    pub storage_endpoint: Option<String>,
    /// Storage region; falls back to the credentials file, then the AWS provider chain
    #[arg(long, env = "IB_SYNC_STORAGE_REGION")]
    pub storage_region: Option<String>,
    /// JSON file with accessKeyId / secretAccessKey / region
    #[arg(long, env = "IB_SYNC_CREDENTIALS_FILE")]
    pub credentials_file: Option<PathBuf>,
    #[arg(long, env = "IB_SYNC_MASTER_LIST_BUCKET", default_value = DEFAULT_MASTER_LIST_BUCKET)]
    pub master_list_bucket: String,
    #[arg(long, env = "IB_SYNC_MASTER_LIST_KEY", default_value = DEFAULT_MASTER_LIST_KEY)]
    pub master_list_key: String,
    #[arg(long, env = "IB_SYNC_INSTALLS_BUCKET", default_value = DEFAULT_INSTALLS_BUCKET)]
    pub installs_bucket: String,
    #[arg(long, env = "IB_SYNC_SRS_BUCKET", default_value = DEFAULT_SRS_BUCKET)]
    pub srs_bucket: String,
    /// Optional prefix placed before `<gdun>.json` in every feed bucket
    #[arg(long, env = "IB_SYNC_KEY_PREFIX", default_value = "")]
    pub key_prefix: String,
    /// Feeds to sync for each GDUN, in order
    #[arg(
        long,
        env = "IB_SYNC_FEEDS",
        value_delimiter = ',',
        default_values_t = [FeedKind::Installs, FeedKind::Srs]
    )]
    pub feeds: Vec<FeedKind>,
    #[arg(long, env = "IB_SYNC_UPSTREAM_BASE_URL", default_value = DEFAULT_UPSTREAM_BASE_URL)]
    pub upstream_base_url: String,
    #[arg(long, env = "IB_SYNC_REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,
    #[arg(long, env = "IB_SYNC_CYCLE_INTERVAL_SECS", default_value_t = DEFAULT_CYCLE_INTERVAL_SECS)]
    pub cycle_interval_secs: u64,
    /// Pause between consecutive GDUNs; 0 disables pacing
    #[arg(long, env = "IB_SYNC_IDENTIFIER_DELAY_SECS", default_value_t = DEFAULT_IDENTIFIER_DELAY_SECS)]
    pub identifier_delay_secs: u64,
    #[arg(long, value_enum, env = "IB_SYNC_FAILURE_POLICY", default_value_t = FailurePolicy::Continue)]
    pub failure_policy: FailurePolicy,
    /// Run a single cycle and exit instead of rescheduling
    #[arg(long, env = "IB_SYNC_RUN_ONCE")]
    pub run_once: bool,
    #[arg(long, value_enum, env = "IB_SYNC_LOG_FORMAT", default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid upstream base URL '{url}': {reason}")]
    UpstreamUrl { url: String, reason: String },
    #[error("{0}")]
    Feeds(#[from] FeedListError),
    #[error("{0} must not be empty")]
    EmptyValue(&'static str),
    #[error("request timeout must be at least one second")]
    ZeroTimeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub credentials_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamSettings {
    pub base_url: String,
    pub request_timeout: Duration,
}

/// A feed paired with the bucket its objects land in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedTarget {
    pub kind: FeedKind,
    pub bucket: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub feeds: Vec<FeedTarget>,
    pub key_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleSettings {
    pub master_list_bucket: String,
    pub master_list_key: String,
    pub identifier_delay: Duration,
    pub failure_policy: FailurePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSettings {
    pub interval: Duration,
    pub run_once: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub storage: StorageSettings,
    pub upstream: UpstreamSettings,
    pub sync: SyncSettings,
    pub cycle: CycleSettings,
    pub schedule: ScheduleSettings,
    pub log_format: LogFormat,
}

impl Cli {
    pub fn into_config(self) -> Result<ServiceConfig, ConfigError> {
        validate_upstream_url(&self.upstream_base_url)?;
        validate_feed_order(&self.feeds)?;
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let master_list_bucket = non_empty("master list bucket", self.master_list_bucket)?;
        let master_list_key = non_empty("master list key", self.master_list_key)?;
        let installs_bucket = non_empty("installs bucket", self.installs_bucket)?;
        let srs_bucket = non_empty("srs bucket", self.srs_bucket)?;

        let feeds = self
            .feeds
            .into_iter()
            .map(|kind| FeedTarget {
                kind,
                bucket: match kind {
                    FeedKind::Installs => installs_bucket.clone(),
                    FeedKind::Srs => srs_bucket.clone(),
                },
            })
            .collect();

        Ok(ServiceConfig {
            storage: StorageSettings {
                endpoint: self.storage_endpoint.filter(|value| !value.trim().is_empty()),
                region: self.storage_region.filter(|value| !value.trim().is_empty()),
                credentials_file: self.credentials_file,
            },
            upstream: UpstreamSettings {
                base_url: self.upstream_base_url.trim_end_matches('/').to_string(),
                request_timeout: Duration::from_secs(self.request_timeout_secs),
            },
            sync: SyncSettings {
                feeds,
                key_prefix: self.key_prefix,
            },
            cycle: CycleSettings {
                master_list_bucket,
                master_list_key,
                identifier_delay: Duration::from_secs(self.identifier_delay_secs),
                failure_policy: self.failure_policy,
            },
            schedule: ScheduleSettings {
                interval: Duration::from_secs(self.cycle_interval_secs),
                run_once: self.run_once,
            },
            log_format: self.log_format,
        })
    }
}

fn validate_upstream_url(raw: &str) -> Result<(), ConfigError> {
    let url = reqwest::Url::parse(raw).map_err(|error| ConfigError::UpstreamUrl {
        url: raw.to_string(),
        reason: error.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::UpstreamUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

fn non_empty(name: &'static str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyValue(name));
    }
    Ok(trimmed.to_string())
}
