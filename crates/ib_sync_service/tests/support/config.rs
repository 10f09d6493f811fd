use std::time::Duration;

use ib_sync_core::feeds::FeedKind;
use ib_sync_service::config::{
    CycleSettings, FailurePolicy, FeedTarget, LogFormat, ScheduleSettings, ServiceConfig,
    StorageSettings, SyncSettings, UpstreamSettings,
};

pub const MASTER_LIST_BUCKET: &str = "testSRS";
pub const MASTER_LIST_KEY: &str = "PNWandNCAcustomers.json";
pub const INSTALLS_BUCKET: &str = "testInstalls";
pub const SRS_BUCKET: &str = "srs-out";

/// Service configuration for tests: no pacing, one-day interval, both feeds.
pub fn test_config(failure_policy: FailurePolicy) -> ServiceConfig {
    ServiceConfig {
        storage: StorageSettings {
            endpoint: None,
            region: None,
            credentials_file: None,
        },
        upstream: UpstreamSettings {
            base_url: "http://reports.test".to_string(),
            request_timeout: Duration::from_secs(30),
        },
        sync: SyncSettings {
            feeds: vec![
                FeedTarget {
                    kind: FeedKind::Installs,
                    bucket: INSTALLS_BUCKET.to_string(),
                },
                FeedTarget {
                    kind: FeedKind::Srs,
                    bucket: SRS_BUCKET.to_string(),
                },
            ],
            key_prefix: String::new(),
        },
        cycle: CycleSettings {
            master_list_bucket: MASTER_LIST_BUCKET.to_string(),
            master_list_key: MASTER_LIST_KEY.to_string(),
            identifier_delay: Duration::ZERO,
            failure_policy,
        },
        schedule: ScheduleSettings {
            interval: Duration::from_secs(24 * 60 * 60),
            run_once: false,
        },
        log_format: LogFormat::Text,
    }
}

pub fn master_list(gduns: &[&str]) -> Vec<u8> {
    let entries: Vec<serde_json::Value> = gduns
        .iter()
        .map(|gdun| serde_json::json!({ "gduns": gdun }))
        .collect();
    serde_json::to_vec(&entries).expect("master list should serialize")
}
