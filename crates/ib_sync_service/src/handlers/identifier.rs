use ib_sync_core::feeds::FeedKind;
use ib_sync_core::identifier::{CustomerIdentifier, InvalidIdentifier};
use ib_sync_core::payload::{encode_feed_payload, is_gateway_error_body, payload_fingerprint};
use ib_sync_core::storage_keys::feed_object_key;
use tracing::{info, warn};

use crate::adapters::feed_client::{FeedClient, FetchError};
use crate::adapters::object_store::{ObjectStore, StoreError};
use crate::config::SyncSettings;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentifier),
    #[error("fetching {feed} feed failed: {source}")]
    Fetch {
        feed: FeedKind,
        #[source]
        source: FetchError,
    },
    #[error("storing {feed} feed failed: {source}")]
    Store {
        feed: FeedKind,
        #[source]
        source: StoreError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFeed {
    pub feed: FeedKind,
    pub bucket: String,
    pub key: String,
    pub etag: Option<String>,
    pub bytes: usize,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    Stored(StoredFeed),
    /// The body looked like a gateway error page and was not written.
    SkippedGatewayError { feed: FeedKind },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierReport {
    pub gdun: CustomerIdentifier,
    pub feeds: Vec<FeedOutcome>,
}

impl IdentifierReport {
    pub fn objects_written(&self) -> usize {
        self.feeds
            .iter()
            .filter(|outcome| matches!(outcome, FeedOutcome::Stored(_)))
            .count()
    }

    pub fn bodies_skipped(&self) -> usize {
        self.feeds.len() - self.objects_written()
    }
}

/// Fetches and stores every configured feed for one GDUN, strictly in order.
///
/// The first fetch or store failure ends the task; feeds after it are not
/// attempted and objects already written for earlier feeds stay in place.
pub async fn sync_identifier(
    gdun: &CustomerIdentifier,
    settings: &SyncSettings,
    feed_client: &impl FeedClient,
    store: &impl ObjectStore,
) -> Result<IdentifierReport, SyncError> {
    let normalized = gdun.normalized()?;
    let key = feed_object_key(&settings.key_prefix, gdun);

    let mut feeds = Vec::with_capacity(settings.feeds.len());
    for target in &settings.feeds {
        let feed = target.kind;
        let body = feed_client
            .fetch_feed(&normalized, feed.api_path())
            .await
            .map_err(|source| SyncError::Fetch { feed, source })?;

        if is_gateway_error_body(&body) {
            warn!(
                event = "feed_skipped_gateway_error",
                gdun = %gdun,
                feed = %feed,
                bucket = %target.bucket,
                key = %key,
                "upstream body starts with a gateway error marker; keeping previous object"
            );
            feeds.push(FeedOutcome::SkippedGatewayError { feed });
            continue;
        }

        let encoded = encode_feed_payload(&body);
        let bytes = encoded.len();
        let sha256 = payload_fingerprint(&encoded);
        let etag = store
            .put_object(&target.bucket, &key, encoded)
            .await
            .map_err(|source| SyncError::Store { feed, source })?;

        info!(
            event = "feed_stored",
            gdun = %gdun,
            feed = %feed,
            bucket = %target.bucket,
            key = %key,
            etag = etag.as_deref().unwrap_or(""),
            bytes,
            sha256 = %sha256,
        );
        feeds.push(FeedOutcome::Stored(StoredFeed {
            feed,
            bucket: target.bucket.clone(),
            key: key.clone(),
            etag,
            bytes,
            sha256,
        }));
    }

    Ok(IdentifierReport {
        gdun: gdun.clone(),
        feeds,
    })
}
