use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ib_sync_service::adapters::feed_client::{FeedClient, FetchError};
use ib_sync_service::adapters::object_store::{ObjectStore, StoreError};

/// Ordered record of every collaborator call, shared by the fakes so tests can
/// assert on interleaving across the feed client and the store.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn push(&self, call: String) {
        self.calls.lock().expect("poisoned mutex").push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("poisoned mutex").clone()
    }

    /// Index of the first call containing `needle`.
    pub fn position(&self, needle: &str) -> Option<usize> {
        self.calls().iter().position(|call| call.contains(needle))
    }

    /// Index of the last call containing `needle`.
    pub fn last_position(&self, needle: &str) -> Option<usize> {
        self.calls().iter().rposition(|call| call.contains(needle))
    }
}

/// In-memory object store keyed by (bucket, key).
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    failing_reads: HashSet<(String, String)>,
    failing_writes: HashSet<(String, String)>,
    log: CallLog,
}

impl MemoryStore {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn fail_reads_of(mut self, bucket: &str, key: &str) -> Self {
        self.failing_reads
            .insert((bucket.to_string(), key.to_string()));
        self
    }

    pub fn fail_writes_to(mut self, bucket: &str, key: &str) -> Self {
        self.failing_writes
            .insert((bucket.to_string(), key.to_string()));
        self
    }

    pub fn seed(&self, bucket: &str, key: &str, body: &[u8]) {
        self.objects
            .lock()
            .expect("poisoned mutex")
            .insert((bucket.to_string(), key.to_string()), body.to_vec());
    }

    pub fn body(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .expect("poisoned mutex")
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn text(&self, bucket: &str, key: &str) -> Option<String> {
        self.body(bucket, key)
            .map(|body| String::from_utf8(body).expect("stored body should be UTF-8"))
    }

    pub fn snapshot(&self) -> HashMap<(String, String), Vec<u8>> {
        self.objects.lock().expect("poisoned mutex").clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        self.log.push(format!("get {bucket}/{key}"));
        if self
            .failing_reads
            .contains(&(bucket.to_string(), key.to_string()))
        {
            return Err(StoreError::Read {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: "simulated read failure".to_string(),
            });
        }

        self.body(bucket, key).ok_or_else(|| StoreError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> Result<Option<String>, StoreError> {
        self.log.push(format!("put {bucket}/{key}"));
        if self
            .failing_writes
            .contains(&(bucket.to_string(), key.to_string()))
        {
            return Err(StoreError::Write {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: "simulated write failure".to_string(),
            });
        }

        let etag = format!("etag-{}", body.len());
        self.seed(bucket, key, &body);
        Ok(Some(etag))
    }
}

#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    Body(String),
    Status(u16),
}

/// Feed client answering `OK-<feed>` by default, with per (id, feed)
/// overrides addressed by the normalized identifier.
#[derive(Debug, Default)]
pub struct ScriptedFeedClient {
    responses: Mutex<HashMap<(String, String), ScriptedResponse>>,
    log: CallLog,
}

impl ScriptedFeedClient {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn respond(&self, normalized_id: &str, feed_path: &str, response: ScriptedResponse) {
        self.responses
            .lock()
            .expect("poisoned mutex")
            .insert((normalized_id.to_string(), feed_path.to_string()), response);
    }

    pub fn fetch_count(&self) -> usize {
        self.log
            .calls()
            .iter()
            .filter(|call| call.starts_with("fetch "))
            .count()
    }
}

#[async_trait]
impl FeedClient for ScriptedFeedClient {
    async fn fetch_feed(&self, normalized_id: &str, feed_path: &str) -> Result<String, FetchError> {
        self.log.push(format!("fetch {feed_path}/{normalized_id}"));

        let scripted = self
            .responses
            .lock()
            .expect("poisoned mutex")
            .get(&(normalized_id.to_string(), feed_path.to_string()))
            .cloned();

        match scripted {
            Some(ScriptedResponse::Body(body)) => Ok(body),
            Some(ScriptedResponse::Status(status)) => Err(FetchError::Status {
                url: format!("http://reports.test/api/{feed_path}/{normalized_id}"),
                status,
                body_excerpt: "scripted failure".to_string(),
            }),
            None => Ok(format!("OK-{feed_path}")),
        }
    }
}
