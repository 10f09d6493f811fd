use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use serde::Deserialize;

use crate::adapters::object_store::{ObjectStore, StoreError};
use crate::config::StorageSettings;

const CREDENTIALS_PROVIDER_NAME: &str = "ib-sync-credentials-file";

#[derive(Debug, thiserror::Error)]
pub enum StorageSetupError {
    #[error("failed to read credentials file {path}: {source}")]
    ReadCredentials {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("credentials file {path} is malformed: {source}")]
    ParseCredentials {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Static credentials in the JSON layout the storage team hands out
/// (`accessKeyId`, `secretAccessKey`, optional `region`).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsFile {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub region: Option<String>,
}

impl CredentialsFile {
    pub fn load(path: &Path) -> Result<Self, StorageSetupError> {
        let display = path.display().to_string();
        let raw = std::fs::read(path).map_err(|source| StorageSetupError::ReadCredentials {
            path: display.clone(),
            source,
        })?;
        serde_json::from_slice(&raw).map_err(|source| StorageSetupError::ParseCredentials {
            path: display,
            source,
        })
    }
}

/// [`ObjectStore`] over any S3-compatible endpoint, including ECS appliances
/// that need path-style addressing.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    s3_client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(s3_client: aws_sdk_s3::Client) -> Self {
        Self { s3_client }
    }

    pub async fn connect(settings: &StorageSettings) -> Result<Self, StorageSetupError> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        let mut region = settings.region.clone();

        if let Some(path) = &settings.credentials_file {
            let file = CredentialsFile::load(path)?;
            if region.is_none() {
                region = file.region.clone();
            }
            loader = loader.credentials_provider(Credentials::new(
                file.access_key_id,
                file.secret_access_key,
                None,
                None,
                CREDENTIALS_PROVIDER_NAME,
            ));
        }

        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }

        let shared = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &settings.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self::new(aws_sdk_s3::Client::from_conf(builder.build())))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let output = self
            .s3_client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|error| {
                let missing = error
                    .as_service_error()
                    .map(|service| service.is_no_such_key())
                    .unwrap_or(false);
                if missing {
                    StoreError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                } else {
                    StoreError::Read {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                        message: DisplayErrorContext(&error).to_string(),
                    }
                }
            })?;

        let body = output.body.collect().await.map_err(|error| StoreError::Read {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: format!("failed to read object body: {error}"),
        })?;

        Ok(body.into_bytes().to_vec())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> Result<Option<String>, StoreError> {
        let output = self
            .s3_client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type("application/json")
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|error| StoreError::Write {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: DisplayErrorContext(&error).to_string(),
            })?;

        Ok(output.e_tag().map(unquote_etag))
    }
}

/// S3 returns ETags wrapped in double quotes.
fn unquote_etag(raw: &str) -> String {
    raw.trim_matches('"').to_string()
}
