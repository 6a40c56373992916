//! S3-backed destination store

use std::collections::HashMap;

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use tracing::info;

use crate::config::DestinationConfig;
use crate::models::error::TransferError;
use crate::stores::destination_trait::DestinationStore;

pub struct S3BucketStore {
    s3_client: S3Client,
    bucket: String,
}

impl S3BucketStore {
    pub fn new(config: &DestinationConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "static",
        );

        let mut s3_config_builder = aws_sdk_s3::config::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);

        if let Some(endpoint) = &config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        if config.path_style {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        let s3_client = S3Client::from_conf(s3_config_builder.build());

        info!(bucket = %config.bucket, region = %config.region, "S3 destination store initialized");

        Self {
            s3_client,
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait::async_trait]
impl DestinationStore for S3BucketStore {
    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        metadata: HashMap<String, String>,
    ) -> Result<(), TransferError> {
        let mut request = self
            .s3_client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data));

        for (name, value) in metadata {
            request = request.metadata(name, value);
        }

        request
            .send()
            .await
            .map_err(|e| TransferError::DestinationWrite {
                name: key.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}
