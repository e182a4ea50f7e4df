//! Object store client
//!
//! Provides the `ObjectStore` seam the uploader works against, plus the
//! `S3Store` implementation for any S3-compatible endpoint. Transfers are
//! split into fixed-size parts so a slow uplink never holds one request
//! open for the whole file.

use crate::config::Settings;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use bytes::Bytes;
use eyre::{Context, Result, eyre};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Default transfer part size: 5 MiB, the S3 minimum part size.
pub const DEFAULT_PART_SIZE: usize = 5 * 1024 * 1024;

/// Destination seam for uploaded files.
///
/// Implementors transmit one local file to the store under the given key,
/// overwriting any existing object at that key.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload the file at `path` to the store under `key`.
    ///
    /// # Errors
    /// Returns an error on authentication failure, network error, or a
    /// non-success response from the store.
    async fn put(&self, key: &str, path: &Path) -> Result<()>;
}

/// S3-compatible object store client.
///
/// The transfer part size is fixed at construction and scoped to this
/// instance; it is never a process-wide setting.
#[derive(Clone, Debug)]
pub struct S3Store {
    client: Client,
    bucket: String,
    part_size: usize,
}

impl S3Store {
    /// Create a store client for the configured bucket.
    ///
    /// Static credentials and a custom endpoint from `settings` take
    /// precedence; otherwise the SDK's default credential chain is used.
    ///
    /// # Arguments
    /// * `settings` - resolved runtime settings (bucket, endpoint, credentials)
    /// * `part_size` - transfer part size in bytes, e.g. [`DEFAULT_PART_SIZE`]
    ///
    /// # Errors
    /// Returns an error if `part_size` is zero.
    pub async fn try_new(settings: &Settings, part_size: usize) -> Result<Self> {
        if part_size == 0 {
            return Err(eyre!("Transfer part size must be non-zero"));
        }

        let client = match (&settings.access_key, &settings.secret_key) {
            (Some(access_key), Some(secret_key)) => {
                let credentials = Credentials::new(access_key, secret_key, None, None, "static");
                let mut builder = aws_sdk_s3::config::Builder::new()
                    .behavior_version(BehaviorVersion::latest())
                    .region(Region::new("us-east-1"))
                    .credentials_provider(credentials);
                if let Some(endpoint) = &settings.endpoint_url {
                    // Path-style addressing is required for MinIO and
                    // most interop endpoints
                    builder = builder.endpoint_url(endpoint).force_path_style(true);
                }
                Client::from_conf(builder.build())
            }
            _ => {
                let shared = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
                let mut builder = aws_sdk_s3::config::Builder::from(&shared);
                if let Some(endpoint) = &settings.endpoint_url {
                    builder = builder.endpoint_url(endpoint).force_path_style(true);
                }
                Client::from_conf(builder.build())
            }
        };

        log::debug!(
            "Object store client ready for bucket {} ({} byte parts)",
            settings.bucket,
            part_size
        );

        Ok(Self {
            client,
            bucket: settings.bucket.clone(),
            part_size,
        })
    }

    /// Verify the configured credentials can reach the bucket.
    ///
    /// # Errors
    /// Returns an error if the bucket is missing or access is denied.
    pub async fn verify_access(&self) -> Result<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .wrap_err_with(|| format!("No access to bucket {}", self.bucket))?;
        Ok(())
    }

    /// Read the next part from `file`, up to `part_size` bytes.
    async fn read_part(&self, file: &mut tokio::fs::File) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; self.part_size];
        let mut filled = 0;
        while filled < buffer.len() {
            let n = file.read(&mut buffer[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        buffer.truncate(filled);
        Ok(buffer)
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, key: &str, path: &Path) -> Result<()> {
        let mut file = tokio::fs::File::open(path)
            .await
            .wrap_err_with(|| format!("Failed to open {} for upload", path.display()))?;

        let upload_id = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .wrap_err_with(|| format!("Failed to start upload for {key}"))?
            .upload_id
            .ok_or_else(|| eyre!("Store returned no upload id for {key}"))?;

        let mut parts = Vec::new();
        let mut part_number = 1i32;
        loop {
            let buffer = self.read_part(&mut file).await?;
            let is_last = buffer.len() < self.part_size;
            // An empty file still needs its single empty part
            if buffer.is_empty() && part_number > 1 {
                break;
            }

            log::debug!("Uploading part {part_number} of {key} ({} bytes)", buffer.len());
            let uploaded = self
                .client
                .upload_part()
                .bucket(&self.bucket)
                .key(key)
                .upload_id(&upload_id)
                .part_number(part_number)
                .body(ByteStream::from(Bytes::from(buffer)))
                .send()
                .await
                .wrap_err_with(|| format!("Failed to upload part {part_number} of {key}"))?;

            let e_tag = uploaded
                .e_tag
                .ok_or_else(|| eyre!("Store returned no etag for part {part_number} of {key}"))?;
            parts.push(
                CompletedPart::builder()
                    .e_tag(e_tag)
                    .part_number(part_number)
                    .build(),
            );

            if is_last {
                break;
            }
            part_number += 1;
        }

        let completed = CompletedMultipartUpload::builder()
            .set_parts(Some(parts))
            .build();
        self.client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(&upload_id)
            .multipart_upload(completed)
            .send()
            .await
            .wrap_err_with(|| format!("Failed to complete upload for {key}"))?;

        log::info!("Uploaded {} to {}/{}", path.display(), self.bucket, key);
        Ok(())
    }
}
