//! One month's pipeline unit
//!
//! Runs fetch, transcode, and upload for a single dataset descriptor, each
//! step gated on the previous step's success. Nothing is cleaned up on
//! failure, partial local files stay where they landed.

use super::fetch::Fetcher;
use super::transcode::transcode;
use crate::client::ObjectStore;
use crate::dataset::DatasetDescriptor;
use std::path::Path;
use url::Url;

/// Failure of one pipeline step, tagged with enough context to name the
/// step and decide whether a retry could help.
#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    #[error("Fetching {url} failed: {reason}")]
    Fetch { url: Url, reason: eyre::Report },

    #[error("Transcoding {file} failed: {reason}")]
    Transcode { file: String, reason: eyre::Report },

    #[error("Uploading {key} failed: {reason}")]
    Upload { key: String, reason: eyre::Report },
}

impl UnitError {
    /// Whether the failure is worth retrying.
    ///
    /// Fetch and upload failures are network-shaped and may resolve on a
    /// retry. Transcode failures are deterministic local errors.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Transcode { .. })
    }
}

/// Terminal status of one started unit.
#[derive(Debug)]
pub enum UnitStatus {
    Succeeded,
    Failed(UnitError),
}

/// The fetch -> transcode -> upload sequence for one dataset descriptor.
pub struct PipelineUnit {
    pub descriptor: DatasetDescriptor,
}

impl PipelineUnit {
    pub fn new(descriptor: DatasetDescriptor) -> Self {
        Self { descriptor }
    }

    /// Unit name for logs and reports, e.g. `yellow_tripdata_2020-01`.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Run the three steps in order, stopping at the first failure.
    ///
    /// Intermediate files land in `work_dir` under the descriptor's
    /// filenames, overwriting leftovers from earlier attempts.
    ///
    /// # Errors
    /// Returns the failing step's [`UnitError`]; later steps never start.
    pub async fn run(
        &self,
        fetcher: &dyn Fetcher,
        store: &dyn ObjectStore,
        work_dir: &Path,
    ) -> Result<(), UnitError> {
        let descriptor = &self.descriptor;
        let source_path = work_dir.join(&descriptor.source_file);
        let parquet_path = work_dir.join(&descriptor.parquet_file);

        log::info!("Unit {}: fetching {}", self.name(), descriptor.url);
        fetcher
            .fetch(&descriptor.url, &source_path)
            .await
            .map_err(|reason| UnitError::Fetch {
                url: descriptor.url.clone(),
                reason,
            })?;

        log::info!("Unit {}: transcoding {}", self.name(), descriptor.source_file);
        transcode(&source_path).map_err(|reason| UnitError::Transcode {
            file: descriptor.source_file.clone(),
            reason,
        })?;

        log::info!("Unit {}: uploading {}", self.name(), descriptor.object_key);
        store
            .put(&descriptor.object_key, &parquet_path)
            .await
            .map_err(|reason| UnitError::Upload {
                key: descriptor.object_key.clone(),
                reason,
            })?;

        Ok(())
    }
}
