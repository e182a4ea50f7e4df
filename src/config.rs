//! Environment-provided runtime settings
//!
//! All configuration comes from the environment (usually via a dotenv file
//! sourced by the CLI). Missing required values fail at startup, before any
//! pipeline unit runs.

use eyre::{Context, Result};
use std::path::PathBuf;

/// Runtime settings resolved from the environment.
///
/// Required:
/// - `TRIPDATA_PROJECT_ID` - billing/owning account for the object store
/// - `TRIPDATA_BUCKET` - destination container for uploaded objects
/// - `TRIPDATA_WORK_DIR` - root directory for local intermediate files
///
/// Optional:
/// - `TRIPDATA_ENDPOINT_URL` - custom S3-compatible endpoint (MinIO, GCS interop)
/// - `TRIPDATA_ACCESS_KEY` / `TRIPDATA_SECRET_KEY` - static credentials;
///   when absent the SDK's default credential chain is used
#[derive(Clone, Debug)]
pub struct Settings {
    pub project_id: String,
    pub bucket: String,
    pub work_dir: PathBuf,
    pub endpoint_url: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl Settings {
    /// Resolve settings from the process environment.
    ///
    /// # Errors
    /// Returns an error naming the first missing required variable.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            project_id: require("TRIPDATA_PROJECT_ID")?,
            bucket: require("TRIPDATA_BUCKET")?,
            work_dir: PathBuf::from(require("TRIPDATA_WORK_DIR")?),
            endpoint_url: optional("TRIPDATA_ENDPOINT_URL"),
            access_key: optional("TRIPDATA_ACCESS_KEY"),
            secret_key: optional("TRIPDATA_SECRET_KEY"),
        })
    }
}

fn require(key: &str) -> Result<String> {
    std::env::var(key).wrap_err_with(|| format!("Missing required environment variable {key}"))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn set_required() {
        unsafe {
            std::env::set_var("TRIPDATA_PROJECT_ID", "dtc-de-course");
            std::env::set_var("TRIPDATA_BUCKET", "dtc-data-lake");
            std::env::set_var("TRIPDATA_WORK_DIR", "/tmp/tripdata");
        }
    }

    fn clear_all() {
        for key in [
            "TRIPDATA_PROJECT_ID",
            "TRIPDATA_BUCKET",
            "TRIPDATA_WORK_DIR",
            "TRIPDATA_ENDPOINT_URL",
            "TRIPDATA_ACCESS_KEY",
            "TRIPDATA_SECRET_KEY",
        ] {
            unsafe { std::env::remove_var(key) };
        }
    }

    #[test]
    #[serial]
    fn test_from_env_reads_required_values() {
        clear_all();
        set_required();

        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.project_id, "dtc-de-course");
        assert_eq!(settings.bucket, "dtc-data-lake");
        assert_eq!(settings.work_dir, PathBuf::from("/tmp/tripdata"));
        assert!(settings.endpoint_url.is_none());
        assert!(settings.access_key.is_none());
    }

    #[test]
    #[serial]
    fn test_from_env_fails_fast_on_missing_bucket() {
        clear_all();
        unsafe {
            std::env::set_var("TRIPDATA_PROJECT_ID", "dtc-de-course");
            std::env::set_var("TRIPDATA_WORK_DIR", "/tmp/tripdata");
        }

        let err = Settings::from_env().unwrap_err();
        assert!(err.to_string().contains("TRIPDATA_BUCKET"));
    }

    #[test]
    #[serial]
    fn test_empty_optional_is_none() {
        clear_all();
        set_required();
        unsafe { std::env::set_var("TRIPDATA_ENDPOINT_URL", "") };

        let settings = Settings::from_env().unwrap();
        assert!(settings.endpoint_url.is_none());
    }
}
