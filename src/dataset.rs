//! Dataset descriptors
//!
//! A `DatasetDescriptor` names one month's unit of work: the source URL and
//! the local/remote filenames derived from it. Everything is a deterministic
//! function of the prefix, year, and month.

use eyre::{Result, bail};
use url::Url;

/// Release page serving the monthly compressed CSV archives.
pub const BASE_URL: &str =
    "https://github.com/DataTalksClub/nyc-tlc-data/releases/download/yellow/";

/// Default dataset file prefix. Switch via `--prefix` for other datasets.
pub const DEFAULT_PREFIX: &str = "yellow_tripdata";

/// Default dataset year.
pub const DEFAULT_YEAR: u16 = 2020;

/// Key prefix for uploaded objects inside the destination container.
pub const REMOTE_KEY_PREFIX: &str = "trip_data/";

const SOURCE_SUFFIX: &str = ".csv.gz";

/// Immutable identification of one month's unit of work.
///
/// # Example
/// ```
/// use tripdata_loader::dataset::DatasetDescriptor;
///
/// let descriptor = DatasetDescriptor::for_month("yellow_tripdata", 2020, 1).unwrap();
/// assert_eq!(descriptor.source_file, "yellow_tripdata_2020-01.csv.gz");
/// assert_eq!(descriptor.parquet_file, "yellow_tripdata_2020-01.parquet");
/// assert_eq!(descriptor.object_key, "trip_data/yellow_tripdata_2020-01.parquet");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetDescriptor {
    /// Month number, 1-12
    pub month: u8,
    /// Unit name, e.g. `yellow_tripdata_2020-01`
    pub name: String,
    /// Source URL for the compressed CSV archive
    pub url: Url,
    /// Local filename of the downloaded archive
    pub source_file: String,
    /// Local filename of the transcoded Parquet file
    pub parquet_file: String,
    /// Remote object key for the uploaded Parquet file
    pub object_key: String,
}

impl DatasetDescriptor {
    /// Derive the descriptor for one calendar month.
    ///
    /// # Errors
    /// Returns an error if `month` is outside 1-12 or the source URL cannot
    /// be formed.
    pub fn for_month(prefix: &str, year: u16, month: u8) -> Result<Self> {
        if !(1..=12).contains(&month) {
            bail!("Month must be between 1 and 12, got {month}");
        }

        let name = format!("{prefix}_{year}-{month:02}");
        let source_file = format!("{name}{SOURCE_SUFFIX}");
        let parquet_file = format!("{name}.parquet");
        let object_key = format!("{REMOTE_KEY_PREFIX}{parquet_file}");
        let url = Url::parse(BASE_URL)?.join(&source_file)?;

        Ok(Self {
            month,
            name,
            url,
            source_file,
            parquet_file,
            object_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_for_january() {
        let descriptor = DatasetDescriptor::for_month(DEFAULT_PREFIX, 2020, 1).unwrap();
        assert_eq!(descriptor.source_file, "yellow_tripdata_2020-01.csv.gz");
        assert_eq!(descriptor.parquet_file, "yellow_tripdata_2020-01.parquet");
        assert_eq!(descriptor.object_key, "trip_data/yellow_tripdata_2020-01.parquet");
        assert_eq!(
            descriptor.url.as_str(),
            "https://github.com/DataTalksClub/nyc-tlc-data/releases/download/yellow/yellow_tripdata_2020-01.csv.gz"
        );
    }

    #[test]
    fn test_descriptor_is_deterministic_for_all_months() {
        for month in 1..=12u8 {
            let first = DatasetDescriptor::for_month(DEFAULT_PREFIX, DEFAULT_YEAR, month).unwrap();
            let second = DatasetDescriptor::for_month(DEFAULT_PREFIX, DEFAULT_YEAR, month).unwrap();
            assert_eq!(first, second);
            assert_eq!(first.name, format!("yellow_tripdata_2020-{month:02}"));
            assert!(first.source_file.ends_with(".csv.gz"));
            assert!(first.object_key.starts_with("trip_data/"));
        }
    }

    #[test]
    fn test_descriptor_zero_pads_months() {
        let september = DatasetDescriptor::for_month(DEFAULT_PREFIX, 2020, 9).unwrap();
        assert_eq!(september.source_file, "yellow_tripdata_2020-09.csv.gz");
        let december = DatasetDescriptor::for_month(DEFAULT_PREFIX, 2020, 12).unwrap();
        assert_eq!(december.source_file, "yellow_tripdata_2020-12.csv.gz");
    }

    #[test]
    fn test_descriptor_rejects_invalid_months() {
        assert!(DatasetDescriptor::for_month(DEFAULT_PREFIX, 2020, 0).is_err());
        assert!(DatasetDescriptor::for_month(DEFAULT_PREFIX, 2020, 13).is_err());
    }

    #[test]
    fn test_descriptor_honors_custom_prefix_and_year() {
        let descriptor = DatasetDescriptor::for_month("green_tripdata", 2021, 7).unwrap();
        assert_eq!(descriptor.source_file, "green_tripdata_2021-07.csv.gz");
        assert_eq!(descriptor.object_key, "trip_data/green_tripdata_2021-07.parquet");
    }
}
