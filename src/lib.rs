//! Tripdata Loader
//!
//! A scheduled batch loader that downloads monthly trip-data archives,
//! transcodes them to Parquet, and ships them to an object store

pub mod client;
pub mod config;
pub mod dataset;
pub mod pipeline;

// Re-exports for convenience
pub use client::{DEFAULT_PART_SIZE, ObjectStore, S3Store};
pub use config::Settings;
pub use dataset::DatasetDescriptor;
pub use pipeline::{
    ChainReport, ChainRunner, Fetcher, HttpFetcher, PipelineUnit, UnitError, UnitStatus,
    build_chain, transcode,
};
