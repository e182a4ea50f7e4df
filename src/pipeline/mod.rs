//! The monthly fetch -> transcode -> upload pipeline
//!
//! A `PipelineUnit` runs the three steps for one dataset descriptor. The
//! chain builder strings twelve units together and the runner walks them
//! strictly in order, stopping at the first exhausted failure.

mod chain;
mod fetch;
mod transcode;
mod unit;

pub use chain::{ChainReport, ChainRunner, UnitOutcome, build_chain};
pub use fetch::{Fetcher, HttpFetcher};
pub use transcode::transcode;
pub use unit::{PipelineUnit, UnitError, UnitStatus};
