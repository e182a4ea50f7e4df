//! Chain builder and sequential runner
//!
//! The chain is an ordered list of twelve monthly units with a strict
//! linear precedence: a unit's fetch never starts before its predecessor's
//! upload has completed. The runner walks the list, retries transient unit
//! failures from the top of the unit, and stops at the first exhausted
//! failure. Units after the failure are never started.

use super::fetch::Fetcher;
use super::unit::{PipelineUnit, UnitStatus};
use crate::client::ObjectStore;
use crate::dataset::DatasetDescriptor;
use eyre::Result;
use std::path::Path;

/// Months in one chain, January through December.
pub const MONTHS_PER_YEAR: u8 = 12;

/// Build the ordered chain of twelve monthly units for one year.
///
/// # Errors
/// Only fails if a descriptor cannot be derived, which for 1..=12 means a
/// malformed base URL.
pub fn build_chain(prefix: &str, year: u16) -> Result<Vec<PipelineUnit>> {
    (1..=MONTHS_PER_YEAR)
        .map(|month| DatasetDescriptor::for_month(prefix, year, month).map(PipelineUnit::new))
        .collect()
}

/// Outcome of one started unit.
#[derive(Debug)]
pub struct UnitOutcome {
    pub name: String,
    pub status: UnitStatus,
}

/// Per-unit outcomes of one chain run, in execution order.
///
/// Only started units appear here. Units behind a failed predecessor were
/// never started and are absent, not marked failed.
#[derive(Debug, Default)]
pub struct ChainReport {
    pub outcomes: Vec<UnitOutcome>,
}

impl ChainReport {
    /// True if every unit in the chain completed its upload.
    pub fn succeeded(&self) -> bool {
        self.failed_unit().is_none()
    }

    /// The failing unit, if any. At most one unit can fail per run.
    pub fn failed_unit(&self) -> Option<&UnitOutcome> {
        self.outcomes
            .iter()
            .find(|outcome| matches!(outcome.status, UnitStatus::Failed(_)))
    }

    /// Number of units that completed successfully.
    pub fn succeeded_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.status, UnitStatus::Succeeded))
            .count()
    }
}

/// Walks a chain of units strictly in order.
pub struct ChainRunner<'a> {
    fetcher: &'a dyn Fetcher,
    store: &'a dyn ObjectStore,
    work_dir: &'a Path,
    retries: u32,
}

impl<'a> ChainRunner<'a> {
    /// Create a runner with the default flat retry count of one.
    pub fn new(fetcher: &'a dyn Fetcher, store: &'a dyn ObjectStore, work_dir: &'a Path) -> Self {
        Self {
            fetcher,
            store,
            work_dir,
            retries: 1,
        }
    }

    /// Override the flat per-unit retry count.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Run the chain, one unit at a time.
    ///
    /// A transiently failed unit is re-run from its fetch step up to the
    /// retry count; work already done by the failed attempt is redone.
    /// Deterministic failures are not retried. The first unit to exhaust
    /// its attempts ends the run.
    pub async fn run(&self, units: &[PipelineUnit]) -> ChainReport {
        log::info!("Starting chain of {} units", units.len());
        let mut report = ChainReport::default();

        for unit in units {
            let status = self.run_unit(unit).await;
            let failed = matches!(status, UnitStatus::Failed(_));
            report.outcomes.push(UnitOutcome {
                name: unit.name().to_string(),
                status,
            });
            if failed {
                log::error!(
                    "Chain halted at unit {}, later units will not start",
                    unit.name()
                );
                break;
            }
        }

        log::info!(
            "Chain finished: {} of {} units succeeded",
            report.succeeded_count(),
            units.len()
        );
        report
    }

    /// Run one unit to a terminal status, retrying transient failures.
    async fn run_unit(&self, unit: &PipelineUnit) -> UnitStatus {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match unit.run(self.fetcher, self.store, self.work_dir).await {
                Ok(()) => {
                    log::info!("Unit {} succeeded", unit.name());
                    return UnitStatus::Succeeded;
                }
                Err(error) if error.is_transient() && attempt <= self.retries => {
                    log::warn!(
                        "Unit {} attempt {attempt} failed, retrying from fetch: {error}",
                        unit.name()
                    );
                }
                Err(error) => {
                    log::error!("Unit {} failed: {error}", unit.name());
                    return UnitStatus::Failed(error);
                }
            }
        }
    }
}
