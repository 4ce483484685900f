//! Batch Rating Aggregation
//!
//! Computes the lifetime average rating and rating count of every item in a
//! record source and writes one row per item to an [`AggregateSink`], while
//! reporting counters to the [`ProgressTracker`].
//!
//! ## Phases
//! 1. **Count**: a first pass sets the job's total (data lines only). A failed
//!    count is logged and the job continues without a known total.
//! 2. **Aggregate**: every data line is parsed and accumulated. The processed
//!    counter is published every `progress_interval` records. The first
//!    rejected record fails the job.
//! 3. **Save**: aggregates are written in item id order; the saved counter
//!    follows along.

use super::aggregate::{AggregateSink, RatingAccumulator};
use super::record::{is_data_record, rating_reader, RatingRecord, RecordError};
use super::source::RecordSource;
use crate::progress::tracker::ProgressTracker;
use crate::progress::types::JobStatus;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_PROGRESS_INTERVAL: u64 = 10_000;
const SAVE_REPORT_EVERY: u64 = 1_000;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to read records: {0:#}")]
    Source(anyhow::Error),

    #[error("rejected record: {0}")]
    Rejected(#[from] RecordError),

    #[error("failed to save item {item_id}: {reason:#}")]
    Sink {
        item_id: u64,
        reason: anyhow::Error,
    },

    #[error("job was cancelled")]
    Cancelled,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_records: u64,
    pub processed_records: u64,
    pub items_saved: u64,
}

pub struct BatchAggregationJob {
    tracker: Arc<ProgressTracker>,
    sink: Arc<dyn AggregateSink>,
    progress_interval: u64,
}

impl BatchAggregationJob {
    pub fn new(
        tracker: Arc<ProgressTracker>,
        sink: Arc<dyn AggregateSink>,
        progress_interval: u64,
    ) -> Arc<Self> {
        Arc::new(Self {
            tracker,
            sink,
            progress_interval: progress_interval.max(1),
        })
    }

    pub fn tracker(&self) -> &Arc<ProgressTracker> {
        &self.tracker
    }

    /// Runs the job registered under `job_id` to completion and records the
    /// outcome on the tracker.
    ///
    /// Blocking: call it from a blocking-capable thread. A job cancelled
    /// through the tracker stops at its next progress report, before the save
    /// phase or before its next saved item, and keeps its CANCELLED status.
    pub fn run(&self, job_id: &str, source: &dyn RecordSource) -> Result<BatchSummary, BatchError> {
        tracing::info!("Batch job {} reading {}", job_id, source.name());

        match self.execute(job_id, source) {
            Ok(summary) => {
                let completed = self.tracker.complete_job(
                    job_id,
                    true,
                    &format!(
                        "Aggregated {} ratings into {} items",
                        summary.processed_records, summary.items_saved
                    ),
                );
                if !completed && self.is_cancelled(job_id) {
                    tracing::info!("Batch job {} was cancelled before completing", job_id);
                    return Err(BatchError::Cancelled);
                }
                Ok(summary)
            }
            Err(BatchError::Cancelled) => {
                tracing::info!("Batch job {} stopped after cancellation", job_id);
                Err(BatchError::Cancelled)
            }
            Err(e) => {
                self.tracker
                    .complete_job(job_id, false, &format!("Job failed: {}", e));
                Err(e)
            }
        }
    }

    fn execute(&self, job_id: &str, source: &dyn RecordSource) -> Result<BatchSummary, BatchError> {
        let total_records = match count_records(source) {
            Ok(total) => {
                self.tracker.update_total_records(job_id, total);
                total
            }
            Err(e) => {
                tracing::warn!("Batch job {}: counting records failed: {:#}", job_id, e);
                0
            }
        };

        let mut accumulator = RatingAccumulator::default();
        let mut processed: u64 = 0;

        let input = source.open().map_err(BatchError::Source)?;
        for result in rating_reader(input).records() {
            let record = result.map_err(read_error)?;
            if !is_data_record(&record) {
                continue;
            }

            accumulator.add(&RatingRecord::from_record(&record)?);
            processed += 1;

            if processed % self.progress_interval == 0 {
                self.report_processed(job_id, processed)?;
            }
        }

        self.ensure_active(job_id)?;
        self.tracker.update_progress(
            job_id,
            processed,
            &format!("Parsed {} records, saving {} items", processed, accumulator.item_count()),
        );

        let mut saved: u64 = 0;
        for (item_id, aggregate) in accumulator.into_aggregates() {
            self.ensure_active(job_id)?;
            self.sink
                .put(item_id, aggregate)
                .map_err(|reason| BatchError::Sink { item_id, reason })?;
            saved += 1;

            if saved % SAVE_REPORT_EVERY == 0 {
                self.tracker.update_saved_progress(job_id, saved);
                tracing::debug!("Batch job {}: saved {} items", job_id, saved);
            }
        }
        self.tracker.update_saved_progress(job_id, saved);

        Ok(BatchSummary {
            total_records,
            processed_records: processed,
            items_saved: saved,
        })
    }

    fn report_processed(&self, job_id: &str, processed: u64) -> Result<(), BatchError> {
        self.ensure_active(job_id)?;

        self.tracker
            .update_progress(job_id, processed, &format!("Processed {} records", processed));
        tracing::debug!("Batch job {}: processed {} records", job_id, processed);
        Ok(())
    }

    fn ensure_active(&self, job_id: &str) -> Result<(), BatchError> {
        if self.is_cancelled(job_id) {
            return Err(BatchError::Cancelled);
        }
        Ok(())
    }

    fn is_cancelled(&self, job_id: &str) -> bool {
        self.tracker.job_status(job_id) == Some(JobStatus::Cancelled)
    }
}

/// Unreadable input is a source failure; anything else is a rejected record.
fn read_error(e: csv::Error) -> BatchError {
    if e.is_io_error() {
        BatchError::Source(e.into())
    } else {
        BatchError::Rejected(e.into())
    }
}

/// Counts data records, skipping headers and blank lines.
pub fn count_records(source: &dyn RecordSource) -> anyhow::Result<u64> {
    let mut count = 0;
    for record in rating_reader(source.open()?).records() {
        if is_data_record(&record?) {
            count += 1;
        }
    }
    Ok(count)
}
