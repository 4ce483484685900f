//! Job Progress Tracker
//!
//! A concurrent registry of long-running jobs keyed by job id. Workers report
//! counters while readers poll snapshots with derived throughput and ETA.
//!
//! ## Mutation Rules
//! - Every mutation on an unknown job id is a silent no-op returning `false`.
//! - Counter mutations on a terminal job are ignored.
//! - `complete_job` may rewrite a COMPLETED or FAILED outcome but never a
//!   CANCELLED one; `cancel_job` only applies to a running job.
//!
//! Each mutation runs under the `DashMap` entry lock, so read-modify-write
//! updates (like `increment_progress`) are linearizable per job.

use super::types::*;
use crate::clock::Clock;

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;

pub struct ProgressTracker {
    jobs: DashMap<String, JobProgress>,
    clock: Arc<dyn Clock>,
}

impl ProgressTracker {
    pub fn new(clock: Arc<dyn Clock>) -> Arc<Self> {
        Arc::new(Self {
            jobs: DashMap::new(),
            clock,
        })
    }

    /// Registers a running job. An existing job with the same id is replaced.
    pub fn create_job(&self, job_id: &str, total_records: u64, description: &str) {
        let progress = JobProgress::new(job_id, total_records, description, self.clock.now_ms());

        if self.jobs.insert(job_id.to_string(), progress).is_some() {
            tracing::warn!("Job {} re-registered, previous progress discarded", job_id);
        }
        tracing::info!(
            "Tracking job {} ({}), {} records expected",
            job_id,
            description,
            total_records
        );
    }

    /// Sets the absolute processed count.
    pub fn update_progress(&self, job_id: &str, processed_records: u64, message: &str) -> bool {
        self.mutate_running(job_id, |job| {
            if job.set_processed(processed_records) {
                tracing::warn!(
                    "Job {} reported {} processed records, capped at total {}",
                    job_id,
                    processed_records,
                    job.total_records
                );
            }
            job.last_message = message.to_string();
        })
    }

    /// Adds `delta` to the processed count and returns the new count.
    pub fn increment_progress(&self, job_id: &str, delta: u64) -> Option<u64> {
        let mut updated = None;
        self.mutate_running(job_id, |job| {
            job.set_processed(job.processed_records.saturating_add(delta));
            updated = Some(job.processed_records);
        });
        updated
    }

    /// Corrects the denominator once the input size is known.
    pub fn update_total_records(&self, job_id: &str, total_records: u64) -> bool {
        self.mutate_running(job_id, |job| {
            job.total_records = total_records;
            if job.set_processed(job.processed_records) {
                tracing::warn!(
                    "Job {} total lowered to {}, processed count capped",
                    job_id,
                    total_records
                );
            }
            job.last_message = format!("Total records: {}", total_records);
        })
    }

    /// Sets the persisted-records counter, independent of the processed one.
    pub fn update_saved_progress(&self, job_id: &str, saved_records: u64) -> bool {
        self.mutate_running(job_id, |job| {
            job.saved_records = saved_records;
            job.last_message = format!("Saved {} records", saved_records);
        })
    }

    /// Marks a job COMPLETED or FAILED and stamps its end time.
    ///
    /// A cancelled job keeps its status and `false` is returned.
    pub fn complete_job(&self, job_id: &str, success: bool, message: &str) -> bool {
        let now = self.clock.now_ms();
        let Some(mut job) = self.jobs.get_mut(job_id) else {
            tracing::debug!("complete_job: unknown job {}", job_id);
            return false;
        };

        if job.status == JobStatus::Cancelled {
            tracing::info!("Job {} was cancelled, ignoring outcome: {}", job_id, message);
            return false;
        }

        job.status = if success {
            JobStatus::Completed
        } else {
            JobStatus::Failed
        };
        job.end_time_ms = Some(now);
        job.last_update_time_ms = now;
        job.last_message = message.to_string();

        if success {
            tracing::info!("Job {} completed: {}", job_id, message);
        } else {
            tracing::error!("Job {} failed: {}", job_id, message);
        }
        true
    }

    /// Moves a running job to CANCELLED.
    pub fn cancel_job(&self, job_id: &str, message: &str) -> bool {
        let now = self.clock.now_ms();
        let Some(mut job) = self.jobs.get_mut(job_id) else {
            tracing::debug!("cancel_job: unknown job {}", job_id);
            return false;
        };

        if job.status.is_terminal() {
            tracing::debug!(
                "cancel_job: job {} already {}",
                job_id,
                job.status.description()
            );
            return false;
        }

        job.status = JobStatus::Cancelled;
        job.end_time_ms = Some(now);
        job.last_update_time_ms = now;
        job.last_message = message.to_string();

        tracing::info!("Job {} cancelled: {}", job_id, message);
        true
    }

    pub fn job_status(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs.get(job_id).map(|entry| entry.status)
    }

    pub fn get_job_progress(&self, job_id: &str) -> Option<JobProgress> {
        self.jobs.get(job_id).map(|entry| entry.value().clone())
    }

    pub fn get_job_report(&self, job_id: &str) -> Option<JobReport> {
        let now = self.clock.now_ms();
        self.jobs.get(job_id).map(|entry| entry.report(now))
    }

    /// A point-in-time copy of every tracked job.
    pub fn get_all_job_progress(&self) -> HashMap<String, JobProgress> {
        self.jobs
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    pub fn get_all_job_reports(&self) -> HashMap<String, JobReport> {
        let now = self.clock.now_ms();
        self.jobs
            .iter()
            .map(|entry| (entry.key().clone(), entry.report(now)))
            .collect()
    }

    /// Removes every terminal job and returns how many were removed.
    pub fn cleanup_completed_jobs(&self) -> usize {
        let before = self.jobs.len();
        self.jobs.retain(|_, job| !job.status.is_terminal());
        let removed = before.saturating_sub(self.jobs.len());

        tracing::info!("Removed {} finished jobs", removed);
        removed
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Applies `update` to a running job and stamps its last update time.
    fn mutate_running<F>(&self, job_id: &str, update: F) -> bool
    where
        F: FnOnce(&mut JobProgress),
    {
        let now = self.clock.now_ms();
        let Some(mut job) = self.jobs.get_mut(job_id) else {
            tracing::debug!("Progress update for unknown job {}", job_id);
            return false;
        };

        if job.status.is_terminal() {
            tracing::debug!(
                "Ignoring progress update for {} job {}",
                job.status.description(),
                job_id
            );
            return false;
        }

        update(job.value_mut());
        job.last_update_time_ms = now;
        true
    }
}
