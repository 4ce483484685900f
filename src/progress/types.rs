use serde::{Deserialize, Serialize};

/// Lifecycle of a tracked job.
///
/// `Running` is the only non-terminal state. Once terminal, the job's
/// counters are frozen; only `complete_job` may still rewrite a COMPLETED or
/// FAILED outcome. CANCELLED is final.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Running)
    }

    pub fn description(self) -> &'static str {
        match self {
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

/// Counters and timing of one job, as stored by the tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobProgress {
    pub job_id: String,
    pub description: String,
    pub status: JobStatus,
    /// 0 while the size of the input is unknown.
    pub total_records: u64,
    pub processed_records: u64,
    pub saved_records: u64,
    pub progress_percentage: f64,
    pub last_message: String,
    pub start_time_ms: u64,
    pub end_time_ms: Option<u64>,
    pub last_update_time_ms: u64,
}

impl JobProgress {
    pub fn new(job_id: &str, total_records: u64, description: &str, now_ms: u64) -> Self {
        Self {
            job_id: job_id.to_string(),
            description: description.to_string(),
            status: JobStatus::Running,
            total_records,
            processed_records: 0,
            saved_records: 0,
            progress_percentage: 0.0,
            last_message: String::new(),
            start_time_ms: now_ms,
            end_time_ms: None,
            last_update_time_ms: now_ms,
        }
    }

    /// Sets the processed count, capped at the total once the total is known.
    ///
    /// Returns `true` when the value had to be capped.
    pub(crate) fn set_processed(&mut self, processed: u64) -> bool {
        let capped = self.total_records > 0 && processed > self.total_records;
        self.processed_records = if capped {
            self.total_records
        } else {
            processed
        };
        self.refresh_percentage();
        capped
    }

    /// Percentage is only meaningful with a known total; otherwise the last
    /// value is kept.
    pub(crate) fn refresh_percentage(&mut self) {
        if self.total_records > 0 {
            self.progress_percentage =
                self.processed_records as f64 / self.total_records as f64 * 100.0;
        }
    }

    /// Records per second between the start and the last update.
    pub fn processing_speed(&self) -> f64 {
        let seconds = elapsed_seconds(self.start_time_ms, self.last_update_time_ms);
        if seconds == 0 {
            return 0.0;
        }
        self.processed_records as f64 / seconds as f64
    }

    /// `None` when the total is unknown, nothing was processed yet or no
    /// measurable time has passed.
    pub fn estimated_remaining_seconds(&self) -> Option<u64> {
        if self.total_records == 0 || self.processed_records == 0 {
            return None;
        }

        let speed = self.processing_speed();
        if speed <= 0.0 {
            return None;
        }

        let remaining = self.total_records.saturating_sub(self.processed_records);
        Some((remaining as f64 / speed) as u64)
    }

    /// Seconds from the start to the end, or to `now_ms` while unfinished.
    pub fn running_seconds(&self, now_ms: u64) -> u64 {
        elapsed_seconds(self.start_time_ms, self.end_time_ms.unwrap_or(now_ms))
    }

    pub fn report(&self, now_ms: u64) -> JobReport {
        let remaining = self.estimated_remaining_seconds();

        JobReport {
            job_id: self.job_id.clone(),
            description: self.description.clone(),
            status: self.status,
            status_description: self.status.description().to_string(),
            total_records: self.total_records,
            processed_records: self.processed_records,
            saved_records: self.saved_records,
            progress_percentage: self.progress_percentage,
            processing_speed: self.processing_speed(),
            running_seconds: self.running_seconds(now_ms),
            estimated_remaining_seconds: remaining,
            estimated_remaining_time: format_remaining(remaining),
            last_message: self.last_message.clone(),
            start_time_ms: self.start_time_ms,
            end_time_ms: self.end_time_ms,
            last_update_time_ms: self.last_update_time_ms,
        }
    }
}

/// Read-time view of a job with its derived metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub job_id: String,
    pub description: String,
    pub status: JobStatus,
    pub status_description: String,
    pub total_records: u64,
    pub processed_records: u64,
    pub saved_records: u64,
    pub progress_percentage: f64,
    pub processing_speed: f64,
    pub running_seconds: u64,
    pub estimated_remaining_seconds: Option<u64>,
    pub estimated_remaining_time: String,
    pub last_message: String,
    pub start_time_ms: u64,
    pub end_time_ms: Option<u64>,
    pub last_update_time_ms: u64,
}

/// Whole seconds between two instants, 0 if `to` precedes `from`.
pub fn elapsed_seconds(from_ms: u64, to_ms: u64) -> u64 {
    to_ms.saturating_sub(from_ms) / 1000
}

/// Renders a remaining time as `"1h 2m 3s"`, or `"unavailable"` when there is
/// no positive estimate.
pub fn format_remaining(seconds: Option<u64>) -> String {
    match seconds {
        Some(s) if s > 0 => format!("{}h {}m {}s", s / 3600, (s % 3600) / 60, s % 60),
        _ => "unavailable".to_string(),
    }
}
