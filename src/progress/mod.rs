//! Job Progress Module
//!
//! Observability for long-running batch jobs: a shared registry of per-job
//! counters, timing and outcome, plus read-time throughput and ETA estimates.
//!
//! ## Submodules
//! - **`tracker`**: the concurrent job registry and its mutation rules.
//! - **`types`**: `JobStatus`, `JobProgress` and the derived `JobReport` view.
//! - **`protocol`** / **`handlers`**: HTTP contracts and Axum handlers.

pub mod handlers;
pub mod protocol;
pub mod tracker;
pub mod types;
