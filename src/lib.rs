//! Hot Item Ratings Service Library
//!
//! This library crate defines the components behind the `hot-ratings` binary
//! (`main.rs`): a live top-K ranking of the most rated items, the load
//! generator that feeds it, and progress tracking for offline batch jobs.
//!
//! ## Architecture Modules
//! - **`window`**: The sliding-window aggregator. Holds the rating events of
//!   the last 10 minutes and periodically publishes the 10 most rated items.
//! - **`generator`**: Synthetic rating traffic with a biased set of hot items,
//!   emitted at a configurable rate into the window.
//! - **`progress`**: A concurrent registry of long-running jobs with derived
//!   throughput and ETA.
//! - **`batch`**: The offline aggregation driver that averages a ratings file
//!   per item and reports to the progress registry.
//!
//! ## Shared Infrastructure
//! - **`clock`**: Injected millisecond clock (wall clock or manual for tests).
//! - **`scheduler`**: Supervised periodic tasks with explicit cancellation.
//! - **`config`**: Command-line and environment configuration.
//! - **`error`**: Service-level error types.

pub mod batch;
pub mod clock;
pub mod config;
pub mod error;
pub mod generator;
pub mod progress;
pub mod scheduler;
pub mod window;
