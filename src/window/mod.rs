//! Hot Item Window Module
//!
//! Maintains the ranking of the most-rated items over the last ten minutes.
//!
//! ## Data Flow
//! 1. **Ingest**: ratings arrive from the synthetic generator or over HTTP and
//!    are appended to a time-ordered window; stale ratings are evicted on the way.
//! 2. **Recompute**: every 30 seconds the window is grouped by item, ranked by
//!    rating count and truncated to the top ten.
//! 3. **Publish**: the ranking is swapped in as one immutable snapshot, so
//!    readers see either the old or the new ranking, never a mix.
//!
//! ## Submodules
//! - **`aggregator`**: the window, eviction, recompute loop and snapshot.
//! - **`types`**: rating events and ranked items.
//! - **`protocol`**: HTTP request/response contracts.
//! - **`handlers`**: Axum handlers over the aggregator.

pub mod aggregator;
pub mod handlers;
pub mod protocol;
pub mod types;

#[cfg(test)]
mod tests;
