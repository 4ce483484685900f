//! Synthetic Rating Generator Module
//!
//! Produces realistic-looking rating traffic for the hot item window: a small
//! set of "hot" items is rated more often and more favourably than the rest.
//!
//! ## Submodules
//! - **`generator`**: run state, emission and statistics tasks, rate changes.
//! - **`sampler`**: the biased user/item/rating draw.
//! - **`types`**: configuration, status and the `RatingSink` seam.
//! - **`protocol`** / **`handlers`**: HTTP contracts and Axum handlers.

pub mod generator;
pub mod handlers;
pub mod protocol;
pub mod sampler;
pub mod types;
