//! Batch Aggregation Module
//!
//! Offline counterpart of the hot item window: averages every rating of a
//! large historical source per item and stores the result, reporting its
//! progress to the job tracker.
//!
//! ## Submodules
//! - **`record`**: parsing of `userId,itemId,rating,timestamp` lines.
//! - **`source`**: the `RecordSource` seam with in-memory and file sources.
//! - **`aggregate`**: per-item accumulation and the `AggregateSink` store.
//! - **`job`**: the count / aggregate / save driver.
//! - **`protocol`** / **`handlers`**: HTTP contracts and Axum handlers.

pub mod aggregate;
pub mod handlers;
pub mod job;
pub mod protocol;
pub mod record;
pub mod source;
