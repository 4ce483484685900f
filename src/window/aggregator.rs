//! Sliding-Window Aggregator
//!
//! Keeps the ratings of the last ten minutes and periodically publishes the
//! ten most-rated items of that window.
//!
//! ## Responsibilities
//! - **Ingestion**: appending ratings from any number of concurrent callers.
//! - **Eviction**: dropping ratings older than the window. Eviction is lazy: it
//!   runs on every ingest and at the start of every recompute pass.
//! - **Ranking**: ranking the window's per-item tallies by rating count and
//!   swapping the result in as one immutable snapshot.
//!
//! Per-item tallies are maintained on push and eviction, so a recompute pass
//! only copies one tally per item under the lock. Sorting and publishing run
//! after the lock is released.

use super::types::{RankedItem, RatingEvent, RatingInput};
use crate::clock::Clock;
use crate::error::ServiceError;
use crate::scheduler::PeriodicTask;

use arc_swap::ArcSwap;
use parking_lot::{Mutex, RwLock};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Length of the trailing window (10 minutes).
pub const WINDOW_DURATION_MS: u64 = 10 * 60 * 1000;
/// Period of the background recompute loop.
pub const RECOMPUTE_INTERVAL: Duration = Duration::from_secs(30);
/// Maximum number of entries in a published ranking.
pub const TOP_K: usize = 10;

const STOP_GRACE: Duration = Duration::from_secs(5);

/// Ratings currently inside the window, ordered by event time.
///
/// Keyed by `(timestamp_ms, sequence)` so that eviction only ever touches the
/// front of the map, even when callers supply out-of-order timestamps.
/// `tallies` always summarizes exactly the events in `events`.
#[derive(Default)]
struct EventWindow {
    events: BTreeMap<(u64, u64), RatingEvent>,
    tallies: BTreeMap<u64, ItemTally>,
    next_seq: u64,
}

impl EventWindow {
    fn push(&mut self, event: RatingEvent) {
        let tally = self.tallies.entry(event.item_id).or_default();
        tally.count += 1;
        tally.rating_sum += event.rating;

        let key = (event.timestamp_ms, self.next_seq);
        self.next_seq += 1;
        self.events.insert(key, event);
    }

    /// Removes every event stamped strictly before `cutoff_ms`.
    fn evict_before(&mut self, cutoff_ms: u64) -> usize {
        let mut evicted = 0;
        while let Some(entry) = self.events.first_entry() {
            if entry.key().0 >= cutoff_ms {
                break;
            }
            let event = entry.remove();
            self.forget(&event);
            evicted += 1;
        }
        evicted
    }

    fn forget(&mut self, event: &RatingEvent) {
        if let Entry::Occupied(mut entry) = self.tallies.entry(event.item_id) {
            let tally = entry.get_mut();
            tally.count -= 1;
            tally.rating_sum -= event.rating;
            if tally.count == 0 {
                entry.remove();
            }
        }
    }
}

/// Running count and rating sum of one item inside the window.
#[derive(Debug, Clone, Copy, Default)]
struct ItemTally {
    count: u64,
    rating_sum: f64,
}

pub struct WindowAggregator {
    window: RwLock<EventWindow>,
    /// Last published ranking. Swapped whole, never edited in place.
    ranking: ArcSwap<Vec<RankedItem>>,
    recompute_loop: Mutex<Option<PeriodicTask>>,
    running: AtomicBool,
    publications: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl WindowAggregator {
    pub fn new(clock: Arc<dyn Clock>) -> Arc<Self> {
        Arc::new(Self {
            window: RwLock::new(EventWindow::default()),
            ranking: ArcSwap::from_pointee(Vec::new()),
            recompute_loop: Mutex::new(None),
            running: AtomicBool::new(false),
            publications: AtomicU64::new(0),
            clock,
        })
    }

    /// Starts the recompute loop. The first pass runs immediately, then every
    /// [`RECOMPUTE_INTERVAL`].
    ///
    /// Calling `start` on a running aggregator only logs.
    pub fn start(self: &Arc<Self>) -> Result<(), ServiceError> {
        let mut slot = self.recompute_loop.lock();
        if slot.is_some() {
            tracing::info!("Window aggregator is already running");
            return Ok(());
        }

        let aggregator = self.clone();
        let task = PeriodicTask::spawn(
            "window-recompute",
            RECOMPUTE_INTERVAL,
            Duration::ZERO,
            move || {
                aggregator.recompute();
                futures::future::ready(Ok(()))
            },
        )
        .map_err(|e| {
            tracing::error!("Failed to start window aggregator: {}", e);
            e
        })?;

        *slot = Some(task);
        self.running.store(true, Ordering::SeqCst);

        tracing::info!(
            "Window aggregator started (window {}s, recompute every {:?})",
            WINDOW_DURATION_MS / 1000,
            RECOMPUTE_INTERVAL
        );
        Ok(())
    }

    /// Stops the recompute loop and waits for it to exit.
    ///
    /// A pass already in progress completes first. Stopping an idle
    /// aggregator only logs.
    pub async fn stop(&self) {
        let task = self.recompute_loop.lock().take();

        let Some(task) = task else {
            tracing::info!("Window aggregator is not running");
            return;
        };

        self.running.store(false, Ordering::SeqCst);
        task.shutdown(STOP_GRACE).await;

        tracing::info!("Window aggregator stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Appends one rating, stamped with the current time when `timestamp_ms`
    /// is `None`, then evicts expired ratings.
    pub fn ingest(&self, user_id: u64, item_id: u64, rating: f64, timestamp_ms: Option<u64>) {
        let now = self.clock.now_ms();
        let event = RatingEvent {
            user_id,
            item_id,
            rating,
            timestamp_ms: timestamp_ms.unwrap_or(now),
        };

        let evicted = {
            let mut window = self.window.write();
            window.push(event);
            window.evict_before(window_start(now))
        };

        tracing::trace!(
            "Ingested rating: user {} rated item {} with {:.1}",
            user_id,
            item_id,
            rating
        );
        if evicted > 0 {
            tracing::trace!("Evicted {} expired ratings", evicted);
        }
    }

    /// Appends a batch of ratings. Ratings without a timestamp all share the
    /// batch's ingestion time.
    pub fn ingest_batch(&self, ratings: Vec<RatingInput>) -> usize {
        let now = self.clock.now_ms();
        let count = ratings.len();

        let evicted = {
            let mut window = self.window.write();
            for rating in ratings {
                window.push(rating.into_event(now));
            }
            window.evict_before(window_start(now))
        };

        tracing::debug!(
            "Ingested batch of {} ratings ({} expired ratings evicted)",
            count,
            evicted
        );
        count
    }

    /// Runs one recompute pass and publishes its ranking.
    ///
    /// Returns the published ranking, or `None` when the window is empty. An
    /// empty window leaves the previously published ranking in place.
    ///
    /// Ties in rating count keep ascending item id order. That order is an
    /// implementation detail, not part of the ranking contract.
    pub fn recompute(&self) -> Option<Arc<Vec<RankedItem>>> {
        let now = self.clock.now_ms();
        let cutoff = window_start(now);

        let (tallies, window_size) = {
            let mut window = self.window.write();
            window.evict_before(cutoff);
            (window.tallies.clone(), window.events.len())
        };

        if tallies.is_empty() {
            tracing::info!("No ratings in the current window, keeping the previous ranking");
            return None;
        }

        let item_count = tallies.len();
        let mut ranking: Vec<RankedItem> = tallies
            .into_iter()
            .map(|(item_id, tally)| RankedItem {
                item_id,
                rating_count: tally.count,
                avg_rating: tally.rating_sum / tally.count as f64,
                computed_at_ms: now,
            })
            .collect();

        // Stable sort: equal counts stay in item id order
        ranking.sort_by(|a, b| b.rating_count.cmp(&a.rating_count));
        ranking.truncate(TOP_K);

        let ranking = Arc::new(ranking);
        self.ranking.store(ranking.clone());
        self.publications.fetch_add(1, Ordering::SeqCst);

        tracing::info!(
            "Published hot item ranking: {} ratings over {} items in the last {}s",
            window_size,
            item_count,
            WINDOW_DURATION_MS / 1000
        );
        for (rank, item) in ranking.iter().enumerate() {
            tracing::debug!(
                "  #{} item {} ({} ratings, avg {:.2})",
                rank + 1,
                item.item_id,
                item.rating_count,
                item.avg_rating
            );
        }

        Some(ranking)
    }

    /// The most recently published ranking; empty before the first pass.
    pub fn current_ranking(&self) -> Arc<Vec<RankedItem>> {
        self.ranking.load_full()
    }

    /// Drops the published ranking. The event window is untouched.
    pub fn clear_cache(&self) {
        self.ranking.store(Arc::new(Vec::new()));
        tracing::info!("Hot item ranking cleared");
    }

    /// Current time on the aggregator's clock.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Number of ratings currently held, including not yet evicted ones.
    pub fn window_len(&self) -> usize {
        self.window.read().events.len()
    }

    /// Number of rankings published since creation.
    pub fn publication_count(&self) -> u64 {
        self.publications.load(Ordering::SeqCst)
    }
}

/// Oldest event time still inside the window ending at `now_ms`.
fn window_start(now_ms: u64) -> u64 {
    now_ms.saturating_sub(WINDOW_DURATION_MS)
}
