//! Synthetic Load Generator
//!
//! Emits biased random ratings at a fixed rate into a [`RatingSink`] (in the
//! service, the window aggregator) and reports its throughput periodically.
//!
//! ## Lifecycle
//! - **Start**: spawns an emission task (one rating per `1000 / rate` ms) and
//!   a statistics task (every 10 s). The emitted-event counter restarts at 0.
//! - **Stop**: cancels both tasks and waits up to a grace period for them.
//! - **Rate change**: swaps in a new configuration; a running generator is
//!   stopped, paused briefly and started again on it.

use super::sampler::RatingSampler;
use super::types::*;
use crate::error::ServiceError;
use crate::scheduler::PeriodicTask;
use crate::window::aggregator::WindowAggregator;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

const STATS_INTERVAL: Duration = Duration::from_secs(10);
const STOP_GRACE: Duration = Duration::from_secs(5);
const RESTART_PAUSE: Duration = Duration::from_secs(1);
/// Emission also logs statistics every this many events.
const STATS_EVERY_EVENTS: u64 = 100;

impl RatingSink for WindowAggregator {
    fn accept(&self, rating: SyntheticRating) {
        self.ingest(rating.user_id, rating.item_id, rating.rating, None);
    }
}

/// The two periodic tasks of a running generator.
struct GeneratorTasks {
    emission: PeriodicTask,
    statistics: PeriodicTask,
}

pub struct RatingGenerator {
    /// Effective configuration, replaced whole on rate changes.
    config: ArcSwap<GeneratorConfig>,
    sink: Arc<dyn RatingSink>,
    generated: Arc<AtomicU64>,
    running: AtomicBool,
    tasks: Mutex<Option<GeneratorTasks>>,
    restart_pause: Duration,
}

impl RatingGenerator {
    pub fn new(config: GeneratorConfig, sink: Arc<dyn RatingSink>) -> Arc<Self> {
        Self::with_restart_pause(config, sink, RESTART_PAUSE)
    }

    /// Like [`RatingGenerator::new`] with a custom pause between the stop and
    /// the start of a rate change.
    pub fn with_restart_pause(
        config: GeneratorConfig,
        sink: Arc<dyn RatingSink>,
        restart_pause: Duration,
    ) -> Arc<Self> {
        tracing::info!(
            "Rating generator configured: {} items, {} users, {:.1}% hot items, ratings in [{:.1}, {:.1}]",
            config.item_count,
            config.user_count,
            config.hot_item_ratio * 100.0,
            config.rating_min,
            config.rating_max
        );

        Arc::new(Self {
            config: ArcSwap::from_pointee(config),
            sink,
            generated: Arc::new(AtomicU64::new(0)),
            running: AtomicBool::new(false),
            tasks: Mutex::new(None),
            restart_pause,
        })
    }

    /// Starts emitting. A running generator only logs.
    ///
    /// # Errors
    /// A scheduling failure. Anything already spawned is cancelled before the
    /// error is returned, so no task outlives a failed start.
    pub fn start(&self) -> Result<(), ServiceError> {
        let mut slot = self.tasks.lock();
        if slot.is_some() {
            tracing::info!("Rating generator is already running");
            return Ok(());
        }

        let config = self.config.load_full();
        self.generated.store(0, Ordering::SeqCst);

        let emission = match self.spawn_emission(config.clone()) {
            Ok(task) => task,
            Err(e) => {
                tracing::error!("Failed to start rating generator: {}", e);
                return Err(e);
            }
        };

        let statistics = match self.spawn_statistics(config.rate_per_second) {
            Ok(task) => task,
            Err(e) => {
                tracing::error!("Failed to start rating generator, stopping emission: {}", e);
                emission.cancel();
                return Err(e);
            }
        };

        *slot = Some(GeneratorTasks {
            emission,
            statistics,
        });
        self.running.store(true, Ordering::SeqCst);

        tracing::info!(
            "Rating generator started at {} ratings/s",
            config.rate_per_second
        );
        Ok(())
    }

    fn spawn_emission(&self, config: Arc<GeneratorConfig>) -> Result<PeriodicTask, ServiceError> {
        let sampler = RatingSampler::new(config.clone());
        let sink = self.sink.clone();
        let generated = self.generated.clone();
        let rate = config.rate_per_second;
        let mut rng = StdRng::from_entropy();

        PeriodicTask::spawn(
            "rating-emission",
            config.emission_interval(),
            Duration::ZERO,
            move || {
                let rating = sampler.sample(&mut rng);
                sink.accept(rating);

                let count = generated.fetch_add(1, Ordering::SeqCst) + 1;
                if count % STATS_EVERY_EVENTS == 0 {
                    tracing::debug!("Generated {} ratings (rate {}/s)", count, rate);
                }
                futures::future::ready(Ok(()))
            },
        )
    }

    fn spawn_statistics(&self, rate: u32) -> Result<PeriodicTask, ServiceError> {
        let generated = self.generated.clone();

        PeriodicTask::spawn(
            "generator-statistics",
            STATS_INTERVAL,
            STATS_INTERVAL,
            move || {
                tracing::info!(
                    "Rating generator: {} ratings generated, rate {}/s",
                    generated.load(Ordering::SeqCst),
                    rate
                );
                futures::future::ready(Ok(()))
            },
        )
    }

    /// Stops both tasks, waiting up to the grace period for each. A stopped
    /// generator only logs.
    pub async fn stop(&self) {
        let tasks = self.tasks.lock().take();

        let Some(tasks) = tasks else {
            tracing::info!("Rating generator is not running");
            return;
        };

        self.running.store(false, Ordering::SeqCst);

        for task in [tasks.emission, tasks.statistics] {
            let name = task.name();
            if !task.shutdown(STOP_GRACE).await {
                tracing::warn!("Rating generator task {} was force-cancelled", name);
            }
        }

        tracing::info!(
            "Rating generator stopped, {} ratings generated",
            self.generated.load(Ordering::SeqCst)
        );
    }

    /// Sets the emission rate, clamped to `[1, 1000]`, and returns the
    /// effective rate.
    ///
    /// A running generator is stopped, paused and restarted so the new
    /// interval applies from a clean schedule.
    pub async fn set_rate(&self, rate: i64) -> Result<u32, ServiceError> {
        let next = self.config.load().with_rate(rate);
        let effective = next.rate_per_second;
        self.config.store(Arc::new(next));

        tracing::info!("Rating generator rate set to {}/s (requested {})", effective, rate);

        if self.is_running() {
            self.stop().await;
            tokio::time::sleep(self.restart_pause).await;
            self.start()?;
        }

        Ok(effective)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> GeneratorStatus {
        let config = self.config.load();
        GeneratorStatus {
            is_running: self.is_running(),
            generated_count: self.generated.load(Ordering::SeqCst),
            rate: config.rate_per_second,
            item_count: config.item_count,
            user_count: config.user_count,
            hot_item_ratio: config.hot_item_ratio,
        }
    }

    /// Zeroes the emitted-event counter without touching the run state.
    pub fn reset_counter(&self) {
        self.generated.store(0, Ordering::SeqCst);
        tracing::info!("Rating generator counter reset");
    }

    pub fn config(&self) -> Arc<GeneratorConfig> {
        self.config.load_full()
    }
}
