use crate::error::ServiceError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Items that receive a disproportionate share of synthetic ratings.
pub const HOT_ITEM_IDS: [u64; 20] = [
    1, 2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67,
];

pub const MIN_RATE: u32 = 1;
pub const MAX_RATE: u32 = 1000;

pub fn is_hot_item(item_id: u64) -> bool {
    HOT_ITEM_IDS.contains(&item_id)
}

/// Immutable generator settings.
///
/// A rate change produces a new value through [`GeneratorConfig::with_rate`];
/// the running generator is restarted on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Events per second, always within `[MIN_RATE, MAX_RATE]`.
    pub rate_per_second: u32,
    pub item_count: u64,
    pub user_count: u64,
    /// Probability of drawing from `HOT_ITEM_IDS` instead of `[1, item_count]`.
    pub hot_item_ratio: f64,
    pub rating_min: f64,
    pub rating_max: f64,
}

impl GeneratorConfig {
    /// Builds a validated configuration. `rate` is clamped, every other
    /// field is checked.
    pub fn new(
        rate: i64,
        item_count: u64,
        user_count: u64,
        hot_item_ratio: f64,
        rating_min: f64,
        rating_max: f64,
    ) -> Result<Self, ServiceError> {
        if item_count == 0 {
            return Err(ServiceError::InvalidConfig(
                "item_count must be at least 1".to_string(),
            ));
        }
        if user_count == 0 {
            return Err(ServiceError::InvalidConfig(
                "user_count must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&hot_item_ratio) {
            return Err(ServiceError::InvalidConfig(format!(
                "hot_item_ratio must be within [0, 1], got {}",
                hot_item_ratio
            )));
        }
        if !rating_min.is_finite() || !rating_max.is_finite() || rating_min > rating_max {
            return Err(ServiceError::InvalidConfig(format!(
                "rating range [{}, {}] is invalid",
                rating_min, rating_max
            )));
        }

        Ok(Self {
            rate_per_second: clamp_rate(rate),
            item_count,
            user_count,
            hot_item_ratio,
            rating_min,
            rating_max,
        })
    }

    /// Same settings with a new (clamped) rate.
    pub fn with_rate(&self, rate: i64) -> Self {
        Self {
            rate_per_second: clamp_rate(rate),
            ..self.clone()
        }
    }

    /// Delay between two emitted events.
    pub fn emission_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.rate_per_second.max(MIN_RATE)))
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            rate_per_second: 10,
            item_count: 100,
            user_count: 1000,
            hot_item_ratio: 0.3,
            rating_min: 1.0,
            rating_max: 5.0,
        }
    }
}

pub fn clamp_rate(rate: i64) -> u32 {
    rate.clamp(i64::from(MIN_RATE), i64::from(MAX_RATE)) as u32
}

/// Point-in-time view of the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorStatus {
    pub is_running: bool,
    pub generated_count: u64,
    pub rate: u32,
    pub item_count: u64,
    pub user_count: u64,
    pub hot_item_ratio: f64,
}

/// One synthesized rating, before it is handed to a sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticRating {
    pub user_id: u64,
    pub item_id: u64,
    pub rating: f64,
}

/// Destination of generated ratings.
pub trait RatingSink: Send + Sync {
    fn accept(&self, rating: SyntheticRating);
}
