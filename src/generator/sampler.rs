//! Biased Rating Synthesis
//!
//! Hot items are both picked more often and rated higher than the rest:
//! - **Item**: with probability `hot_item_ratio` one of `HOT_ITEM_IDS`,
//!   otherwise uniform over `[1, item_count]`.
//! - **Rating**: normal around 4.2 (sd 0.6) for hot items, 3.5 (sd 1.0)
//!   otherwise, clamped to the configured range and rounded to a half star.

use super::types::{is_hot_item, GeneratorConfig, SyntheticRating, HOT_ITEM_IDS};

use rand::Rng;
use rand_distr::StandardNormal;
use std::sync::Arc;

const HOT_RATING_MEAN: f64 = 4.2;
const HOT_RATING_STD_DEV: f64 = 0.6;
const REGULAR_RATING_MEAN: f64 = 3.5;
const REGULAR_RATING_STD_DEV: f64 = 1.0;

pub struct RatingSampler {
    config: Arc<GeneratorConfig>,
}

impl RatingSampler {
    pub fn new(config: Arc<GeneratorConfig>) -> Self {
        Self { config }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SyntheticRating {
        let user_id = rng.gen_range(1..=self.config.user_count);
        let item_id = self.pick_item(rng);
        let rating = self.pick_rating(item_id, rng);

        SyntheticRating {
            user_id,
            item_id,
            rating,
        }
    }

    fn pick_item<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        if rng.gen::<f64>() < self.config.hot_item_ratio {
            HOT_ITEM_IDS[rng.gen_range(0..HOT_ITEM_IDS.len())]
        } else {
            rng.gen_range(1..=self.config.item_count)
        }
    }

    fn pick_rating<R: Rng + ?Sized>(&self, item_id: u64, rng: &mut R) -> f64 {
        let z: f64 = rng.sample(StandardNormal);
        let raw = if is_hot_item(item_id) {
            z * HOT_RATING_STD_DEV + HOT_RATING_MEAN
        } else {
            z * REGULAR_RATING_STD_DEV + REGULAR_RATING_MEAN
        };

        round_to_half(raw.clamp(self.config.rating_min, self.config.rating_max))
    }
}

/// Rounds to the nearest multiple of 0.5, halves rounding up.
pub fn round_to_half(value: f64) -> f64 {
    (value * 2.0 + 0.5).floor() / 2.0
}
