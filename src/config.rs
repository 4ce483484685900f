//! Command-line and environment configuration for the server binary.

use crate::error::ServiceError;
use crate::generator::types::GeneratorConfig;

use clap::Parser;
use std::net::SocketAddr;

#[derive(Debug, Clone, Parser)]
#[command(name = "hot-ratings", about = "Hot item ranking over a sliding window of ratings")]
pub struct ServerArgs {
    /// Address the HTTP server binds to.
    #[arg(long, env = "HOT_RATINGS_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Default log filter when RUST_LOG is not set.
    #[arg(long, env = "HOT_RATINGS_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Synthetic events per second, clamped to [1, 1000].
    #[arg(long, env = "HOT_RATINGS_RATE", default_value_t = 10)]
    pub rate: i64,

    #[arg(long, env = "HOT_RATINGS_ITEM_COUNT", default_value_t = 100)]
    pub item_count: u64,

    #[arg(long, env = "HOT_RATINGS_USER_COUNT", default_value_t = 1000)]
    pub user_count: u64,

    /// Share of synthetic events aimed at the hot item list.
    #[arg(long, env = "HOT_RATINGS_HOT_ITEM_RATIO", default_value_t = 0.3)]
    pub hot_item_ratio: f64,

    #[arg(long, env = "HOT_RATINGS_RATING_MIN", default_value_t = 1.0)]
    pub rating_min: f64,

    #[arg(long, env = "HOT_RATINGS_RATING_MAX", default_value_t = 5.0)]
    pub rating_max: f64,

    /// Batch jobs report processed records every this many records.
    #[arg(long, env = "HOT_RATINGS_PROGRESS_INTERVAL", default_value_t = 10_000)]
    pub progress_interval: u64,

    /// Ratings file used when a batch request names none.
    #[arg(long, env = "HOT_RATINGS_CSV_PATH", default_value = "data/ratings.csv")]
    pub default_csv_path: String,
}

impl ServerArgs {
    pub fn generator_config(&self) -> Result<GeneratorConfig, ServiceError> {
        GeneratorConfig::new(
            self.rate,
            self.item_count,
            self.user_count,
            self.hot_item_ratio,
            self.rating_min,
            self.rating_max,
        )
    }
}
