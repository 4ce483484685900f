use serde::{Deserialize, Serialize};

/// A single rating as held in the sliding window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingEvent {
    pub user_id: u64,
    pub item_id: u64,
    pub rating: f64,
    /// Event time (ms). Decides window membership.
    pub timestamp_ms: u64,
}

/// A rating as submitted by a caller. Without a timestamp the event is
/// stamped with the ingestion time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingInput {
    pub user_id: u64,
    pub item_id: u64,
    pub rating: f64,
    #[serde(default)]
    pub timestamp_ms: Option<u64>,
}

impl RatingInput {
    pub fn new(user_id: u64, item_id: u64, rating: f64) -> Self {
        Self {
            user_id,
            item_id,
            rating,
            timestamp_ms: None,
        }
    }

    pub fn at(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }

    pub(crate) fn into_event(self, ingested_at_ms: u64) -> RatingEvent {
        RatingEvent {
            user_id: self.user_id,
            item_id: self.item_id,
            rating: self.rating,
            timestamp_ms: self.timestamp_ms.unwrap_or(ingested_at_ms),
        }
    }
}

/// One entry of the published ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    pub item_id: u64,
    /// Number of ratings inside the window.
    pub rating_count: u64,
    pub avg_rating: f64,
    /// When the recompute pass that produced this entry ran (ms).
    pub computed_at_ms: u64,
}
