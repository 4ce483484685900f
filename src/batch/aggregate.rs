//! Per-item lifetime aggregates and the store they are written to.

use super::record::RatingRecord;

use anyhow::Result;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const COLUMN_AVG_RATING: &str = "avg_rating";
pub const COLUMN_RATING_COUNT: &str = "rating_count";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemAggregate {
    pub avg_rating: f64,
    pub rating_count: u64,
}

impl ItemAggregate {
    /// The stored row as `(column, value)` pairs.
    pub fn columns(&self) -> [(&'static str, String); 2] {
        [
            (COLUMN_AVG_RATING, format!("{:.3}", self.avg_rating)),
            (COLUMN_RATING_COUNT, self.rating_count.to_string()),
        ]
    }
}

/// Running sum and count per item.
#[derive(Debug, Default)]
pub struct RatingAccumulator {
    totals: BTreeMap<u64, (f64, u64)>,
}

impl RatingAccumulator {
    pub fn add(&mut self, record: &RatingRecord) {
        let entry = self.totals.entry(record.item_id).or_insert((0.0, 0));
        entry.0 += record.rating;
        entry.1 += 1;
    }

    pub fn item_count(&self) -> usize {
        self.totals.len()
    }

    /// Final averages in ascending item id order.
    pub fn into_aggregates(self) -> impl Iterator<Item = (u64, ItemAggregate)> {
        self.totals.into_iter().map(|(item_id, (sum, count))| {
            let avg_rating = if count > 0 { sum / count as f64 } else { 0.0 };
            (
                item_id,
                ItemAggregate {
                    avg_rating,
                    rating_count: count,
                },
            )
        })
    }
}

/// Destination of finished aggregates, one row per item id.
pub trait AggregateSink: Send + Sync {
    fn put(&self, item_id: u64, aggregate: ItemAggregate) -> Result<()>;
}

/// Keeps every row in memory. Rewriting an item replaces its row.
#[derive(Debug, Default)]
pub struct MemoryAggregateSink {
    rows: DashMap<u64, ItemAggregate>,
}

impl MemoryAggregateSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn get(&self, item_id: u64) -> Option<ItemAggregate> {
        self.rows.get(&item_id).map(|row| *row.value())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl AggregateSink for MemoryAggregateSink {
    fn put(&self, item_id: u64, aggregate: ItemAggregate) -> Result<()> {
        self.rows.insert(item_id, aggregate);
        if tracing::enabled!(tracing::Level::TRACE) {
            let row: Vec<String> = aggregate
                .columns()
                .iter()
                .map(|(column, value)| format!("{}={}", column, value))
                .collect();
            tracing::trace!("Stored item {}: {}", item_id, row.join(" "));
        }
        Ok(())
    }
}
