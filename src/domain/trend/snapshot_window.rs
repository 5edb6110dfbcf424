use std::collections::VecDeque;
use chrono::{DateTime, Duration, Utc};

use crate::domain::product::Product;

/// Products ingested together
#[derive(Debug, Clone)]
pub struct ProductBatch {
    pub timestamp: DateTime<Utc>,
    pub products: Vec<Product>,
}

/// Chronological batches no older than the retention period
#[derive(Debug, Clone)]
pub struct SnapshotWindow {
    batches: VecDeque<ProductBatch>,
    retention: Duration,
}

impl SnapshotWindow {
    pub fn new(retention_days: i64) -> Self {
        Self {
            batches: VecDeque::new(),
            retention: Duration::days(retention_days),
        }
    }

    /// Insert in timestamp order, then drop batches older than `now - retention`.
    /// Returns the number of purged batches.
    pub fn push(&mut self, batch: ProductBatch, now: DateTime<Utc>) -> usize {
        let position = self
            .batches
            .iter()
            .rposition(|b| b.timestamp <= batch.timestamp)
            .map_or(0, |i| i + 1);
        self.batches.insert(position, batch);
        self.purge(now)
    }

    pub fn purge(&mut self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.retention;
        let mut purged = 0;
        while self.batches.front().is_some_and(|b| b.timestamp < cutoff) {
            self.batches.pop_front();
            purged += 1;
        }
        purged
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ProductBatch> {
        self.batches.iter()
    }

    /// Batches at or after `cutoff`
    pub fn since(&self, cutoff: DateTime<Utc>) -> impl DoubleEndedIterator<Item = &ProductBatch> {
        self.batches.iter().filter(move |b| b.timestamp >= cutoff)
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn date_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.batches.front()?.timestamp, self.batches.back()?.timestamp))
    }

    pub fn total_products(&self) -> usize {
        self.batches.iter().map(|b| b.products.len()).sum()
    }
}
