//! Mean duplicate/receiving statistics over trial records.
//!
//! Buckets accumulate raw (sum, count) pairs in a single pass and divide
//! once at finalization. Parallel runs merge the raw pairs per bucket;
//! partial means are never merged.

use std::collections::HashMap;

use ordered_float::OrderedFloat;
use rayon::prelude::*;

use super::ordering::TechniqueOrder;
use super::types::{DelaySlice, SummaryAggregates, TechniqueStats, TrialRecord};

/// Running (sum, count) pair for one bucket.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricAccumulator {
    duplicate_sum: f64,
    receiving_sum: f64,
    count: usize,
}

impl MetricAccumulator {
    pub fn add(&mut self, record: &TrialRecord) {
        self.duplicate_sum += record.duplicate_metric;
        self.receiving_sum += record.receiving_rate;
        self.count += 1;
    }

    pub fn merge(&mut self, other: Self) {
        self.duplicate_sum += other.duplicate_sum;
        self.receiving_sum += other.receiving_sum;
        self.count += other.count;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Means for this bucket, or None if it was never populated.
    fn stats(&self, technique: &str) -> Option<TechniqueStats> {
        if self.count == 0 {
            return None;
        }
        Some(TechniqueStats {
            technique: technique.to_string(),
            mean_duplicate_metric: self.duplicate_sum / self.count as f64,
            mean_receiving_rate: self.receiving_sum / self.count as f64,
            samples: self.count,
        })
    }
}

/// Unordered bucket state, keyed by technique and independently by
/// (delay, technique).
#[derive(Debug, Default)]
pub struct RawAggregates {
    by_technique: HashMap<String, MetricAccumulator>,
    by_delay: HashMap<OrderedFloat<f64>, HashMap<String, MetricAccumulator>>,
}

impl RawAggregates {
    pub fn add(&mut self, record: &TrialRecord) {
        self.by_technique
            .entry(record.technique.clone())
            .or_default()
            .add(record);
        self.by_delay
            .entry(OrderedFloat(record.delay))
            .or_default()
            .entry(record.technique.clone())
            .or_default()
            .add(record);
    }

    pub fn merge(mut self, other: Self) -> Self {
        for (technique, acc) in other.by_technique {
            self.by_technique.entry(technique).or_default().merge(acc);
        }
        for (delay, buckets) in other.by_delay {
            let slice = self.by_delay.entry(delay).or_default();
            for (technique, acc) in buckets {
                slice.entry(technique).or_default().merge(acc);
            }
        }
        self
    }

    /// Compute means and apply the display order. Empty input finalizes to
    /// empty views, never an error.
    pub fn finalize(&self, order: &TechniqueOrder) -> SummaryAggregates {
        let by_technique = ordered_stats(&self.by_technique, order);

        let mut delays: Vec<&OrderedFloat<f64>> = self.by_delay.keys().collect();
        delays.sort();

        let by_delay = delays
            .into_iter()
            .map(|delay| DelaySlice {
                delay: delay.into_inner(),
                techniques: ordered_stats(&self.by_delay[delay], order),
            })
            .collect();

        SummaryAggregates {
            by_technique,
            by_delay,
        }
    }
}

/// Finalize one bucket map into display order. Labels are pre-sorted
/// lexically so ties inside the unrecognized tier stay deterministic.
fn ordered_stats(
    buckets: &HashMap<String, MetricAccumulator>,
    order: &TechniqueOrder,
) -> Vec<TechniqueStats> {
    let mut labels: Vec<String> = buckets.keys().cloned().collect();
    labels.sort();
    order.sort(&mut labels);

    labels
        .iter()
        .filter_map(|label| buckets[label].stats(label))
        .collect()
}

/// Single-pass sequential aggregation.
pub fn aggregate(records: &[TrialRecord]) -> RawAggregates {
    let mut raw = RawAggregates::default();
    for record in records {
        raw.add(record);
    }
    raw
}

/// Parallel aggregation for large logs. Partitions records across the rayon
/// pool and merges raw (sum, count) pairs per bucket. Result is identical to
/// [`aggregate`] for any partitioning.
pub fn aggregate_parallel(records: &[TrialRecord]) -> RawAggregates {
    records
        .par_iter()
        .fold(RawAggregates::default, |mut raw, record| {
            raw.add(record);
            raw
        })
        .reduce(RawAggregates::default, RawAggregates::merge)
}
