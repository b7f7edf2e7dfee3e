use std::{cmp::Ordering, collections::BTreeMap};

use crate::types::MetricValue;

/// Per-pass state for Unbound's latency histogram.
///
/// Unbound reports raw (non-cumulative) counts per bucket and a single mean
/// latency. Individual samples are not available, so the reconstructed sum
/// is `average * count` and is only an approximation of the true sum.
#[derive(Debug, Clone, Default)]
pub struct HistogramAccumulator {
    buckets: BTreeMap<Bound, u64>,
    average: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// Ascending `(upper_bound, cumulative_count)` pairs.
    pub buckets: Vec<(f64, u64)>,
    pub count: u64,
    pub sum: f64,
}

impl HistogramAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the raw count for a bucket, replacing any earlier count for
    /// the same upper bound.
    pub fn record_bucket(&mut self, upper_bound: f64, count: u64) {
        self.buckets.insert(Bound(upper_bound), count);
    }

    pub fn record_average(&mut self, average: f64) {
        self.average = average;
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Converts the recorded buckets into a cumulative histogram. Depends
    /// only on the final bucket map, so repeated calls agree.
    pub fn reconstruct(&self) -> HistogramSnapshot {
        let count = self
            .buckets
            .values()
            .fold(0_u64, |total, raw| total.saturating_add(*raw));

        let mut cumulative = 0_u64;
        let buckets = self
            .buckets
            .iter()
            .map(|(bound, raw)| {
                cumulative = cumulative.saturating_add(*raw);
                (bound.0, cumulative)
            })
            .collect();

        let sum = if count == 0 {
            0.0
        } else {
            self.average * count as f64
        };

        HistogramSnapshot {
            buckets,
            count,
            sum,
        }
    }
}

impl From<HistogramSnapshot> for MetricValue {
    fn from(snapshot: HistogramSnapshot) -> Self {
        MetricValue::Histogram {
            buckets: snapshot.buckets,
            count: snapshot.count,
            sum: snapshot.sum,
        }
    }
}

/// Numeric ordering for bucket bounds.
#[derive(Debug, Clone, Copy)]
struct Bound(f64);

impl PartialEq for Bound {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Bound {}

impl PartialOrd for Bound {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Bound {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{HistogramAccumulator, HistogramSnapshot};

    fn accumulator(buckets: &[(f64, u64)]) -> HistogramAccumulator {
        let mut accumulator = HistogramAccumulator::new();
        for (bound, count) in buckets {
            accumulator.record_bucket(*bound, *count);
        }
        accumulator
    }

    #[test]
    fn reconstructs_cumulative_histogram() {
        let mut acc = accumulator(&[(1.0, 2), (2.0, 3)]);
        acc.record_average(0.5);

        assert_eq!(
            acc.reconstruct(),
            HistogramSnapshot {
                buckets: vec![(1.0, 2), (2.0, 5)],
                count: 5,
                sum: 2.5,
            }
        );
    }

    #[test]
    fn empty_accumulator_yields_empty_histogram() {
        let mut acc = HistogramAccumulator::new();
        acc.record_average(0.25);

        let snapshot = acc.reconstruct();
        assert!(snapshot.buckets.is_empty());
        assert_eq!(snapshot.count, 0);
        assert_eq!(snapshot.sum, 0.0);
    }

    #[test]
    fn empty_histogram_sum_stays_zero_for_non_finite_average() {
        for average in [f64::NAN, f64::INFINITY] {
            let mut acc = HistogramAccumulator::new();
            acc.record_average(average);
            assert_eq!(acc.reconstruct().sum, 0.0);
        }
    }

    #[test]
    fn single_bucket_keeps_raw_count() {
        let snapshot = accumulator(&[(0.000001, 9)]).reconstruct();
        assert_eq!(snapshot.buckets, vec![(0.000001, 9)]);
        assert_eq!(snapshot.count, 9);
    }

    #[test]
    fn bounds_sort_numerically_not_lexically() {
        let snapshot = accumulator(&[(10.0, 1), (2.0, 1), (0.5, 1)]).reconstruct();
        let bounds = snapshot
            .buckets
            .iter()
            .map(|(bound, _)| *bound)
            .collect::<Vec<_>>();
        assert_eq!(bounds, vec![0.5, 2.0, 10.0]);
    }

    #[test]
    fn cumulative_counts_never_decrease() {
        let snapshot = accumulator(&[
            (0.000256, 4),
            (0.000001, 0),
            (0.131072, 17),
            (0.016384, 0),
            (1.048576, 3),
            (0.001024, 250),
        ])
        .reconstruct();

        assert!(
            snapshot
                .buckets
                .windows(2)
                .all(|pair| pair[0].0 < pair[1].0 && pair[0].1 <= pair[1].1)
        );
        assert_eq!(snapshot.count, 274);
        assert_eq!(snapshot.buckets.last().map(|(_, count)| *count), Some(274));
    }

    #[test]
    fn duplicate_bound_overwrites_instead_of_summing() {
        let snapshot = accumulator(&[(1.0, 2), (2.0, 3), (1.0, 7)]).reconstruct();
        assert_eq!(snapshot.buckets, vec![(1.0, 7), (2.0, 10)]);
        assert_eq!(snapshot.count, 10);
    }

    #[test]
    fn reconstruction_is_independent_of_insert_order_and_repeatable() {
        let forward = accumulator(&[(1.0, 2), (2.0, 3), (4.0, 1)]);
        let backward = accumulator(&[(4.0, 1), (2.0, 3), (1.0, 2)]);

        assert_eq!(forward.reconstruct(), forward.reconstruct());
        assert_eq!(forward.reconstruct(), backward.reconstruct());
    }

    #[test]
    fn counts_saturate_instead_of_overflowing() {
        let snapshot = accumulator(&[(1.0, u64::MAX), (2.0, 5)]).reconstruct();
        assert_eq!(snapshot.count, u64::MAX);
        assert_eq!(snapshot.buckets, vec![(1.0, u64::MAX), (2.0, u64::MAX)]);
    }
}
