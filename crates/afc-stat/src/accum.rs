//! Frequency and profile accumulators.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Frequency accumulator: events counted per multiplicity bin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountAccumulator {
    bins: BTreeMap<u32, u64>,
}

impl CountAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the count of the given bin.
    pub fn fill(&mut self, bin: u32) {
        *self.bins.entry(bin).or_insert(0) += 1;
    }

    /// Returns the count recorded for a bin.
    pub fn count(&self, bin: u32) -> u64 {
        self.bins.get(&bin).copied().unwrap_or(0)
    }

    /// Returns the total count over all bins.
    pub fn total(&self) -> u64 {
        self.bins.values().sum()
    }

    /// Iterates over the occupied bins in ascending order.
    pub fn bins(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.bins.iter().map(|(&bin, &count)| (bin, count))
    }

    /// Adds the counts of another accumulator into this one.
    pub fn merge(&mut self, other: &CountAccumulator) {
        for (&bin, &count) in &other.bins {
            *self.bins.entry(bin).or_insert(0) += count;
        }
    }
}

/// Running statistics of a single profile bin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileBin {
    /// Number of values recorded in the bin.
    pub entries: u64,
    /// Sum of the recorded values.
    pub sum: f64,
    /// Sum of the squared recorded values.
    pub sum_sq: f64,
}

impl ProfileBin {
    fn fill(&mut self, value: f64) {
        self.entries += 1;
        self.sum += value;
        self.sum_sq += value * value;
    }

    /// Returns the mean of the recorded values, if any.
    pub fn mean(&self) -> Option<f64> {
        if self.entries == 0 {
            return None;
        }
        Some(self.sum / self.entries as f64)
    }

    /// Returns the population variance of the recorded values, if any.
    pub fn variance(&self) -> Option<f64> {
        if self.entries == 0 {
            return None;
        }
        let n = self.entries as f64;
        let mean = self.sum / n;
        Some((self.sum_sq / n - mean * mean).max(0.0))
    }

    fn merge(&mut self, other: &ProfileBin) {
        self.entries += other.entries;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
    }
}

/// Profile accumulator: running mean and variance of a per-event scalar,
/// keyed by multiplicity bin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileAccumulator {
    bins: BTreeMap<u32, ProfileBin>,
}

impl ProfileAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a value into the given bin.
    pub fn fill(&mut self, bin: u32, value: f64) {
        self.bins.entry(bin).or_default().fill(value);
    }

    /// Returns the mean of a bin, if the bin holds entries.
    pub fn mean(&self, bin: u32) -> Option<f64> {
        self.bins.get(&bin).and_then(ProfileBin::mean)
    }

    /// Returns the population variance of a bin, if the bin holds entries.
    pub fn variance(&self, bin: u32) -> Option<f64> {
        self.bins.get(&bin).and_then(ProfileBin::variance)
    }

    /// Returns the number of entries recorded in a bin.
    pub fn entries(&self, bin: u32) -> u64 {
        self.bins.get(&bin).map_or(0, |b| b.entries)
    }

    /// Returns the total number of entries over all bins.
    pub fn total_entries(&self) -> u64 {
        self.bins.values().map(|b| b.entries).sum()
    }

    /// Iterates over the occupied bins in ascending order.
    pub fn bins(&self) -> impl Iterator<Item = (u32, &ProfileBin)> + '_ {
        self.bins.iter().map(|(&bin, stats)| (bin, stats))
    }

    /// Combines another accumulator into this one by weighted recombination.
    ///
    /// The operation is associative and order-insensitive up to
    /// floating-point rounding, which makes it safe for combining worker
    /// partials in any order.
    pub fn merge(&mut self, other: &ProfileAccumulator) {
        for (&bin, stats) in &other.bins {
            self.bins.entry(bin).or_default().merge(stats);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn count_fill_and_total() {
        let mut acc = CountAccumulator::new();
        acc.fill(12);
        acc.fill(12);
        acc.fill(40);
        assert_eq!(acc.count(12), 2);
        assert_eq!(acc.count(7), 0);
        assert_eq!(acc.total(), 3);
    }

    #[test]
    fn profile_mean_and_variance() {
        let mut acc = ProfileAccumulator::new();
        acc.fill(5, 1.0);
        acc.fill(5, 3.0);
        assert!((acc.mean(5).unwrap() - 2.0).abs() < TOL);
        assert!((acc.variance(5).unwrap() - 1.0).abs() < TOL);
        assert_eq!(acc.entries(5), 2);
        assert!(acc.mean(6).is_none());
    }

    #[test]
    fn profile_merge_matches_sequential_fill() {
        let values = [0.5, -1.25, 2.0, 0.125, 3.5];
        let mut sequential = ProfileAccumulator::new();
        let mut left = ProfileAccumulator::new();
        let mut right = ProfileAccumulator::new();
        for (idx, &value) in values.iter().enumerate() {
            sequential.fill(9, value);
            if idx % 2 == 0 {
                left.fill(9, value);
            } else {
                right.fill(9, value);
            }
        }
        left.merge(&right);
        assert_eq!(sequential, left);
    }

    #[test]
    fn profile_serde_roundtrip() {
        let mut acc = ProfileAccumulator::new();
        acc.fill(4, 0.75);
        acc.fill(7, -1.5);
        let json = serde_json::to_string(&acc).expect("encode");
        let back: ProfileAccumulator = serde_json::from_str(&json).expect("decode");
        assert_eq!(acc, back);
    }

    #[test]
    fn count_merge_sums_bins() {
        let mut a = CountAccumulator::new();
        let mut b = CountAccumulator::new();
        a.fill(3);
        b.fill(3);
        b.fill(4);
        a.merge(&b);
        assert_eq!(a.count(3), 2);
        assert_eq!(a.count(4), 1);
    }
}
