//! ULP Histogram
//!
//! Keys are the exact ULP errors as produced by the metric. They are dyadic
//! rationals of bounded size (clamped), so repeated values compare equal
//! bit-for-bit and no quantisation is applied. `-0.0` is folded into `0.0`.

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Totally ordered histogram key
#[derive(Debug, Clone, Copy)]
pub struct UlpBucket(f64);

impl UlpBucket {
    /// Key for an ULP error
    pub fn new(ulp: f64) -> Self {
        // Fold -0.0 so both zeros land in one bucket
        Self(if ulp == 0.0 { 0.0 } else { ulp })
    }

    /// The ULP value
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for UlpBucket {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for UlpBucket {}

impl PartialOrd for UlpBucket {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UlpBucket {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Mapping ULP error → number of samples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UlpHistogram {
    buckets: BTreeMap<UlpBucket, u64>,
}

impl UlpHistogram {
    /// Empty histogram
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one sample
    #[inline]
    pub fn record(&mut self, ulp: f64) {
        self.record_n(ulp, 1);
    }

    /// Count `n` samples with the same error
    pub fn record_n(&mut self, ulp: f64, n: u64) {
        if n == 0 {
            return;
        }
        *self.buckets.entry(UlpBucket::new(ulp)).or_insert(0) += n;
    }

    /// Pointwise addition
    pub fn merge(&mut self, other: &UlpHistogram) {
        for (&bucket, &count) in &other.buckets {
            *self.buckets.entry(bucket).or_insert(0) += count;
        }
    }

    /// Pointwise addition, consuming both sides; the reduce step of a
    /// parallel fold
    pub fn merged(mut self, other: UlpHistogram) -> UlpHistogram {
        if self.buckets.len() < other.buckets.len() {
            return other.merged(self);
        }
        self.merge(&other);
        self
    }

    /// Total number of samples
    pub fn total(&self) -> u64 {
        self.buckets.values().sum()
    }

    /// Number of distinct ULP values
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// True if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Count for one ULP value
    pub fn get(&self, ulp: f64) -> u64 {
        self.buckets.get(&UlpBucket::new(ulp)).copied().unwrap_or(0)
    }

    /// Largest recorded error
    pub fn max_ulp(&self) -> Option<f64> {
        self.buckets.keys().next_back().map(|b| b.value())
    }

    /// Buckets in ascending ULP order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.buckets.iter(),
        }
    }
}

/// Ascending iterator over `(ulp, count)`
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, UlpBucket, u64>,
}

impl Iterator for Iter<'_> {
    type Item = (f64, u64);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(b, &c)| (b.value(), c))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(b, &c)| (b.value(), c))
    }
}

impl<'a> IntoIterator for &'a UlpHistogram {
    type Item = (f64, u64);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<f64> for UlpHistogram {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut h = UlpHistogram::new();
        for ulp in iter {
            h.record(ulp);
        }
        h
    }
}

impl Extend<f64> for UlpHistogram {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for ulp in iter {
            self.record(ulp);
        }
    }
}

#[derive(Serialize)]
struct BucketRow {
    ulp: f64,
    count: u64,
}

impl Serialize for UlpHistogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for (ulp, count) in self.iter() {
            seq.serialize_element(&BucketRow { ulp, count })?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<f64> {
        // Deterministic spread over a handful of dyadic values
        (0..997u64)
            .map(|i| match (i * 7919) % 11 {
                0..=5 => 0.0,
                6 | 7 => 0.5,
                8 => 1.0,
                9 => 1.5,
                _ => 9.0,
            })
            .collect()
    }

    #[test]
    fn test_record_and_order() {
        let h: UlpHistogram = [1.0, 0.0, 0.5, 1.0, -0.0].into_iter().collect();
        assert_eq!(h.total(), 5);
        assert_eq!(h.get(0.0), 2);
        assert_eq!(h.get(1.0), 2);
        let keys: Vec<f64> = h.iter().map(|(u, _)| u).collect();
        assert_eq!(keys, vec![0.0, 0.5, 1.0]);
        assert_eq!(h.max_ulp(), Some(1.0));
        assert_eq!(UlpHistogram::new().max_ulp(), None);
    }

    #[test]
    fn test_merge_independent_of_partition() {
        let all = samples();
        let whole: UlpHistogram = all.iter().copied().collect();
        for k in [1usize, 2, 3, 7, 16, 997] {
            let chunk = all.len().div_ceil(k);
            let parts: Vec<UlpHistogram> = all
                .chunks(chunk)
                .map(|c| c.iter().copied().collect())
                .collect();
            let forward = parts
                .iter()
                .cloned()
                .fold(UlpHistogram::new(), UlpHistogram::merged);
            let backward = parts
                .iter()
                .rev()
                .cloned()
                .fold(UlpHistogram::new(), UlpHistogram::merged);
            assert_eq!(forward, whole, "k = {k}");
            assert_eq!(backward, whole, "k = {k}");
        }
    }

    #[test]
    fn test_serialize_rows() {
        let h: UlpHistogram = [0.0, 0.5, 0.5].into_iter().collect();
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, r#"[{"ulp":0.0,"count":1},{"ulp":0.5,"count":2}]"#);
    }
}
