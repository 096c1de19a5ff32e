//! Depth histograms and the summary statistics computed over them.
//!
//! A [`DepthHistogram`] maps a depth value to the number of bases observed at that
//! depth. It is built transiently for one query region and never persisted, so all
//! statistics below are pure functions of the histogram.

use std::collections::BTreeMap;
use std::collections::btree_map;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepthHistogram {
    buckets: BTreeMap<u32, u64>,
}

impl DepthHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `bases` positions at `depth`. Zero-base additions leave no bucket behind.
    pub fn add(&mut self, depth: u32, bases: u64) {
        if bases > 0 {
            *self.buckets.entry(depth).or_insert(0) += bases;
        }
    }

    /// Fold another histogram into this one.
    pub fn merge(&mut self, other: &DepthHistogram) {
        for (&depth, &bases) in other.iter() {
            self.add(depth, bases);
        }
    }

    pub fn count(&self, depth: u32) -> u64 {
        self.buckets.get(&depth).copied().unwrap_or(0)
    }

    pub fn total_bases(&self) -> u64 {
        self.buckets.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of distinct depth values.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Buckets in ascending depth order.
    pub fn iter(&self) -> btree_map::Iter<'_, u32, u64> {
        self.buckets.iter()
    }

    ///
    /// Base-weighted mean depth: `sum(depth * bases) / sum(bases)`.
    ///
    /// An empty histogram yields `NaN`.
    ///
    pub fn mean(&self) -> f64 {
        let (total, count) = self
            .buckets
            .iter()
            .fold((0u128, 0u64), |(total, count), (&depth, &bases)| {
                (total + depth as u128 * bases as u128, count + bases)
            });
        total as f64 / count as f64
    }

    ///
    /// Fraction of bases with non-zero depth.
    ///
    /// A histogram without a zero bucket is fully covered and returns `1.0`.
    ///
    pub fn coverage_fraction(&self) -> f64 {
        let Some(&zero) = self.buckets.get(&0) else {
            return 1.0;
        };
        let count = self.total_bases();
        (count - zero) as f64 / count as f64
    }

    ///
    /// Depth at the given percentile.
    ///
    /// The rank is `(total + 1) * p / 100`. Walking buckets in ascending depth, the
    /// bucket where the cumulative count first reaches the integer part of the rank
    /// answers; when the rank falls exactly on that bucket's last base, the result is
    /// interpolated toward the next bucket's depth by the fractional part.
    ///
    pub fn percentile(&self, percentile: u32) -> f64 {
        let size = self.total_bases();
        let rank = (size + 1) as f64 * percentile as f64 / 100.0;
        let index = rank.floor() as u64;
        let frac = rank - index as f64;

        let mut count = 0u64;
        let mut buckets = self.buckets.iter().peekable();
        while let Some((&depth, &bases)) = buckets.next() {
            count += bases;
            if count >= index {
                if count > index || frac == 0.0 {
                    return depth as f64;
                }
                let next = buckets.peek().map(|&(&d, _)| d).unwrap_or(depth);
                return depth as f64 * (1.0 - frac) + next as f64 * frac;
            }
        }
        f64::NAN
    }

    ///
    /// Mean depth of the central `center_percent` of bases.
    ///
    /// `skip = floor(total * (100 - center) / 200)` bases are discarded from each tail of
    /// the depth-sorted base distribution. A bucket straddling a boundary only
    /// contributes the bases inside the retained window.
    ///
    pub fn trimmed_mean(&self, center_percent: u32) -> f64 {
        let center = center_percent.min(100) as f64;
        let size = self.total_bases();
        let skip = (size as f64 * ((100.0 - center) / 2.0) / 100.0).floor() as u64;
        let upper = size - skip;

        let mut total = 0u128;
        let mut count = 0u64;
        for (&depth, &bases) in self.buckets.iter() {
            let depth_wide = depth as u128;
            if count + bases > upper {
                if count > skip {
                    total += depth_wide * (upper - count) as u128;
                } else {
                    // the whole retained window sits inside this bucket
                    return depth as f64;
                }
                break;
            }
            if count > skip {
                total += depth_wide * bases as u128;
            } else if count + bases > skip {
                total += depth_wide * (count + bases - skip) as u128;
            }
            count += bases;
        }
        total as f64 / (size - 2 * skip) as f64
    }
}

impl FromIterator<(u32, u64)> for DepthHistogram {
    fn from_iter<T: IntoIterator<Item = (u32, u64)>>(iter: T) -> Self {
        let mut hist = DepthHistogram::new();
        for (depth, bases) in iter {
            hist.add(depth, bases);
        }
        hist
    }
}

impl<'a> IntoIterator for &'a DepthHistogram {
    type Item = (&'a u32, &'a u64);
    type IntoIter = btree_map::Iter<'a, u32, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}
