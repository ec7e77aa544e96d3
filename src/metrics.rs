//! Pair-counting agreement between two partitions of the same points.
//!
//! Both metrics look only at *which points are grouped together*, never at the
//! label values themselves, so relabeling a partition does not change a score.
//!
//! ## Pair confusion
//!
//! Every ordered pair of distinct points `(i, j)` falls into one of four
//! buckets:
//!
//! | | same in `b` | different in `b` |
//! |---|---|---|
//! | **same in `a`** | `tp` | `fn_` |
//! | **different in `a`** | `fp` | `tn` |
//!
//! The counts are computed from the contingency table in O(n + r·c) rather
//! than by enumerating the O(n²) pairs.
//!
//! ## Rand index
//!
//! `RI = (tp + tn) / (tp + tn + fp + fn)`: the fraction of pairs on which the
//! two partitions agree. Two independent random partitions still score well
//! above zero.
//!
//! ## Adjusted Rand index (Hubert & Arabie, 1985)
//!
//! ```text
//! ARI = 2 (tp·tn − fn·fp) / ((tp + fn)(fn + tn) + (tp + fp)(fp + tn))
//! ```
//!
//! Corrected for chance: 1 for identical groupings, 0 in expectation for
//! independent random partitions, and negative for worse-than-chance
//! agreement.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Counts of ordered point pairs by co-membership in two partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairConfusion {
    /// Pairs split in both partitions.
    pub tn: u64,
    /// Pairs split in `a` but together in `b`.
    pub fp: u64,
    /// Pairs together in `a` but split in `b`.
    pub fn_: u64,
    /// Pairs together in both partitions.
    pub tp: u64,
}

impl PairConfusion {
    /// Total number of ordered pairs, `n · (n − 1)`.
    pub fn total(&self) -> u64 {
        self.tn + self.fp + self.fn_ + self.tp
    }
}

/// Pair confusion matrix of two label vectors.
pub fn pair_confusion_matrix(a: &[usize], b: &[usize]) -> Result<PairConfusion> {
    if a.len() != b.len() {
        return Err(Error::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let n = a.len() as u64;
    let mut cells: HashMap<(usize, usize), u64> = HashMap::new();
    let mut rows: HashMap<usize, u64> = HashMap::new();
    let mut cols: HashMap<usize, u64> = HashMap::new();
    for (&la, &lb) in a.iter().zip(b.iter()) {
        *cells.entry((la, lb)).or_insert(0) += 1;
        *rows.entry(la).or_insert(0) += 1;
        *cols.entry(lb).or_insert(0) += 1;
    }

    let sum_squares: u64 = cells.values().map(|&c| c * c).sum();
    let sum_rows: u64 = rows.values().map(|&c| c * c).sum();
    let sum_cols: u64 = cols.values().map(|&c| c * c).sum();

    // Pairs together in `a` = Σ rows², minus the n self-pairs; same for `b`.
    let tp = sum_squares - n;
    let fn_ = sum_rows - sum_squares;
    let fp = sum_cols - sum_squares;
    let tn = n * n - n - tp - fn_ - fp;

    Ok(PairConfusion { tn, fp, fn_, tp })
}

/// Rand index of two partitions, in `[0, 1]`.
///
/// Partitions of zero or one point, and partitions that agree on every pair,
/// score exactly 1.
pub fn rand_score(a: &[usize], b: &[usize]) -> Result<f64> {
    let c = pair_confusion_matrix(a, b)?;
    let agree = c.tp + c.tn;
    let total = c.total();
    if total == 0 || agree == total {
        return Ok(1.0);
    }
    Ok(agree as f64 / total as f64)
}

/// Adjusted Rand index of two partitions.
///
/// Returns 1 whenever the two partitions induce the same grouping (including
/// the degenerate all-in-one and all-singletons cases).
pub fn adjusted_rand_score(a: &[usize], b: &[usize]) -> Result<f64> {
    let c = pair_confusion_matrix(a, b)?;
    if c.fn_ == 0 && c.fp == 0 {
        return Ok(1.0);
    }

    let (tn, fp, fn_, tp) = (c.tn as f64, c.fp as f64, c.fn_ as f64, c.tp as f64);
    Ok(2.0 * (tp * tn - fn_ * fp) / ((tp + fn_) * (fn_ + tn) + (tp + fp) * (fp + tn)))
}

/// Agreement metric used to compare repeated clusterings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Metric {
    /// Plain Rand index.
    Rand,
    /// Chance-adjusted Rand index.
    #[default]
    AdjustedRand,
}

impl Metric {
    /// Score the agreement of two partitions of the same points.
    pub fn score(self, a: &[usize], b: &[usize]) -> Result<f64> {
        match self {
            Metric::Rand => rand_score(a, b),
            Metric::AdjustedRand => adjusted_rand_score(a, b),
        }
    }

    /// Canonical name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Metric::Rand => "rand",
            Metric::AdjustedRand => "adjusted_rand",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rand" | "ri" => Ok(Metric::Rand),
            "adjusted_rand" | "ari" => Ok(Metric::AdjustedRand),
            other => Err(Error::InvalidMetric(other.to_string())),
        }
    }
}

/// Mean score over all unordered pairs `i < j` of `partitions`.
///
/// Needs at least two partitions; there is nothing to compare otherwise.
pub fn mean_pairwise_score(partitions: &[Vec<usize>], metric: Metric) -> Result<f64> {
    let r = partitions.len();
    if r < 2 {
        return Err(Error::InvalidConfiguration(format!(
            "need at least 2 partitions to compare, got {r}"
        )));
    }

    let mut total = 0.0;
    let mut pairs = 0usize;
    for i in 0..r {
        for j in (i + 1)..r {
            total += metric.score(&partitions[i], &partitions[j])?;
            pairs += 1;
        }
    }
    Ok(total / pairs as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_confusion_small() {
        // a: {0,1}{2}  b: {0}{1,2}
        let c = pair_confusion_matrix(&[0, 0, 1], &[0, 1, 1]).unwrap();
        assert_eq!(c, PairConfusion { tn: 2, fp: 2, fn_: 2, tp: 0 });
        assert_eq!(c.total(), 6);
    }

    #[test]
    fn test_identical_up_to_relabeling() {
        let a = [0, 0, 1, 1, 2, 2];
        let b = [5, 5, 3, 3, 9, 9];
        assert_eq!(rand_score(&a, &b).unwrap(), 1.0);
        assert_eq!(adjusted_rand_score(&a, &b).unwrap(), 1.0);
    }

    #[test]
    fn test_known_values() {
        // sklearn: rand_score([0,0,1,2], [0,0,1,1]) == 0.8333...
        let ri = rand_score(&[0, 0, 1, 2], &[0, 0, 1, 1]).unwrap();
        assert!((ri - 5.0 / 6.0).abs() < 1e-12);

        // sklearn: adjusted_rand_score([0,0,1,2], [0,0,1,1]) == 0.5714...
        let ari = adjusted_rand_score(&[0, 0, 1, 2], &[0, 0, 1, 1]).unwrap();
        assert!((ari - 4.0 / 7.0).abs() < 1e-12);

        // sklearn: adjusted_rand_score([0,0,1,1], [0,1,0,1]) == -0.5
        let ari = adjusted_rand_score(&[0, 0, 1, 1], &[0, 1, 0, 1]).unwrap();
        assert!((ari + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_partitions() {
        assert_eq!(rand_score(&[], &[]).unwrap(), 1.0);
        assert_eq!(adjusted_rand_score(&[], &[]).unwrap(), 1.0);
        assert_eq!(rand_score(&[3], &[1]).unwrap(), 1.0);

        // All singletons vs all singletons.
        assert_eq!(adjusted_rand_score(&[0, 1, 2, 3], &[3, 2, 1, 0]).unwrap(), 1.0);
        // One cluster vs all singletons: no pair agrees on "together".
        assert_eq!(adjusted_rand_score(&[0, 0, 0, 0], &[0, 1, 2, 3]).unwrap(), 0.0);
        assert_eq!(rand_score(&[0, 0, 0, 0], &[0, 1, 2, 3]).unwrap(), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let a = [0, 1, 1, 2, 0, 2, 2];
        let b = [1, 1, 0, 0, 1, 2, 0];
        for metric in [Metric::Rand, Metric::AdjustedRand] {
            let ab = metric.score(&a, &b).unwrap();
            let ba = metric.score(&b, &a).unwrap();
            assert!((ab - ba).abs() < 1e-12, "{metric} not symmetric");
        }
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            rand_score(&[0, 1], &[0]),
            Err(Error::LengthMismatch { left: 2, right: 1 })
        ));
        assert!(adjusted_rand_score(&[0], &[0, 1]).is_err());
    }

    #[test]
    fn test_metric_names() {
        assert_eq!("rand".parse::<Metric>().unwrap(), Metric::Rand);
        assert_eq!("adjusted_rand".parse::<Metric>().unwrap(), Metric::AdjustedRand);
        assert_eq!(
            Metric::AdjustedRand.to_string().parse::<Metric>().unwrap(),
            Metric::AdjustedRand
        );
        assert!(matches!(
            "bogus".parse::<Metric>(),
            Err(Error::InvalidMetric(name)) if name == "bogus"
        ));
        assert_eq!(Metric::default(), Metric::AdjustedRand);
    }

    #[test]
    fn test_mean_pairwise_score() {
        let parts = vec![vec![0, 0, 1, 1], vec![1, 1, 0, 0], vec![0, 1, 0, 1]];
        // Pairs: (0,1) -> 1.0, (0,2) -> -0.5, (1,2) -> -0.5
        let mean = mean_pairwise_score(&parts, Metric::AdjustedRand).unwrap();
        assert!(mean.abs() < 1e-12);

        let identical = vec![vec![0, 1, 2]; 4];
        assert_eq!(mean_pairwise_score(&identical, Metric::Rand).unwrap(), 1.0);
    }

    #[test]
    fn test_mean_pairwise_needs_two() {
        let one = vec![vec![0, 1]];
        assert!(matches!(
            mean_pairwise_score(&one, Metric::Rand),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(mean_pairwise_score(&[], Metric::Rand).is_err());
    }
}
