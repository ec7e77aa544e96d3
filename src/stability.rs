//! Stability selection of the number of clusters.
//!
//! A cluster count that matches real structure in the data tends to be found
//! again and again, whatever the random initialization. A count that does not
//! forces the algorithm to cut or merge groups somewhat arbitrarily, and the
//! cut changes from run to run.
//!
//! [`StableClustering`] turns this into a score. For every candidate `k` it
//! clusters the data `n_repetitions` times with seeds `random_state + i`,
//! compares every unordered pair of the resulting partitions with an agreement
//! [`Metric`], and keeps the mean. The candidate with the highest mean wins and
//! a fresh model is fitted at that count.
//!
//! ```rust
//! use stablek::{Metric, StableClustering};
//!
//! let data = vec![
//!     vec![0.0, 0.0], vec![0.1, 0.1], vec![0.0, 0.2],
//!     vec![8.0, 8.0], vec![8.1, 8.1], vec![8.0, 8.2],
//! ];
//!
//! let mut est = StableClustering::new(vec![2, 3])
//!     .with_n_repetitions(5)
//!     .with_metric(Metric::AdjustedRand);
//! est.fit(&data).unwrap();
//!
//! assert_eq!(est.scores().len(), 2);
//! assert_eq!(est.best_k(), Some(2));
//! assert_eq!(est.predict(&data).unwrap().len(), data.len());
//! ```

use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::cluster::util;
use crate::cluster::{Algorithm, FittedModel, Predict};
use crate::error::{Error, Result};
use crate::metrics::{mean_pairwise_score, Metric};

/// Mean agreement per candidate cluster count, in evaluation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scores {
    entries: Vec<(usize, f64)>,
}

impl Scores {
    /// Mean score recorded for `k`.
    ///
    /// If `k` was evaluated more than once, the last evaluation is returned.
    pub fn get(&self, k: usize) -> Option<f64> {
        self.entries
            .iter()
            .rev()
            .find(|(candidate, _)| *candidate == k)
            .map(|&(_, score)| score)
    }

    /// `(k, mean score)` pairs in the order the candidates were given.
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Iterate over `(k, mean score)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of evaluated candidates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been evaluated yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
struct Selection {
    best_k: usize,
    model: FittedModel,
}

/// Chooses the number of clusters whose repeated clusterings agree the most.
#[derive(Debug, Clone)]
pub struct StableClustering {
    /// Candidate cluster counts, evaluated in order.
    k_values: Vec<usize>,
    /// Clusterings per candidate.
    n_repetitions: usize,
    algorithm: Algorithm,
    metric: Metric,
    /// Repetition `i` is seeded with `random_state + i`.
    random_state: u64,
    /// Run the repetitions of a candidate on the rayon pool.
    parallel: bool,
    scores: Scores,
    selection: Option<Selection>,
}

impl StableClustering {
    /// Create an estimator over the candidate counts `k_values`.
    ///
    /// Defaults: 10 repetitions, k-means, adjusted Rand index, `random_state = 42`.
    pub fn new(k_values: impl Into<Vec<usize>>) -> Self {
        Self {
            k_values: k_values.into(),
            n_repetitions: 10,
            algorithm: Algorithm::default(),
            metric: Metric::default(),
            random_state: 42,
            parallel: false,
            scores: Scores::default(),
            selection: None,
        }
    }

    /// Create an estimator from algorithm and metric names.
    ///
    /// Unknown names fail here, before any data is seen.
    pub fn from_names(
        k_values: impl Into<Vec<usize>>,
        n_repetitions: usize,
        algorithm: &str,
        metric: &str,
        random_state: u64,
    ) -> Result<Self> {
        Ok(Self::new(k_values)
            .with_n_repetitions(n_repetitions)
            .with_algorithm(algorithm.parse()?)
            .with_metric(metric.parse()?)
            .with_random_state(random_state))
    }

    /// Set the number of clusterings per candidate (at least 2).
    pub fn with_n_repetitions(mut self, n_repetitions: usize) -> Self {
        self.n_repetitions = n_repetitions;
        self
    }

    /// Set the clustering algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the agreement metric.
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Set the base seed.
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = random_state;
        self
    }

    /// Evaluate the repetitions of each candidate in parallel.
    ///
    /// Seeds do not depend on scheduling, so scores are identical to a
    /// sequential run.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Evaluate every candidate and fit the final model at the most stable one.
    ///
    /// Candidates are compared with a strict `>`, so on a tie the candidate that
    /// appears first in `k_values` is kept.
    ///
    /// On error the estimator is left unfitted with an empty score table.
    #[instrument(
        skip(self, data),
        fields(
            n = data.len(),
            n_repetitions = self.n_repetitions,
            algorithm = %self.algorithm,
            metric = %self.metric
        )
    )]
    pub fn fit(&mut self, data: &[Vec<f32>]) -> Result<&mut Self> {
        self.scores = Scores::default();
        self.selection = None;
        self.validate(data)?;

        let mut entries = Vec::with_capacity(self.k_values.len());
        let mut best: Option<(usize, f64)> = None;

        for &k in &self.k_values {
            let score = self.evaluate(data, k)?;
            debug!(k, score, "candidate evaluated");
            entries.push((k, score));

            let improves = match best {
                None => true,
                Some((_, best_score)) => score > best_score,
            };
            if improves {
                best = Some((k, score));
            }
        }

        let (best_k, best_score) = best.ok_or_else(|| {
            Error::InvalidConfiguration("k_values must not be empty".to_string())
        })?;

        let model = self.algorithm.fit(data, best_k, self.random_state)?;
        info!(best_k, best_score, "selected cluster count");

        self.scores = Scores { entries };
        self.selection = Some(Selection { best_k, model });
        Ok(self)
    }

    /// Label `data` with the selected model.
    pub fn predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>> {
        let selection = self.selection.as_ref().ok_or(Error::NotFitted)?;
        selection.model.predict(data)
    }

    /// Fit on `data` and return its labels under the selected model.
    pub fn fit_predict(&mut self, data: &[Vec<f32>]) -> Result<Vec<usize>> {
        self.fit(data)?.predict(data)
    }

    /// Mean agreement per candidate from the last successful fit.
    pub fn scores(&self) -> &Scores {
        &self.scores
    }

    /// Mean agreement recorded for `k`.
    pub fn score_for(&self, k: usize) -> Option<f64> {
        self.scores.get(k)
    }

    /// Selected cluster count, once fitted.
    pub fn best_k(&self) -> Option<usize> {
        self.selection.as_ref().map(|s| s.best_k)
    }

    /// Model refitted at the selected cluster count, once fitted.
    pub fn best_model(&self) -> Option<&FittedModel> {
        self.selection.as_ref().map(|s| &s.model)
    }

    /// Whether `fit` has completed successfully.
    pub fn is_fitted(&self) -> bool {
        self.selection.is_some()
    }

    /// Candidate cluster counts, in evaluation order.
    pub fn k_values(&self) -> &[usize] {
        &self.k_values
    }

    /// Clusterings run per candidate.
    pub fn n_repetitions(&self) -> usize {
        self.n_repetitions
    }

    /// Clustering procedure used for every repetition.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Agreement metric used to compare repetitions.
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Base seed; repetition `i` uses `random_state + i`.
    pub fn random_state(&self) -> u64 {
        self.random_state
    }

    fn validate(&self, data: &[Vec<f32>]) -> Result<()> {
        if self.n_repetitions < 2 {
            return Err(Error::InvalidConfiguration(format!(
                "n_repetitions must be at least 2, got {}",
                self.n_repetitions
            )));
        }
        if self.k_values.is_empty() {
            return Err(Error::InvalidConfiguration(
                "k_values must not be empty".to_string(),
            ));
        }

        util::validate_rows(data)?;
        let n = data.len();
        if let Some(&k) = self.k_values.iter().find(|&&k| k == 0 || k > n) {
            return Err(Error::InvalidConfiguration(format!(
                "cluster count {k} is outside [1, {n}]"
            )));
        }
        Ok(())
    }

    /// Mean pairwise agreement of `n_repetitions` clusterings at `k`.
    #[instrument(level = "debug", skip(self, data))]
    fn evaluate(&self, data: &[Vec<f32>], k: usize) -> Result<f64> {
        let algorithm = self.algorithm;
        let seeds: Vec<u64> = (0..self.n_repetitions as u64)
            .map(|i| self.random_state.wrapping_add(i))
            .collect();

        let partitions: Vec<Vec<usize>> = if self.parallel {
            seeds
                .into_par_iter()
                .map(|seed| algorithm.fit_predict(data, k, seed))
                .collect::<Result<_>>()?
        } else {
            seeds
                .into_iter()
                .map(|seed| algorithm.fit_predict(data, k, seed))
                .collect::<Result<_>>()?
        };

        mean_pairwise_score(&partitions, self.metric)
    }
}
