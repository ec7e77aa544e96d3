//! K-means: centroid-based hard clustering.
//!
//! # The Algorithm (Lloyd, 1982; Arthur & Vassilvitskii, 2007)
//!
//! 1. **Seeding (k-means++)**: pick the first centroid uniformly at random, then
//!    each further centroid with probability proportional to the squared
//!    distance to the nearest centroid chosen so far.
//! 2. **Assignment**: label every point with its nearest centroid.
//! 3. **Update**: move each centroid to the mean of its points.
//! 4. Repeat 2–3 until no label changes, the total squared centroid shift
//!    drops to `tol` times the mean per-feature variance of the data, or
//!    `max_iter` is reached.
//!
//! A cluster that loses all of its points is re-seeded with the point that is
//! farthest from its current centroid.
//!
//! ## Determinism
//!
//! With a seed set (`with_seed`), seeding is driven by a `StdRng` and the
//! whole fit is reproducible. Different seeds give different, independently
//! initialized runs, which is what stability selection relies on.
//!
//! ## Complexity
//!
//! - **Time**: O(n · k · d) per iteration.
//! - **Space**: O(k · d) for centroids plus O(n) for labels.

use rand::prelude::*;
use tracing::{debug, trace};

use super::traits::{Clustering, Predict};
use super::util::{self, nearest};
use crate::error::{Error, Result};

/// K-means clustering configuration.
#[derive(Debug, Clone)]
pub struct Kmeans {
    /// Number of clusters.
    k: usize,
    /// Maximum Lloyd iterations.
    max_iter: usize,
    /// Convergence threshold on the total squared centroid shift, relative to
    /// the mean per-feature variance of the data.
    tol: f32,
    /// Seed for k-means++ seeding; entropy when unset.
    seed: Option<u64>,
}

/// A fitted k-means model.
#[derive(Debug, Clone)]
pub struct KmeansFit {
    centroids: Vec<Vec<f32>>,
    labels: Vec<usize>,
    inertia: f32,
    iterations: usize,
}

impl Kmeans {
    /// Create a k-means clusterer for `k` clusters.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 100,
            tol: 1e-4,
            seed: None,
        }
    }

    /// Set the maximum number of Lloyd iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance.
    ///
    /// The threshold is scaled by the data's mean per-feature variance, so it
    /// does not depend on the units of the features.
    pub fn with_tol(mut self, tol: f32) -> Self {
        self.tol = tol;
        self
    }

    /// Fix the random seed used for k-means++ seeding.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fit the model and keep the centroids for later prediction.
    pub fn fit(&self, data: &[Vec<f32>]) -> Result<KmeansFit> {
        let dim = util::validate_rows(data)?;
        let n = data.len();

        if self.k == 0 || self.k > n {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: n,
            });
        }
        if self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iter",
                message: "must be at least 1",
            });
        }
        if self.tol.is_nan() || self.tol < 0.0 {
            return Err(Error::InvalidParameter {
                name: "tol",
                message: "must be non-negative",
            });
        }

        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };

        let tol = scaled_tolerance(data, dim, self.tol);
        let mut centroids = kmeans_plus_plus(data, self.k, rng.as_mut());
        let mut labels = vec![0usize; n];
        let mut dists = vec![0f32; n];
        assign(data, &centroids, &mut labels, &mut dists);

        let mut iterations = 0;
        for _ in 0..self.max_iter {
            iterations += 1;

            let updated = self.update(data, dim, &labels, &mut dists);
            let shift: f32 = centroids
                .iter()
                .zip(updated.iter())
                .map(|(a, b)| util::squared_euclidean(a, b))
                .sum();
            centroids = updated;

            let changed = assign(data, &centroids, &mut labels, &mut dists);
            trace!(iteration = iterations, changed, shift, "lloyd step");

            if changed == 0 || shift <= tol {
                break;
            }
        }

        let inertia: f32 = dists.iter().sum();
        debug!(k = self.k, iterations, inertia, "k-means fit complete");

        Ok(KmeansFit {
            centroids,
            labels,
            inertia,
            iterations,
        })
    }

    /// Recompute centroids as cluster means; empty clusters take the farthest point.
    fn update(
        &self,
        data: &[Vec<f32>],
        dim: usize,
        labels: &[usize],
        dists: &mut [f32],
    ) -> Vec<Vec<f32>> {
        let mut sums = vec![vec![0f32; dim]; self.k];
        let mut counts = vec![0usize; self.k];

        for (point, &label) in data.iter().zip(labels.iter()) {
            counts[label] += 1;
            for (s, x) in sums[label].iter_mut().zip(point.iter()) {
                *s += x;
            }
        }

        for (c, sum) in sums.iter_mut().enumerate() {
            if counts[c] > 0 {
                let inv = 1.0 / counts[c] as f32;
                for s in sum.iter_mut() {
                    *s *= inv;
                }
                continue;
            }

            // Empty cluster: steal the worst-fitting point.
            let farthest = dists
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(i, _)| i);
            if let Some(i) = farthest {
                sum.copy_from_slice(&data[i]);
                dists[i] = 0.0;
            }
        }

        sums
    }
}

impl Clustering for Kmeans {
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>> {
        Ok(self.fit(data)?.labels)
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}

impl KmeansFit {
    /// Cluster centers, one row per cluster.
    pub fn centroids(&self) -> &[Vec<f32>] {
        &self.centroids
    }

    /// Labels assigned to the training points.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Sum of squared distances from each training point to its centroid.
    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    /// Number of Lloyd iterations run.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Number of clusters.
    pub fn n_clusters(&self) -> usize {
        self.centroids.len()
    }

    /// Assign each point to its nearest centroid.
    pub fn predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>> {
        let dim = util::validate_rows(data)?;
        let expected = self.centroids.first().map_or(0, Vec::len);
        if dim != expected {
            return Err(Error::DimensionMismatch {
                expected,
                found: dim,
            });
        }
        Ok(data.iter().map(|p| nearest(p, &self.centroids).0).collect())
    }
}

impl Predict for KmeansFit {
    fn predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>> {
        KmeansFit::predict(self, data)
    }
}

/// Assign every point to its nearest centroid; returns how many labels changed.
fn assign(
    data: &[Vec<f32>],
    centroids: &[Vec<f32>],
    labels: &mut [usize],
    dists: &mut [f32],
) -> usize {
    let mut changed = 0;
    for (i, point) in data.iter().enumerate() {
        let (c, d) = nearest(point, centroids);
        if labels[i] != c {
            changed += 1;
            labels[i] = c;
        }
        dists[i] = d;
    }
    changed
}

/// `tol` times the mean over features of the per-feature (population) variance.
fn scaled_tolerance(data: &[Vec<f32>], dim: usize, tol: f32) -> f32 {
    let n = data.len() as f64;
    let mut mean = vec![0f64; dim];
    for point in data {
        for (m, &x) in mean.iter_mut().zip(point.iter()) {
            *m += x as f64;
        }
    }
    for m in mean.iter_mut() {
        *m /= n;
    }

    let mut var_sum = 0f64;
    for point in data {
        for (m, &x) in mean.iter().zip(point.iter()) {
            let d = x as f64 - m;
            var_sum += d * d;
        }
    }
    let mean_var = var_sum / (n * dim as f64);
    (tol as f64 * mean_var) as f32
}

/// k-means++ seeding. Requires `1 <= k <= data.len()`.
fn kmeans_plus_plus(data: &[Vec<f32>], k: usize, rng: &mut dyn RngCore) -> Vec<Vec<f32>> {
    let n = data.len();
    let mut centroids: Vec<Vec<f32>> = Vec::with_capacity(k);
    centroids.push(data[rng.random_range(0..n)].clone());

    // Squared distance from each point to its closest chosen centroid.
    let mut closest: Vec<f64> = data
        .iter()
        .map(|p| util::squared_euclidean(p, &centroids[0]) as f64)
        .collect();

    while centroids.len() < k {
        let total: f64 = closest.iter().sum();
        let next = if total > 0.0 {
            let threshold = rng.random::<f64>() * total;
            let mut cumsum = 0.0;
            let mut selected = n - 1;
            for (i, &d) in closest.iter().enumerate() {
                cumsum += d;
                if cumsum > threshold {
                    selected = i;
                    break;
                }
            }
            selected
        } else {
            // Every point coincides with a chosen centroid.
            rng.random_range(0..n)
        };

        let centroid = data[next].clone();
        for (d, p) in closest.iter_mut().zip(data.iter()) {
            let nd = util::squared_euclidean(p, &centroid) as f64;
            if nd < *d {
                *d = nd;
            }
        }
        centroids.push(centroid);
    }

    centroids
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    fn three_groups() -> Vec<Vec<f32>> {
        vec![
            vec![0.0, 0.0],
            vec![0.1, 0.2],
            vec![0.2, 0.1],
            vec![5.0, 5.0],
            vec![5.1, 4.9],
            vec![4.9, 5.1],
            vec![10.0, 0.0],
            vec![10.1, 0.1],
            vec![9.9, -0.1],
        ]
    }

    #[test]
    fn test_kmeans_three_groups() {
        let data = three_groups();
        let model = Kmeans::new(3).with_seed(42);
        assert_eq!(model.n_clusters(), 3);
        let labels = model.fit_predict(&data).unwrap();

        assert_eq!(labels.len(), data.len());
        for g in 0..3 {
            let base = labels[g * 3];
            assert_eq!(labels[g * 3 + 1], base);
            assert_eq!(labels[g * 3 + 2], base);
        }
        assert_ne!(labels[0], labels[3]);
        assert_ne!(labels[0], labels[6]);
        assert_ne!(labels[3], labels[6]);
    }

    #[test]
    fn test_kmeans_seed_is_reproducible() {
        let data = three_groups();
        let a = Kmeans::new(4).with_seed(7).fit(&data).unwrap();
        let b = Kmeans::new(4).with_seed(7).fit(&data).unwrap();
        assert_eq!(a.labels(), b.labels());
        assert_eq!(a.centroids(), b.centroids());
        assert_eq!(a.inertia().to_bits(), b.inertia().to_bits());
    }

    #[test]
    fn test_kmeans_predict_matches_training_labels() {
        let data = three_groups();
        let fit = Kmeans::new(3).with_seed(1).fit(&data).unwrap();
        assert_eq!(fit.predict(&data).unwrap(), fit.labels());
        assert!(fit.iterations() >= 1);

        let new_points = vec![vec![0.05, 0.05], vec![9.8, 0.2]];
        let predicted = fit.predict(&new_points).unwrap();
        assert_eq!(predicted[0], fit.labels()[0]);
        assert_eq!(predicted[1], fit.labels()[6]);
    }

    #[test]
    fn test_kmeans_predict_dimension_mismatch() {
        let fit = Kmeans::new(2).with_seed(1).fit(&three_groups()).unwrap();
        let result = fit.predict(&[vec![1.0, 2.0, 3.0]]);
        assert!(matches!(
            result,
            Err(Error::DimensionMismatch {
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn test_kmeans_k_equals_n() {
        let data = vec![vec![0.0], vec![1.0], vec![2.0]];
        let fit = Kmeans::new(3).with_seed(3).fit(&data).unwrap();
        let mut labels = fit.labels().to_vec();
        labels.sort_unstable();
        assert_eq!(labels, vec![0, 1, 2]);
        assert!(fit.inertia() < 1e-6);
    }

    #[test]
    fn test_kmeans_duplicate_points() {
        let data = vec![vec![1.0, 1.0]; 5];
        let fit = Kmeans::new(2).with_seed(0).fit(&data).unwrap();
        assert_eq!(fit.labels().len(), 5);
        assert!(fit.labels().iter().all(|&l| l < 2));
    }

    #[test]
    fn test_kmeans_invalid_cluster_count() {
        let data = three_groups();
        assert!(matches!(
            Kmeans::new(0).fit(&data),
            Err(Error::InvalidClusterCount { requested: 0, .. })
        ));
        assert!(matches!(
            Kmeans::new(10).fit(&data),
            Err(Error::InvalidClusterCount {
                requested: 10,
                n_items: 9
            })
        ));
    }

    fn uniform_points(n: usize, seed: u64) -> Vec<Vec<f32>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| vec![rng.random::<f32>(), rng.random::<f32>()])
            .collect()
    }

    #[test]
    fn test_kmeans_invariant_to_feature_scale() {
        // Scaling by a power of two is exact, so both fits must take identical steps.
        let scale = 1.0 / 1024.0;
        let data = uniform_points(300, 9);
        let scaled: Vec<Vec<f32>> = data
            .iter()
            .map(|p| p.iter().map(|x| x * scale).collect())
            .collect();

        for seed in 0..10 {
            let a = Kmeans::new(5).with_seed(seed).fit(&data).unwrap();
            let b = Kmeans::new(5).with_seed(seed).fit(&scaled).unwrap();
            assert_eq!(a.labels(), b.labels(), "seed {seed}");
            assert_eq!(a.iterations(), b.iterations(), "seed {seed}");
        }
    }

    #[test]
    fn test_kmeans_small_scale_still_iterates() {
        let data: Vec<Vec<f32>> = uniform_points(300, 10)
            .into_iter()
            .map(|p| p.into_iter().map(|x| x * 1e-3).collect())
            .collect();
        let fit = Kmeans::new(5).with_seed(0).fit(&data).unwrap();
        assert!(fit.iterations() > 1);
    }

    #[test]
    fn test_scaled_tolerance() {
        // Feature variances 1 and 4: mean variance 2.5.
        let data = vec![vec![-1.0, -2.0], vec![1.0, 2.0]];
        let tol = scaled_tolerance(&data, 2, 1e-4);
        assert!((tol - 2.5e-4).abs() < 1e-9);
    }

    #[test]
    fn test_kmeans_empty() {
        let data: Vec<Vec<f32>> = vec![];
        assert!(matches!(Kmeans::new(1).fit(&data), Err(Error::EmptyInput)));
    }

    #[test]
    fn test_kmeans_invalid_params() {
        let data = three_groups();
        assert!(Kmeans::new(2).with_max_iter(0).fit(&data).is_err());
        assert!(Kmeans::new(2).with_tol(-1.0).fit(&data).is_err());
    }
}
