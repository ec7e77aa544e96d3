use std::fmt;
use std::str::FromStr;

use super::kmeans::{Kmeans, KmeansFit};
use super::traits::{Clustering, Predict};
use crate::error::{Error, Result};

/// Partitioning procedures that can be driven with a cluster count and a seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    /// k-means with k-means++ seeding.
    #[default]
    KMeans,
}

/// A model fitted by one of the [`Algorithm`] variants.
#[derive(Debug, Clone)]
pub enum FittedModel {
    /// Fitted k-means centroids.
    KMeans(KmeansFit),
}

impl Algorithm {
    /// Partition `data` into `k` clusters using `seed` for initialization.
    pub fn fit_predict(self, data: &[Vec<f32>], k: usize, seed: u64) -> Result<Vec<usize>> {
        match self {
            Algorithm::KMeans => Kmeans::new(k).with_seed(seed).fit_predict(data),
        }
    }

    /// Fit a model that can later label unseen points.
    pub fn fit(self, data: &[Vec<f32>], k: usize, seed: u64) -> Result<FittedModel> {
        match self {
            Algorithm::KMeans => Ok(FittedModel::KMeans(Kmeans::new(k).with_seed(seed).fit(data)?)),
        }
    }

    /// Canonical name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::KMeans => "k-means",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "k-means" | "kmeans" => Ok(Algorithm::KMeans),
            other => Err(Error::InvalidAlgorithm(other.to_string())),
        }
    }
}

impl FittedModel {
    /// Number of clusters the model assigns to.
    pub fn n_clusters(&self) -> usize {
        match self {
            FittedModel::KMeans(fit) => fit.n_clusters(),
        }
    }
}

impl Predict for FittedModel {
    fn predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>> {
        match self {
            FittedModel::KMeans(fit) => fit.predict(data),
        }
    }
}
