use crate::error::Result;

/// Common interface for hard clustering algorithms (one label per point).
pub trait Clustering {
    /// Fit the model (if needed) and return one cluster label per input point.
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>>;

    /// The configured number of clusters.
    fn n_clusters(&self) -> usize;
}

/// A fitted model that can assign new points to its clusters.
pub trait Predict {
    /// Return one cluster label per input point.
    fn predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>>;
}
