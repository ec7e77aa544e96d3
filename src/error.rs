use thiserror::Error;

/// Errors returned by the estimator, the clustering procedures, and the metrics.
#[derive(Debug, Error)]
pub enum Error {
    /// Input slice is empty.
    #[error("empty input")]
    EmptyInput,

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Requested cluster count is incompatible with the dataset.
    #[error("invalid cluster count: requested {requested}, but dataset has {n_items} items")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of items in the dataset.
        n_items: usize,
    },

    /// Points in a dataset have inconsistent dimensionality.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimensionality.
        expected: usize,
        /// Found dimensionality.
        found: usize,
    },

    /// Two label vectors being compared cover a different number of points.
    #[error("label length mismatch: {left} vs {right}")]
    LengthMismatch {
        /// Length of the first partition.
        left: usize,
        /// Length of the second partition.
        right: usize,
    },

    /// Unknown clustering algorithm name.
    #[error("invalid algorithm {0:?}: choose \"k-means\"")]
    InvalidAlgorithm(String),

    /// Unknown agreement metric name.
    #[error("invalid metric {0:?}: choose \"rand\" or \"adjusted_rand\"")]
    InvalidMetric(String),

    /// Estimator settings that cannot produce a valid stability evaluation.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// `predict` was called before a successful `fit`.
    #[error("estimator is not fitted; call fit first")]
    NotFitted,
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
