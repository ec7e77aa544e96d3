//! Choosing the number of clusters by stability.
//!
//! `stablek` clusters a dataset many times per candidate cluster count, each
//! run with its own seed, and measures how much the runs agree. The count with
//! the most reproducible partitions is selected.
//!
//! The public API is:
//! - [`StableClustering`]: the estimator (`fit`, `predict`, score table)
//! - [`cluster`]: k-means (k-means++ seeding, Lloyd iterations)
//! - [`metrics`]: Rand index and adjusted Rand index

#![forbid(unsafe_code)]

pub mod cluster;
pub mod error;
pub mod metrics;
pub mod stability;

pub use cluster::{Algorithm, Clustering, FittedModel, Kmeans, KmeansFit, Predict};
pub use error::{Error, Result};
pub use metrics::{adjusted_rand_score, mean_pairwise_score, rand_score, Metric, PairConfusion};
pub use stability::{Scores, StableClustering};
