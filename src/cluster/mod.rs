//! Clustering procedures that produce the partitions being compared.
//!
//! Stability selection only needs one capability from a clustering algorithm:
//! given the data, a cluster count `k`, and a seed, return one label per point.
//! [`Algorithm`] is the closed set of procedures that can do this, and
//! [`FittedModel`] is the matching set of fitted models that can label unseen
//! points.
//!
//! ## K-means
//!
//! The classic algorithm: assign each point to the nearest centroid, then
//! update centroids to the mean of their points. Repeat.
//!
//! **Objective**: Minimize within-cluster sum of squares:
//!
//! ```text
//! J = Σ_k Σ_{x ∈ C_k} ||x - μ_k||²
//! ```
//!
//! **Assumptions**:
//! - Clusters are roughly spherical
//! - Clusters have similar sizes
//! - You know k in advance (or let stability selection choose it)
//!
//! Because k-means++ seeding is random, different seeds can land in different
//! local optima. On data whose structure matches `k` they rarely do.
//!
//! ## Usage
//!
//! ```rust
//! use stablek::cluster::{Algorithm, Clustering, Kmeans};
//!
//! let data = vec![
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.1],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.1],
//! ];
//!
//! let labels = Kmeans::new(2).with_seed(42).fit_predict(&data).unwrap();
//! assert_eq!(labels[0], labels[1]);  // First two together
//! assert_ne!(labels[0], labels[2]);  // Separate from last two
//!
//! // Same procedure, driven through the algorithm selector.
//! let again = Algorithm::KMeans.fit_predict(&data, 2, 42).unwrap();
//! assert_eq!(labels, again);
//! ```

mod algorithm;
mod kmeans;
mod traits;
pub(crate) mod util;

pub use algorithm::{Algorithm, FittedModel};
pub use kmeans::{Kmeans, KmeansFit};
pub use traits::{Clustering, Predict};
