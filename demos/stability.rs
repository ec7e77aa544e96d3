//! Stability selection on three well-separated 2D blobs.
//!
//! Run with `RUST_LOG=stablek=debug` to see per-candidate scores as they are computed.

use rand::prelude::*;
use stablek::{Metric, StableClustering};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let centers = [[0.0f32, 0.0], [5.0, 5.0], [10.0, 0.0]];
    let mut rng = StdRng::seed_from_u64(0);
    let data: Vec<Vec<f32>> = centers
        .iter()
        .flat_map(|c| {
            (0..50)
                .map(|_| {
                    vec![
                        c[0] + rng.random_range(-0.5f32..0.5),
                        c[1] + rng.random_range(-0.5f32..0.5),
                    ]
                })
                .collect::<Vec<_>>()
        })
        .collect();

    for metric in [Metric::AdjustedRand, Metric::Rand] {
        let mut est = StableClustering::new(vec![2, 3, 4, 5, 6, 8, 10])
            .with_n_repetitions(10)
            .with_metric(metric);
        est.fit(&data).unwrap();

        println!("=== {metric} ===");
        for (k, score) in est.scores().iter() {
            let marker = if Some(k) == est.best_k() { "  <= selected" } else { "" };
            println!("  k = {k:2}  score = {score:.4}{marker}");
        }
    }
}
