use crate::error::{Error, Result};

#[inline]
pub(crate) fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Check that `data` is non-empty and rectangular; returns the row dimension.
pub(crate) fn validate_rows(data: &[Vec<f32>]) -> Result<usize> {
    let first = data.first().ok_or(Error::EmptyInput)?;
    let dim = first.len();
    if dim == 0 {
        return Err(Error::InvalidParameter {
            name: "data",
            message: "points must have at least one dimension",
        });
    }
    for row in data {
        if row.len() != dim {
            return Err(Error::DimensionMismatch {
                expected: dim,
                found: row.len(),
            });
        }
    }
    Ok(dim)
}

/// Index of the closest centroid and its squared distance.
///
/// Ties go to the lowest index.
#[inline]
pub(crate) fn nearest(point: &[f32], centroids: &[Vec<f32>]) -> (usize, f32) {
    let mut best = 0usize;
    let mut best_d = f32::INFINITY;
    for (c, centroid) in centroids.iter().enumerate() {
        let d = squared_euclidean(point, centroid);
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    (best, best_d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rows_rejects_ragged() {
        let data = vec![vec![0.0, 1.0], vec![2.0]];
        assert!(matches!(
            validate_rows(&data),
            Err(Error::DimensionMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn validate_rows_rejects_empty() {
        let data: Vec<Vec<f32>> = vec![];
        assert!(matches!(validate_rows(&data), Err(Error::EmptyInput)));
    }

    #[test]
    fn nearest_prefers_lowest_index_on_tie() {
        let centroids = vec![vec![1.0, 0.0], vec![-1.0, 0.0]];
        let (c, d) = nearest(&[0.0, 0.0], &centroids);
        assert_eq!(c, 0);
        assert!((d - 1.0).abs() < 1e-6);
    }
}
