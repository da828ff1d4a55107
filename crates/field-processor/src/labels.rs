//! Writing cluster labels back into grid or time layout.

use crate::{FieldError, Result, SampleOrigin};
use ndarray::{Array, Array1, Array2, Dimension};

/// Place per-sample labels on a `(n_lat, n_lon)` grid.
///
/// Cells that produced no sample, and samples labelled as noise (`None`),
/// are NaN.
pub fn scatter_labels(
    labels: &[Option<usize>],
    origins: &[SampleOrigin],
    shape: (usize, usize),
) -> Result<Array2<f64>> {
    check_lengths(labels, origins)?;
    let mut grid = Array2::<f64>::from_elem(shape, f64::NAN);

    for (label, origin) in labels.iter().zip(origins) {
        let SampleOrigin::Cell { lat, lon } = *origin else {
            return Err(FieldError::shape("time-step sample in a spatial label grid"));
        };
        if lat >= shape.0 || lon >= shape.1 {
            return Err(FieldError::shape(format!(
                "cell ({}, {}) outside {:?} grid",
                lat, lon, shape
            )));
        }
        if let Some(label) = label {
            grid[[lat, lon]] = *label as f64;
        }
    }
    Ok(grid)
}

/// Labels of time-step samples as a series, NaN for noise.
pub fn label_series(labels: &[Option<usize>], origins: &[SampleOrigin]) -> Result<Array1<f64>> {
    check_lengths(labels, origins)?;
    let len = origins
        .iter()
        .map(|origin| match origin {
            SampleOrigin::Time(t) => Ok(t + 1),
            SampleOrigin::Cell { .. } => Err(FieldError::shape("cell sample in a label series")),
        })
        .try_fold(0, |len, end| end.map(|end| len.max(end)))?;

    let mut series = Array1::<f64>::from_elem(len, f64::NAN);
    for (label, origin) in labels.iter().zip(origins) {
        if let (Some(label), SampleOrigin::Time(t)) = (label, origin) {
            series[*t] = *label as f64;
        }
    }
    Ok(series)
}

fn check_lengths(labels: &[Option<usize>], origins: &[SampleOrigin]) -> Result<()> {
    if labels.len() != origins.len() {
        return Err(FieldError::shape(format!(
            "{} labels for {} samples",
            labels.len(),
            origins.len()
        )));
    }
    Ok(())
}

/// Number of samples carrying each label in `0..n_clusters`.
pub fn cluster_sizes(labels: &[Option<usize>], n_clusters: usize) -> Vec<usize> {
    let mut sizes = vec![0; n_clusters];
    for label in labels.iter().flatten() {
        if let Some(size) = sizes.get_mut(*label) {
            *size += 1;
        }
    }
    sizes
}

/// Relabel clusters by size rank: the smallest cluster becomes 0 and the
/// largest `n - 1`. Equal sizes keep their original relative order.
///
/// Values that are NaN or not a label in `0..sizes.len()` are left as-is.
pub fn sort_clusters<D: Dimension>(labels: &Array<f64, D>, sizes: &[usize]) -> Array<f64, D> {
    let ranks = size_ranks(sizes);
    labels.mapv(|value| {
        if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
            if let Some(rank) = ranks.get(value as usize) {
                return *rank as f64;
            }
        }
        value
    })
}

/// [`sort_clusters`] for per-sample labels. Noise stays `None`.
pub fn rank_labels(labels: &[Option<usize>], sizes: &[usize]) -> Vec<Option<usize>> {
    let ranks = size_ranks(sizes);
    labels
        .iter()
        .map(|label| label.map(|l| ranks.get(l).copied().unwrap_or(l)))
        .collect()
}

fn size_ranks(sizes: &[usize]) -> Vec<usize> {
    sizes
        .iter()
        .enumerate()
        .map(|(i, size)| {
            sizes
                .iter()
                .enumerate()
                .filter(|(j, other)| other < &size || (other == &size && *j < i))
                .count()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_scatter_leaves_noise_and_gaps_nan() {
        let labels = vec![Some(1), None, Some(0)];
        let origins = vec![
            SampleOrigin::Cell { lat: 0, lon: 0 },
            SampleOrigin::Cell { lat: 0, lon: 1 },
            SampleOrigin::Cell { lat: 1, lon: 1 },
        ];
        let grid = scatter_labels(&labels, &origins, (2, 2)).unwrap();
        assert_eq!(grid[[0, 0]], 1.0);
        assert!(grid[[0, 1]].is_nan());
        assert!(grid[[1, 0]].is_nan());
        assert_eq!(grid[[1, 1]], 0.0);
    }

    #[test]
    fn test_scatter_rejects_length_mismatch() {
        let origins = vec![SampleOrigin::Cell { lat: 0, lon: 0 }];
        assert!(scatter_labels(&[], &origins, (1, 1)).is_err());
    }

    #[test]
    fn test_label_series() {
        let labels = vec![Some(2), None, Some(0)];
        let origins = vec![SampleOrigin::Time(0), SampleOrigin::Time(1), SampleOrigin::Time(2)];
        let series = label_series(&labels, &origins).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series[0], 2.0);
        assert!(series[1].is_nan());
        assert_eq!(series[2], 0.0);
    }

    #[test]
    fn test_cluster_sizes_ignores_noise() {
        let labels = vec![Some(0), Some(2), None, Some(2), Some(7)];
        assert_eq!(cluster_sizes(&labels, 3), vec![1, 0, 2]);
    }

    #[test]
    fn test_sort_clusters_ranks_by_size() {
        // sizes: cluster 0 has 5, cluster 1 has 1, cluster 2 has 3
        let sizes = vec![5, 1, 3];
        let labels = array![[0.0, 1.0], [2.0, f64::NAN]];
        let sorted = sort_clusters(&labels, &sizes);
        assert_eq!(sorted[[0, 0]], 2.0);
        assert_eq!(sorted[[0, 1]], 0.0);
        assert_eq!(sorted[[1, 0]], 1.0);
        assert!(sorted[[1, 1]].is_nan());
    }

    #[test]
    fn test_sort_clusters_ties_stay_distinct() {
        let sizes = vec![4, 4, 1];
        assert_eq!(size_ranks(&sizes), vec![1, 2, 0]);
    }

    #[test]
    fn test_rank_labels_matches_grid_sort() {
        let sizes = vec![5, 1, 3];
        let labels = vec![Some(0), Some(1), None, Some(2)];
        assert_eq!(rank_labels(&labels, &sizes), vec![Some(2), Some(0), None, Some(1)]);
    }
}
