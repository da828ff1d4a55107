//! Temporal averaging of a field over fixed-length windows.

use crate::{OceanField, Result};
use ndarray::{s, Array3, Array4, ArrayView4, Axis};
use ocean_common::{ChemicalSelection, OceanError};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Average a field over consecutive windows of `delta_t` time steps.
///
/// The output keeps only the selected chemicals, in channel order, and has
/// `n_times / delta_t` time steps; a trailing partial window is dropped.
/// Each value is the mean of the finite samples in its window, or NaN when
/// the window holds none.
pub fn average_data(
    field: &OceanField,
    selection: &ChemicalSelection,
    delta_t: usize,
) -> Result<OceanField> {
    if delta_t == 0 {
        return Err(OceanError::invalid_parameter("delta_t", "must be > 0").into());
    }
    let positions = field.selected_positions(selection)?;
    let windows = field.n_times() / delta_t;
    if windows == 0 {
        return Err(OceanError::EmptyData(format!(
            "{} time steps is shorter than one averaging window of {}",
            field.n_times(),
            delta_t
        ))
        .into());
    }

    info!(
        delta_t,
        windows,
        chemicals = positions.len(),
        "Starting averaging"
    );

    let data = field.data().view();
    let done = AtomicUsize::new(0);
    let last_decile = AtomicUsize::new(0);

    let layers: Vec<Array3<f64>> = (0..windows)
        .into_par_iter()
        .map(|w| {
            let layer = average_window(&data, w * delta_t, (w + 1) * delta_t, &positions);
            report_progress(&done, &last_decile, windows);
            layer
        })
        .collect();

    let (n_lat, n_lon) = field.grid_shape();
    let mut out = Array4::<f64>::from_elem((windows, n_lat, n_lon, positions.len()), f64::NAN);
    for (w, layer) in layers.into_iter().enumerate() {
        out.index_axis_mut(Axis(0), w).assign(&layer);
    }

    info!(windows, "Finished averaging");
    OceanField::with_chemicals(out, selection.to_vec())
}

/// Mean over `[t1, t2)` of the finite values of each cell and channel.
fn average_window(
    data: &ArrayView4<'_, f64>,
    t1: usize,
    t2: usize,
    positions: &[usize],
) -> Array3<f64> {
    let (n_lat, n_lon) = (data.len_of(Axis(1)), data.len_of(Axis(2)));
    let mut layer = Array3::<f64>::from_elem((n_lat, n_lon, positions.len()), f64::NAN);

    for i in 0..n_lat {
        for j in 0..n_lon {
            for (c, &chem) in positions.iter().enumerate() {
                let window = data.slice(s![t1..t2, i, j, chem]);
                let (sum, count) = window
                    .iter()
                    .filter(|v| v.is_finite())
                    .fold((0.0_f64, 0usize), |(sum, count), v| (sum + *v, count + 1));
                if count > 0 {
                    layer[[i, j, c]] = sum / count as f64;
                }
            }
        }
    }
    layer
}

/// Log once per completed tenth of the windows.
fn report_progress(done: &AtomicUsize, last_decile: &AtomicUsize, total: usize) {
    let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
    let decile = finished * 10 / total;
    if last_decile.fetch_max(decile, Ordering::Relaxed) < decile {
        info!(
            finished,
            total,
            percent = decile * 10,
            "Averaging progress"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocean_common::Chemical;

    #[test]
    fn test_window_mean_ignores_nan() {
        let mut data = Array4::<f64>::zeros((4, 1, 1, 1));
        data[[0, 0, 0, 0]] = 1.0;
        data[[1, 0, 0, 0]] = f64::NAN;
        data[[2, 0, 0, 0]] = 3.0;
        data[[3, 0, 0, 0]] = 5.0;
        let layer = average_window(&data.view(), 0, 3, &[0]);
        assert_eq!(layer[[0, 0, 0]], 2.0);
    }

    #[test]
    fn test_all_nan_window_is_nan() {
        let data = Array4::<f64>::from_elem((2, 1, 1, 1), f64::NAN);
        let layer = average_window(&data.view(), 0, 2, &[0]);
        assert!(layer[[0, 0, 0]].is_nan());
    }

    #[test]
    fn test_zero_delta_rejected() {
        let field = OceanField::new(Array4::<f64>::zeros((4, 1, 1, 4))).unwrap();
        assert!(average_data(&field, &ChemicalSelection::all(), 0).is_err());
    }

    #[test]
    fn test_selection_shrinks_chemical_axis() {
        let data = Array4::from_shape_fn((4, 1, 1, 4), |(t, _, _, c)| (t + 10 * c) as f64);
        let field = OceanField::new(data).unwrap();
        let selection = ChemicalSelection::from_chemicals(&[Chemical::Doxy, Chemical::Phos]);
        let averaged = average_data(&field, &selection, 2).unwrap();
        assert_eq!(averaged.n_times(), 2);
        assert_eq!(averaged.chemicals(), &[Chemical::Doxy, Chemical::Phos]);
        // DOXY values are 10..=13, PHOS values 30..=33
        assert_eq!(averaged.data()[[0, 0, 0, 0]], 10.5);
        assert_eq!(averaged.data()[[1, 0, 0, 1]], 32.5);
    }
}
