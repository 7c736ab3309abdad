// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Independent circular rotation of array rows
//!
//! Every slice along the row axis is rotated along the trailing axis by its
//! own amount. Elements wrap around; nothing is truncated or padded.

use crate::error::{Result, TrialsError};
use ndarray::{Array, ArrayBase, ArrayView1, ArrayViewMut1, Axis, Data, Dimension, Ix3, RemoveAxis};
use rayon::prelude::*;

/// Rotate each slice along `axis` by its own entry in `shifts`.
///
/// The rotation runs along the trailing axis: `out[.., (j + s) mod n] = arr[.., j]`.
/// Any integer shift is accepted and reduced modulo the trailing length, so a
/// negative shift rotates towards lower indices.
///
/// # Errors
/// * `InvalidAxis` - the array has fewer than two dimensions, or `axis` is the trailing axis
/// * `ShapeMismatch` - `shifts.len()` differs from the length of `axis`
///
/// # Examples
/// ```
/// use ndarray::{array, Axis};
/// use ephysvibe_trials::indep_roll;
///
/// let arr = array![[1, 2, 3], [4, 5, 6]];
/// let rolled = indep_roll(&arr, &[1, -1], Axis(0)).unwrap();
/// assert_eq!(rolled, array![[3, 1, 2], [5, 6, 4]]);
/// ```
pub fn indep_roll<A, S, D>(arr: &ArrayBase<S, D>, shifts: &[i64], axis: Axis) -> Result<Array<A, D>>
where
    A: Clone + Send + Sync,
    S: Data<Elem = A>,
    D: Dimension + RemoveAxis,
{
    let ndim = arr.ndim();
    if ndim < 2 {
        return Err(TrialsError::InvalidAxis {
            axis: axis.index(),
            ndim,
            reason: "rotation needs a row axis and a trailing axis",
        });
    }
    if axis.index() >= ndim - 1 {
        return Err(TrialsError::InvalidAxis {
            axis: axis.index(),
            ndim,
            reason: "row axis must precede the trailing axis",
        });
    }

    let rows = arr.len_of(axis);
    if shifts.len() != rows {
        return Err(TrialsError::ShapeMismatch {
            what: "shift vector",
            expected: rows,
            actual: shifts.len(),
        });
    }

    let mut out = arr.to_owned();
    let width = arr.len_of(Axis(ndim - 1));
    if width == 0 || rows == 0 {
        return Ok(out);
    }

    // Removing `axis` leaves the trailing axis last in every row view
    let lane_axis = Axis(ndim - 2);
    out.axis_iter_mut(axis)
        .into_par_iter()
        .zip(arr.axis_iter(axis).into_par_iter())
        .zip(shifts.par_iter())
        .for_each(|((mut dst_row, src_row), &shift)| {
            let offset = normalize_shift(shift, width);
            if offset == 0 {
                return;
            }
            for (mut dst, src) in dst_row
                .lanes_mut(lane_axis)
                .into_iter()
                .zip(src_row.lanes(lane_axis))
            {
                rotate_lane(&mut dst, &src, offset);
            }
        });

    Ok(out)
}

/// Rotate every trial of a `(trials, neurons, time)` raster along time.
pub fn roll_trials<A, S>(raster: &ArrayBase<S, Ix3>, shifts: &[i64]) -> Result<Array<A, Ix3>>
where
    A: Clone + Send + Sync,
    S: Data<Elem = A>,
{
    indep_roll(raster, shifts, Axis(0))
}

/// Reduce a shift to `[0, width)`. `width` must be non-zero.
pub(crate) fn normalize_shift(shift: i64, width: usize) -> usize {
    shift.rem_euclid(width as i64) as usize
}

fn rotate_lane<A: Clone>(dst: &mut ArrayViewMut1<A>, src: &ArrayView1<A>, offset: usize) {
    let width = src.len();
    for (j, value) in src.iter().enumerate() {
        dst[(j + offset) % width] = value.clone();
    }
}
