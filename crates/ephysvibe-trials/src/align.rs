// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Event-aligned extraction of spike rasters
//!
//! Trials matching a behavioral condition are kept, the numeric code of the
//! requested event is resolved for the selected block, and every kept trial
//! is rotated along time so the event sits at bin `time_before`.

use crate::error::{Result, TrialsError};
use crate::events::EventTable;
use crate::roll::roll_trials;
use crate::selection::{check_trial_count, event_slots, selection_mask, TrialCriteria};
use ndarray::{Array1, Array3, ArrayView1, ArrayView2, ArrayView3, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// What to do when an event code occurs in more than one slot of a trial
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiMatchPolicy {
    /// Use the earliest slot
    #[default]
    First,
    /// Use the latest slot
    Last,
    /// Fail with `AmbiguousEvent`
    Reject,
}

impl std::str::FromStr for MultiMatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown multi-match policy '{}'", other)),
        }
    }
}

/// Parameters of one alignment call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignParams {
    pub select_block: i64,
    /// Event name resolved through the block's [`EventTable`]
    pub event: String,
    /// Output time bin at which the event lands
    pub time_before: i64,
    pub error_type: i64,
    pub select_pos: i64,
    pub multi_match: MultiMatchPolicy,
}

impl Default for AlignParams {
    fn default() -> Self {
        Self {
            select_block: 1,
            event: "sample_on".to_string(),
            time_before: 500,
            error_type: 0,
            select_pos: 1,
            multi_match: MultiMatchPolicy::First,
        }
    }
}

impl AlignParams {
    pub fn criteria(&self) -> TrialCriteria {
        TrialCriteria {
            select_block: self.select_block,
            error_type: self.error_type,
            select_pos: self.select_pos,
        }
    }
}

/// Borrowed per-trial arrays of one recording session.
///
/// All arrays are index-aligned by trial:
/// * `sp_samples` - `(trials, neurons, time)` spike raster
/// * `code_samples` / `code_numbers` - `(trials, slots)` event times and event codes
/// * `trial_error`, `block`, `pos_code` - one value per trial
#[derive(Debug, Clone)]
pub struct SessionTrials<'a, A> {
    sp_samples: ArrayView3<'a, A>,
    code_samples: ArrayView2<'a, f64>,
    code_numbers: ArrayView2<'a, f64>,
    trial_error: ArrayView1<'a, i64>,
    block: ArrayView1<'a, i64>,
    pos_code: ArrayView1<'a, i64>,
}

impl<'a, A> SessionTrials<'a, A> {
    /// Bundle session arrays, checking that they agree on the trial count.
    ///
    /// # Errors
    /// `ShapeMismatch` naming the first array that disagrees with `sp_samples`,
    /// or `code_samples` whose slot count differs from `code_numbers`.
    pub fn new(
        sp_samples: ArrayView3<'a, A>,
        code_samples: ArrayView2<'a, f64>,
        code_numbers: ArrayView2<'a, f64>,
        trial_error: ArrayView1<'a, i64>,
        block: ArrayView1<'a, i64>,
        pos_code: ArrayView1<'a, i64>,
    ) -> Result<Self> {
        let n_trials = sp_samples.len_of(Axis(0));
        check_trial_count("code_samples", n_trials, code_samples.nrows())?;
        check_trial_count("code_numbers", n_trials, code_numbers.nrows())?;
        check_trial_count("trial_error", n_trials, trial_error.len())?;
        check_trial_count("block", n_trials, block.len())?;
        check_trial_count("pos_code", n_trials, pos_code.len())?;
        check_trial_count("code_samples slots", code_numbers.ncols(), code_samples.ncols())?;

        Ok(Self {
            sp_samples,
            code_samples,
            code_numbers,
            trial_error,
            block,
            pos_code,
        })
    }

    pub fn n_trials(&self) -> usize {
        self.sp_samples.len_of(Axis(0))
    }

}

/// Result of [`align_on`]
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedTrials<A> {
    /// Kept trials with the event rotated to `time_before`
    pub aligned: Array3<A>,
    /// One entry per original trial, true for the rows of `aligned`
    pub mask: Array1<bool>,
    /// Per-row `event_sample - time_before`, before negation
    pub shifts: Vec<i64>,
}

impl<A> AlignedTrials<A> {
    /// Original trial index of every aligned row, in row order
    pub fn trial_indices(&self) -> Vec<usize> {
        self.mask
            .iter()
            .enumerate()
            .filter_map(|(trial, &kept)| kept.then_some(trial))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.aligned.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Select trials and align their rasters on an event.
///
/// A trial is kept when it satisfies the [`TrialCriteria`] of `params` and its
/// code row contains the event's code. A selected trial without the event is
/// dropped and reported false in the mask. An event earlier than
/// `time_before` produces a negative shift, which wraps around the time axis.
///
/// # Errors
/// * `UnknownBlock` / `UnknownEvent` - the event cannot be resolved for `params.select_block`
/// * `AmbiguousEvent` - several slots match and the policy is `Reject`
/// * `InvalidSampleTime` - the matched event time is NaN or infinite
/// * `ShiftOutOfRange` - `event_sample - time_before` does not fit in an `i64`
///
/// # Examples
/// ```
/// use ndarray::{array, Array3};
/// use ephysvibe_trials::{align_on, AlignParams, EventTable, SessionTrials};
///
/// let mut raster = Array3::<u8>::zeros((1, 1, 10));
/// raster[[0, 0, 6]] = 1;
/// let code_samples = array![[6.0]];
/// let code_numbers = array![[23.0]];
/// let ones = array![1_i64];
/// let zeros = array![0_i64];
///
/// let session = SessionTrials::new(
///     raster.view(),
///     code_samples.view(),
///     code_numbers.view(),
///     zeros.view(),
///     ones.view(),
///     ones.view(),
/// )?;
/// let events = EventTable::new().with_block(1, [("sample_on", 23)]);
/// let params = AlignParams { time_before: 3, ..AlignParams::default() };
///
/// let result = align_on(&session, &events, &params)?;
/// assert_eq!(result.aligned[[0, 0, 3]], 1);
/// # Ok::<(), ephysvibe_trials::TrialsError>(())
/// ```
pub fn align_on<A>(
    session: &SessionTrials<'_, A>,
    events: &EventTable,
    params: &AlignParams,
) -> Result<AlignedTrials<A>>
where
    A: Clone + Send + Sync,
{
    let code = events.code_for(params.select_block, &params.event)?;
    let selected = selection_mask(
        &session.trial_error,
        &session.block,
        &session.pos_code,
        &params.criteria(),
    )?;

    let n_trials = session.n_trials();
    let mut kept = Vec::new();
    let mut shifts = Vec::new();
    let mut rolls = Vec::new();
    for trial in (0..n_trials).filter(|&t| selected[t]) {
        let Some(slot) = resolve_slot(session, trial, code, params.multi_match)? else {
            continue;
        };

        let sample = session.code_samples[[trial, slot]];
        if !sample.is_finite() {
            return Err(TrialsError::InvalidSampleTime { trial });
        }
        // Truncation toward zero matches the integer cast of the sample times
        let offset = sample - params.time_before as f64;
        if !(offset > i64::MIN as f64 && offset < i64::MAX as f64) {
            return Err(TrialsError::ShiftOutOfRange { trial, offset });
        }
        let shift = offset as i64;
        let roll = shift
            .checked_neg()
            .ok_or(TrialsError::ShiftOutOfRange { trial, offset })?;
        if shift < 0 {
            debug!(
                target: "ephysvibe-trials",
                trial, sample, time_before = params.time_before,
                "event precedes time_before, rotation wraps around"
            );
        }
        kept.push(trial);
        shifts.push(shift);
        rolls.push(roll);
    }

    let subset = take_trials(&session.sp_samples, &kept)?;
    let aligned = roll_trials(&subset, &rolls)?;

    let mut mask = Array1::from_elem(n_trials, false);
    for &trial in &kept {
        mask[trial] = true;
    }

    let n_selected = selected.iter().filter(|&&s| s).count();
    debug!(
        target: "ephysvibe-trials",
        event = %params.event,
        code,
        block = params.select_block,
        total = n_trials,
        selected = n_selected,
        aligned = kept.len(),
        dropped = n_selected - kept.len(),
        "aligned trials on event"
    );

    Ok(AlignedTrials {
        aligned,
        mask,
        shifts,
    })
}

/// Slot of `code` in `trial`, `None` when the event never fired.
fn resolve_slot<A>(
    session: &SessionTrials<'_, A>,
    trial: usize,
    code: i64,
    policy: MultiMatchPolicy,
) -> Result<Option<usize>> {
    let slots = event_slots(session.code_numbers.row(trial), code);
    if slots.len() > 1 {
        if policy == MultiMatchPolicy::Reject {
            return Err(TrialsError::AmbiguousEvent {
                trial,
                code,
                matches: slots.len(),
            });
        }
        warn!(
            target: "ephysvibe-trials",
            trial, code, matches = slots.len(), policy = ?policy,
            "event code occurs more than once in trial"
        );
    }

    Ok(match policy {
        MultiMatchPolicy::Last => slots.last().copied(),
        MultiMatchPolicy::First | MultiMatchPolicy::Reject => slots.first().copied(),
    })
}

/// Copy the listed trials into a new standard-layout raster.
fn take_trials<A: Clone>(raster: &ArrayView3<'_, A>, trials: &[usize]) -> Result<Array3<A>> {
    let (_, n_neurons, n_bins) = raster.dim();
    let mut data = Vec::with_capacity(trials.len() * n_neurons * n_bins);
    for &trial in trials {
        data.extend(raster.index_axis(Axis(0), trial).iter().cloned());
    }
    Ok(Array3::from_shape_vec((trials.len(), n_neurons, n_bins), data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1, Array2};

    const SAMPLE_ON: i64 = 23;

    fn events() -> EventTable {
        EventTable::new()
            .with_block(1, [("sample_on", SAMPLE_ON)])
            .with_block(2, [("sample_on", 43)])
    }

    #[test]
    fn test_take_trials_preserves_order() {
        let raster = Array3::from_shape_fn((4, 2, 3), |(t, n, b)| t * 100 + n * 10 + b);
        let subset = take_trials(&raster.view(), &[3, 1]).unwrap();
        assert_eq!(subset.dim(), (2, 2, 3));
        assert_eq!(subset.index_axis(Axis(0), 0), raster.index_axis(Axis(0), 3));
        assert_eq!(subset.index_axis(Axis(0), 1), raster.index_axis(Axis(0), 1));
    }

    #[test]
    fn test_multi_match_policies() {
        let raster = Array3::<u8>::zeros((1, 1, 20));
        let code_samples = array![[4.0, 9.0, 15.0]];
        let code_numbers = array![[SAMPLE_ON as f64, 7.0, SAMPLE_ON as f64]];
        let one = array![1_i64];
        let zero = array![0_i64];
        let session = SessionTrials::new(
            raster.view(),
            code_samples.view(),
            code_numbers.view(),
            zero.view(),
            one.view(),
            one.view(),
        )
        .unwrap();

        let mut params = AlignParams {
            time_before: 2,
            ..AlignParams::default()
        };
        assert_eq!(align_on(&session, &events(), &params).unwrap().shifts, vec![2]);

        params.multi_match = MultiMatchPolicy::Last;
        assert_eq!(align_on(&session, &events(), &params).unwrap().shifts, vec![13]);

        params.multi_match = MultiMatchPolicy::Reject;
        assert!(matches!(
            align_on(&session, &events(), &params),
            Err(TrialsError::AmbiguousEvent { trial: 0, matches: 2, .. })
        ));
    }

    #[test]
    fn test_shift_truncates_fractional_samples() {
        let raster = Array3::<u8>::zeros((2, 1, 10));
        let code_samples = array![[6.7], [1.5]];
        let code_numbers = Array2::from_elem((2, 1), SAMPLE_ON as f64);
        let ones = array![1_i64, 1];
        let zeros = array![0_i64, 0];
        let session = SessionTrials::new(
            raster.view(),
            code_samples.view(),
            code_numbers.view(),
            zeros.view(),
            ones.view(),
            ones.view(),
        )
        .unwrap();
        let params = AlignParams {
            time_before: 3,
            ..AlignParams::default()
        };
        // 6.7 - 3 -> 3, 1.5 - 3 -> -1
        assert_eq!(align_on(&session, &events(), &params).unwrap().shifts, vec![3, -1]);
    }

    #[test]
    fn test_nan_sample_rejected() {
        let raster = Array3::<u8>::zeros((1, 1, 10));
        let code_samples = array![[f64::NAN]];
        let code_numbers = array![[SAMPLE_ON as f64]];
        let one = array![1_i64];
        let zero = array![0_i64];
        let session = SessionTrials::new(
            raster.view(),
            code_samples.view(),
            code_numbers.view(),
            zero.view(),
            one.view(),
            one.view(),
        )
        .unwrap();
        assert!(matches!(
            align_on(&session, &events(), &AlignParams::default()),
            Err(TrialsError::InvalidSampleTime { trial: 0 })
        ));
    }

    fn single_trial_session<'a>(
        raster: &'a Array3<u8>,
        code_samples: &'a Array2<f64>,
        code_numbers: &'a Array2<f64>,
        flags: &'a [Array1<i64>; 2],
    ) -> SessionTrials<'a, u8> {
        let [zero, one] = flags;
        SessionTrials::new(
            raster.view(),
            code_samples.view(),
            code_numbers.view(),
            zero.view(),
            one.view(),
            one.view(),
        )
        .unwrap()
    }

    #[test]
    fn test_extreme_sample_time_rejected() {
        let raster = Array3::<u8>::zeros((1, 1, 10));
        let code_samples = array![[-1e30]];
        let code_numbers = array![[SAMPLE_ON as f64]];
        let flags = [array![0_i64], array![1_i64]];
        let session = single_trial_session(&raster, &code_samples, &code_numbers, &flags);

        assert!(matches!(
            align_on(&session, &events(), &AlignParams::default()),
            Err(TrialsError::ShiftOutOfRange { trial: 0, .. })
        ));
    }

    #[test]
    fn test_extreme_time_before_rejected() {
        let raster = Array3::<u8>::zeros((1, 1, 10));
        let code_samples = array![[0.0]];
        let code_numbers = array![[SAMPLE_ON as f64]];
        let flags = [array![0_i64], array![1_i64]];
        let session = single_trial_session(&raster, &code_samples, &code_numbers, &flags);
        let params = AlignParams {
            time_before: i64::MAX,
            ..AlignParams::default()
        };

        assert!(matches!(
            align_on(&session, &events(), &params),
            Err(TrialsError::ShiftOutOfRange { trial: 0, .. })
        ));
    }

    #[test]
    fn test_large_finite_sample_wraps() {
        // 1e12 fits in i64; the rotation is reduced modulo the bin count
        let mut raster = Array3::<u8>::zeros((1, 1, 10));
        raster[[0, 0, 0]] = 1;
        let code_samples = array![[1e12]];
        let code_numbers = array![[SAMPLE_ON as f64]];
        let flags = [array![0_i64], array![1_i64]];
        let session = single_trial_session(&raster, &code_samples, &code_numbers, &flags);
        let params = AlignParams {
            time_before: 0,
            ..AlignParams::default()
        };

        let result = align_on(&session, &events(), &params).unwrap();
        assert_eq!(result.shifts, vec![1_000_000_000_000]);
        assert_eq!(result.aligned[[0, 0, 0]], 1);
    }

    #[test]
    fn test_block_two_uses_its_own_code() {
        let raster = Array3::<u8>::zeros((1, 1, 10));
        let code_samples = array![[5.0, 7.0]];
        let code_numbers = array![[SAMPLE_ON as f64, 43.0]];
        let two = array![2_i64];
        let one = array![1_i64];
        let zero = array![0_i64];
        let session = SessionTrials::new(
            raster.view(),
            code_samples.view(),
            code_numbers.view(),
            zero.view(),
            two.view(),
            one.view(),
        )
        .unwrap();
        let params = AlignParams {
            select_block: 2,
            time_before: 0,
            ..AlignParams::default()
        };
        assert_eq!(align_on(&session, &events(), &params).unwrap().shifts, vec![7]);
    }

    #[test]
    fn test_session_rejects_short_arrays() {
        let raster = Array3::<u8>::zeros((3, 1, 10));
        let codes = Array2::<f64>::zeros((3, 2));
        let short = array![0_i64, 0];
        let full = array![0_i64, 0, 0];
        let err = SessionTrials::new(
            raster.view(),
            codes.view(),
            codes.view(),
            full.view(),
            short.view(),
            full.view(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TrialsError::ShapeMismatch { what: "block", expected: 3, actual: 2 }
        ));
    }

    #[test]
    fn test_multi_match_policy_from_str() {
        assert_eq!("First".parse::<MultiMatchPolicy>().unwrap(), MultiMatchPolicy::First);
        assert_eq!("reject".parse::<MultiMatchPolicy>().unwrap(), MultiMatchPolicy::Reject);
        assert!("newest".parse::<MultiMatchPolicy>().is_err());
    }
}
