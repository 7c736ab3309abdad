// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Trial selection by behavioral condition

use crate::error::{Result, TrialsError};
use ndarray::{Array1, ArrayBase, ArrayView1, Data, Ix1, Zip};

/// Condition a trial must satisfy to be kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialCriteria {
    pub select_block: i64,
    pub error_type: i64,
    pub select_pos: i64,
}

impl TrialCriteria {
    pub fn matches(&self, trial_error: i64, block: i64, pos_code: i64) -> bool {
        pos_code == self.select_pos && trial_error == self.error_type && block == self.select_block
    }
}

/// Per-trial mask: `pos_code == select_pos && trial_error == error_type && block == select_block`.
///
/// # Errors
/// `ShapeMismatch` when the three arrays differ in length.
pub fn selection_mask<S1, S2, S3>(
    trial_error: &ArrayBase<S1, Ix1>,
    block: &ArrayBase<S2, Ix1>,
    pos_code: &ArrayBase<S3, Ix1>,
    criteria: &TrialCriteria,
) -> Result<Array1<bool>>
where
    S1: Data<Elem = i64>,
    S2: Data<Elem = i64>,
    S3: Data<Elem = i64>,
{
    let n_trials = trial_error.len();
    check_trial_count("block", n_trials, block.len())?;
    check_trial_count("pos_code", n_trials, pos_code.len())?;

    Ok(Zip::from(trial_error)
        .and(block)
        .and(pos_code)
        .map_collect(|&err, &blk, &pos| criteria.matches(err, blk, pos)))
}

/// Slots of one trial's code row holding `code`.
///
/// Codes are compared as `f64`; NaN padding never matches.
pub fn event_slots(code_numbers: ArrayView1<'_, f64>, code: i64) -> Vec<usize> {
    let target = code as f64;
    code_numbers
        .iter()
        .enumerate()
        .filter(|(_, &number)| number == target)
        .map(|(slot, _)| slot)
        .collect()
}

pub(crate) fn check_trial_count(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(TrialsError::ShapeMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_all_three_predicates_required() {
        let trial_error = array![0, 0, 0, 0, 3];
        let block = array![1, 1, 2, 1, 1];
        let pos_code = array![1, 1, 1, 2, 1];
        let criteria = TrialCriteria {
            select_block: 1,
            error_type: 0,
            select_pos: 1,
        };

        let mask = selection_mask(&trial_error, &block, &pos_code, &criteria).unwrap();
        assert_eq!(mask, array![true, true, false, false, false]);
    }

    #[test]
    fn test_length_mismatch() {
        let criteria = TrialCriteria {
            select_block: 1,
            error_type: 0,
            select_pos: 1,
        };
        let err = selection_mask(&array![0, 0], &array![1, 1, 1], &array![1, 1], &criteria)
            .unwrap_err();
        assert!(matches!(
            err,
            TrialsError::ShapeMismatch { what: "block", expected: 2, actual: 3 }
        ));
    }

    #[test]
    fn test_event_slots_skip_nan_padding() {
        let row = array![9.0, 23.0, f64::NAN, 23.0, f64::NAN];
        assert_eq!(event_slots(row.view(), 23), vec![1, 3]);
        assert!(event_slots(row.view(), 18).is_empty());
    }
}
