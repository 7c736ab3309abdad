// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for trial selection and alignment

use thiserror::Error;

/// Errors raised at the boundary of an alignment call
#[derive(Debug, Error)]
pub enum TrialsError {
    #[error("Unknown block {block}: no event table registered (known blocks: {known:?})")]
    UnknownBlock { block: i64, known: Vec<i64> },

    #[error("Unknown event '{event}' in the event table of block {block}")]
    UnknownEvent { block: i64, event: String },

    #[error("Shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid axis {axis} for an array with {ndim} dimensions: {reason}")]
    InvalidAxis {
        axis: usize,
        ndim: usize,
        reason: &'static str,
    },

    #[error("Event code {code} matched {matches} slots in trial {trial}")]
    AmbiguousEvent {
        trial: usize,
        code: i64,
        matches: usize,
    },

    #[error("Event sample time in trial {trial} is not finite")]
    InvalidSampleTime { trial: usize },

    #[error("Shift {offset} of trial {trial} does not fit in an i64")]
    ShiftOutOfRange { trial: usize, offset: f64 },

    #[error("Array construction failed: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, TrialsError>;
