// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # ephysvibe - event-aligned spike-train extraction
//!
//! Selects trials of a neurophysiology session by behavioral condition and
//! re-aligns their spike rasters on a behavioral event.
//!
//! ## Feature Flags
//!
//! - **`config`** (default): TOML configuration of event tables and alignment defaults;
//!   enables `observability`, whose `LoggingConfig` backs the `[logging]` section
//! - **`observability`** (default): logging initialization and per-crate debug flags
//! - **`file-logging`**: daily-rotated log files
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ephysvibe::prelude::*;
//! use ndarray::{Array1, Array2, Array3};
//!
//! let config = load_config(None, None)?;
//! validate_config(&config)?;
//! let _guard = init_logging(&parse_debug_flags(), &config.logging)?;
//!
//! # let (raster, code_samples, code_numbers) =
//! #     (Array3::<u8>::zeros((0, 0, 0)), Array2::<f64>::zeros((0, 0)), Array2::<f64>::zeros((0, 0)));
//! # let (trial_error, block, pos_code) =
//! #     (Array1::<i64>::zeros(0), Array1::<i64>::zeros(0), Array1::<i64>::zeros(0));
//! let session = SessionTrials::new(
//!     raster.view(),
//!     code_samples.view(),
//!     code_numbers.view(),
//!     trial_error.view(),
//!     block.view(),
//!     pos_code.view(),
//! )?;
//! let result = align_on(&session, &config.event_table()?, &config.align_params())?;
//! println!("{} of {} trials aligned", result.len(), session.n_trials());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: ephysvibe-config                           │
//! │  (event tables, alignment defaults, overrides)          │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Algorithms: ephysvibe-trials                           │
//! │  (selection, event lookup, per-trial rotation)          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

pub use ephysvibe_trials as trials;
pub use ndarray;

#[cfg(feature = "config")]
pub use ephysvibe_config as config;

#[cfg(feature = "observability")]
pub use ephysvibe_observability as observability;

/// Prelude - commonly used types and functions
pub mod prelude {
    pub use crate::trials::{
        align_on, indep_roll, roll_trials, AlignParams, AlignedTrials, EventTable,
        MultiMatchPolicy, SessionTrials, TrialCriteria, TrialsError,
    };

    #[cfg(feature = "config")]
    pub use crate::config::{load_config, validate_config, ConfigError, EphysConfig};

    #[cfg(feature = "observability")]
    pub use crate::observability::{init_logging, parse_debug_flags, CrateDebugFlags, LoggingConfig};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!crate::trials::VERSION.is_empty());
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_config_logging_section_is_observability_type() {
        let config = crate::config::EphysConfig::default();
        let logging: &crate::observability::LoggingConfig = &config.logging;
        assert_eq!(logging, &crate::observability::LoggingConfig::default());
    }
}
