// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Event-aligned trial extraction
//!
//! Selects trials of a recording session by behavioral condition (block,
//! error code, stimulus position) and re-aligns their spike rasters so a
//! chosen behavioral event occurs at a fixed time bin.
//!
//! - **roll**: independent per-row circular rotation ([`indep_roll`])
//! - **events**: block-specific event name to code tables ([`EventTable`])
//! - **selection**: trial masks and event slot lookup
//! - **align**: the alignment itself ([`align_on`])
//!
//! All operations are pure: inputs are borrowed, outputs freshly allocated.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod align;
pub mod error;
pub mod events;
pub mod roll;
pub mod selection;

pub use align::{align_on, AlignParams, AlignedTrials, MultiMatchPolicy, SessionTrials};
pub use error::{Result, TrialsError};
pub use events::EventTable;
pub use roll::{indep_roll, roll_trials};
pub use selection::{event_slots, selection_mask, TrialCriteria};
