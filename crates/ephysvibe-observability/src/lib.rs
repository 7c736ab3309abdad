// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # ephysvibe-observability
//!
//! Logging setup shared by the ephysvibe crates, with per-crate debug flag support.
//!
//! ## Features
//! - `file-logging`: daily-rotated log file next to console output

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Crate names accepted by `--debug-<crate>` flags
pub const KNOWN_CRATES: &[&str] = &["ephysvibe-trials", "ephysvibe-config", "ephysvibe-observability"];
