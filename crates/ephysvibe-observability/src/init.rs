// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Installs a console layer (text or JSON) and, with the `file-logging`
//! feature, a daily-rotated JSON log file.

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingConfig};

/// Keeps background log writers alive; logs are flushed on drop.
#[derive(Default)]
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Parse the filter directives produced by `debug_flags` for `config.level`.
pub fn build_filter(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<EnvFilter> {
    let directives = debug_flags.to_filter_string(&config.level);
    EnvFilter::try_new(&directives).with_context(|| format!("Invalid log filter: {}", directives))
}

/// Initialize the global tracing subscriber
///
/// # Arguments
/// * `debug_flags` - Crates raised to debug level
/// * `config` - Base level, console format and optional log directory
///
/// # Errors
/// Fails on an invalid level, an uncreatable log directory, or when a global
/// subscriber is already installed.
pub fn init_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<LoggingGuard> {
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let console = tracing_subscriber::fmt::layer().with_target(false);
    let console = match config.format {
        LogFormat::Text => console.with_filter(build_filter(debug_flags, config)?).boxed(),
        LogFormat::Json => console
            .json()
            .with_filter(build_filter(debug_flags, config)?)
            .boxed(),
    };
    layers.push(console);

    let guard = attach_file_layer(&mut layers, debug_flags, config)?;

    Registry::default()
        .with(layers)
        .try_init()
        .context("Failed to install global tracing subscriber")?;

    Ok(guard)
}

#[cfg(feature = "file-logging")]
fn attach_file_layer(
    layers: &mut Vec<Box<dyn Layer<Registry> + Send + Sync>>,
    debug_flags: &CrateDebugFlags,
    config: &LoggingConfig,
) -> Result<LoggingGuard> {
    let Some(log_dir) = &config.log_dir else {
        return Ok(LoggingGuard::default());
    };
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let appender = tracing_appender::rolling::daily(log_dir, "ephysvibe.log");
    let (non_blocking, file_guard) = tracing_appender::non_blocking(appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .with_filter(build_filter(debug_flags, config)?)
        .boxed();
    layers.push(file_layer);

    Ok(LoggingGuard {
        _file_guard: Some(file_guard),
    })
}

#[cfg(not(feature = "file-logging"))]
fn attach_file_layer(
    _layers: &mut Vec<Box<dyn Layer<Registry> + Send + Sync>>,
    _debug_flags: &CrateDebugFlags,
    config: &LoggingConfig,
) -> Result<LoggingGuard> {
    if let Some(log_dir) = &config.log_dir {
        tracing::warn!(
            target: "ephysvibe-observability",
            log_dir = %log_dir.display(),
            "log_dir is set but the file-logging feature is disabled"
        );
    }
    Ok(LoggingGuard::default())
}

/// Initialize logging from process arguments and `EPHYS_DEBUG` with default settings
pub fn init_logging_default() -> Result<LoggingGuard> {
    init_logging(&crate::cli::parse_debug_flags(), &LoggingConfig::default())
}
