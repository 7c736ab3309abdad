// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later ones win:
//! 1. TOML file (base values)
//! 2. Environment variables
//! 3. CLI arguments

use crate::{ConfigError, ConfigResult, EphysConfig};
use ephysvibe_trials::MultiMatchPolicy;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const CONFIG_FILE_NAME: &str = "ephysvibe_configuration.toml";

/// Find the configuration file
///
/// Search order:
/// 1. `EPHYS_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to five parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("EPHYS_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by EPHYS_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        for ancestor in cwd.ancestors().skip(1).take(5) {
            search_paths.push(ancestor.join(CONFIG_FILE_NAME));
        }
    }

    if let Some(path) = search_paths.iter().find(|p| p.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet EPHYS_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from a TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, the file is searched for.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the file is not found or contains invalid TOML.
/// Validation is left to [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<EphysConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };
    debug!(target: "ephysvibe-config", path = %config_file.display(), "loading configuration");

    let content = fs::read_to_string(&config_file)?;
    let mut config: EphysConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `EPHYS_SELECT_BLOCK` -> `alignment.select_block`
/// - `EPHYS_EVENT` -> `alignment.event`
/// - `EPHYS_TIME_BEFORE` -> `alignment.time_before`
/// - `EPHYS_ERROR_TYPE` -> `alignment.error_type`
/// - `EPHYS_SELECT_POS` -> `alignment.select_pos`
/// - `EPHYS_MULTI_MATCH` -> `alignment.multi_match`
/// - `EPHYS_LOG_LEVEL` -> `logging.level`
pub fn apply_environment_overrides(config: &mut EphysConfig) {
    let lookup = |key: &str| env::var(format!("EPHYS_{}", key.to_uppercase())).ok();
    apply_overrides(config, lookup);
}

/// Apply CLI argument overrides to configuration
///
/// Keys are the field names, optionally qualified by section
/// (e.g. `{"time_before": "250"}` or `{"alignment.time_before": "250"}`).
pub fn apply_cli_overrides(config: &mut EphysConfig, cli_args: &HashMap<String, String>) {
    let lookup = |key: &str| {
        let qualified = match key {
            "log_level" => "logging.level".to_string(),
            _ => format!("alignment.{}", key),
        };
        cli_args.get(&qualified).or_else(|| cli_args.get(key)).cloned()
    };
    apply_overrides(config, lookup);
}

fn apply_overrides<F>(config: &mut EphysConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let alignment = &mut config.alignment;
    if let Some(value) = lookup("select_block") {
        set_parsed("select_block", &value, &mut alignment.select_block);
    }
    if let Some(value) = lookup("event") {
        alignment.event = value;
    }
    if let Some(value) = lookup("time_before") {
        set_parsed("time_before", &value, &mut alignment.time_before);
    }
    if let Some(value) = lookup("error_type") {
        set_parsed("error_type", &value, &mut alignment.error_type);
    }
    if let Some(value) = lookup("select_pos") {
        set_parsed("select_pos", &value, &mut alignment.select_pos);
    }
    if let Some(value) = lookup("multi_match") {
        set_parsed::<MultiMatchPolicy>("multi_match", &value, &mut alignment.multi_match);
    }
    if let Some(value) = lookup("log_level") {
        config.logging.level = value;
    }
}

/// Unparseable values leave the field untouched
fn set_parsed<T: std::str::FromStr>(key: &str, value: &str, field: &mut T) {
    match value.trim().parse::<T>() {
        Ok(parsed) => *field = parsed,
        Err(_) => warn!(target: "ephysvibe-config", key, value, "ignoring unparseable override"),
    }
}
