// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Checks that event tables are well formed and that the default alignment
//! parameters can be resolved against them.

use crate::types::parse_block_key;
use crate::{ConfigError, ConfigResult, EphysConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    InvalidBlockKey { key: String },
    EmptyEventTable { block: String },
    UnknownSelectBlock { block: i64 },
    UnknownDefaultEvent { block: i64, event: String },
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBlockKey { key } => {
                write!(f, "events.{} is not an integer block id", key)
            }
            Self::EmptyEventTable { block } => {
                write!(f, "events.{} declares no event codes", block)
            }
            Self::UnknownSelectBlock { block } => {
                write!(f, "alignment.select_block = {} has no [events.{}] table", block, block)
            }
            Self::UnknownDefaultEvent { block, event } => {
                write!(f, "alignment.event '{}' is not defined in events.{}", event, block)
            }
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Integer block keys with non-empty event tables
/// - A default event that resolves in the default block
/// - Valid value ranges
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every violation found
pub fn validate_config(config: &EphysConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_event_tables(config, &mut errors);
    validate_alignment(config, &mut errors);
    validate_logging(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_event_tables(config: &EphysConfig, errors: &mut Vec<ConfigValidationError>) {
    for (key, events) in &config.events {
        if parse_block_key(key).is_err() {
            errors.push(ConfigValidationError::InvalidBlockKey { key: key.clone() });
        }
        if events.is_empty() {
            errors.push(ConfigValidationError::EmptyEventTable { block: key.clone() });
        }
    }
}

fn validate_alignment(config: &EphysConfig, errors: &mut Vec<ConfigValidationError>) {
    let alignment = &config.alignment;

    if alignment.event.trim().is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "alignment.event".to_string(),
        });
    }

    if alignment.time_before < 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "alignment.time_before".to_string(),
            reason: format!("must be non-negative, got {}", alignment.time_before),
        });
    }

    let block_table = config
        .events
        .iter()
        .find(|(key, _)| parse_block_key(key).ok() == Some(alignment.select_block));
    match block_table {
        None => errors.push(ConfigValidationError::UnknownSelectBlock {
            block: alignment.select_block,
        }),
        Some((_, events)) if !alignment.event.trim().is_empty() && !events.contains_key(&alignment.event) => {
            errors.push(ConfigValidationError::UnknownDefaultEvent {
                block: alignment.select_block,
                event: alignment.event.clone(),
            })
        }
        Some(_) => {}
    }
}

fn validate_logging(config: &EphysConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("must be one of {}, got '{}'", LOG_LEVELS.join("/"), config.logging.level),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn valid_config() -> EphysConfig {
        let mut config = EphysConfig::default();
        for block in ["1", "2"] {
            config.events.insert(
                block.to_string(),
                BTreeMap::from([("sample_on".to_string(), 23), ("test_on_1".to_string(), 25)]),
            );
        }
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_default_config_has_no_event_tables() {
        // No [events.1] section, so the default select_block cannot resolve
        let result = validate_config(&EphysConfig::default());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("alignment.select_block"));
    }

    #[test]
    fn test_unknown_default_event() {
        let mut config = valid_config();
        config.alignment.event = "reward".to_string();
        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("'reward'"));
    }

    #[test]
    fn test_all_errors_reported() {
        let mut config = valid_config();
        config.events.insert("two".to_string(), BTreeMap::new());
        config.alignment.time_before = -5;
        config.logging.level = "verbose".to_string();

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("events.two is not an integer"));
        assert!(message.contains("events.two declares no event codes"));
        assert!(message.contains("alignment.time_before"));
        assert!(message.contains("logging.level"));
    }

    #[test]
    fn test_empty_event_name() {
        let mut config = valid_config();
        config.alignment.event = "  ".to_string();
        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("Missing required configuration: alignment.event"));
    }
}
