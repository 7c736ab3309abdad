// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Structs mapping to the sections of `ephysvibe_configuration.toml`.

use crate::{ConfigError, ConfigResult};
use ephysvibe_observability::LoggingConfig;
use ephysvibe_trials::{AlignParams, EventTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration structure
///
/// ```toml
/// [alignment]
/// event = "sample_on"
/// time_before = 500
///
/// [events.1]
/// sample_on = 23
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EphysConfig {
    pub logging: LoggingConfig,
    pub alignment: AlignParams,
    /// Block id (as a TOML key) to event name to code
    pub events: BTreeMap<String, BTreeMap<String, i64>>,
}

impl EphysConfig {
    /// Build the block event tables declared under `[events.<block>]`.
    ///
    /// # Errors
    /// `InvalidValue` when a block key is not an integer.
    pub fn event_table(&self) -> ConfigResult<EventTable> {
        let mut table = EventTable::new();
        for (key, events) in &self.events {
            let block = parse_block_key(key)?;
            table.insert_block(block, events.iter().map(|(name, code)| (name.clone(), *code)));
        }
        Ok(table)
    }

    /// Alignment parameters used when the caller does not supply its own
    pub fn align_params(&self) -> AlignParams {
        self.alignment.clone()
    }
}

pub(crate) fn parse_block_key(key: &str) -> ConfigResult<i64> {
    key.trim().parse::<i64>().map_err(|_| {
        ConfigError::InvalidValue(format!("events.{}: block id must be an integer", key))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_table_from_sections() {
        let mut config = EphysConfig::default();
        config
            .events
            .insert("1".to_string(), BTreeMap::from([("sample_on".to_string(), 23)]));
        config
            .events
            .insert("2".to_string(), BTreeMap::from([("sample_on".to_string(), 43)]));

        let table = config.event_table().unwrap();
        assert_eq!(table.blocks(), vec![1, 2]);
        assert_eq!(table.code_for(2, "sample_on").unwrap(), 43);
    }

    #[test]
    fn test_non_integer_block_key() {
        let mut config = EphysConfig::default();
        config.events.insert("b1".to_string(), BTreeMap::new());
        assert!(matches!(config.event_table(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_default_alignment_matches_trials_defaults() {
        assert_eq!(EphysConfig::default().align_params(), AlignParams::default());
    }
}
