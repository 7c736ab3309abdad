// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Block-specific event code tables

use crate::error::{Result, TrialsError};
use std::collections::BTreeMap;

/// Event name to numeric code, per block.
///
/// The set of supported blocks is exactly the set of blocks registered in
/// the table. Recordings of this task use blocks 1 and 2.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventTable {
    blocks: BTreeMap<i64, BTreeMap<String, i64>>,
}

impl EventTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`EventTable::insert_block`].
    ///
    /// # Examples
    /// ```
    /// use ephysvibe_trials::EventTable;
    ///
    /// let table = EventTable::new()
    ///     .with_block(1, [("sample_on", 23), ("test_on_1", 25)])
    ///     .with_block(2, [("sample_on", 23)]);
    /// assert_eq!(table.code_for(1, "test_on_1").unwrap(), 25);
    /// assert!(table.code_for(3, "sample_on").is_err());
    /// ```
    pub fn with_block<I, K>(mut self, block: i64, events: I) -> Self
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<String>,
    {
        self.insert_block(block, events);
        self
    }

    /// Register (or extend) the event table of `block`.
    pub fn insert_block<I, K>(&mut self, block: i64, events: I)
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<String>,
    {
        let table = self.blocks.entry(block).or_default();
        for (name, code) in events {
            table.insert(name.into(), code);
        }
    }

    /// Resolve `event` to its numeric code within `block`.
    ///
    /// # Errors
    /// * `UnknownBlock` - no table is registered for `block`
    /// * `UnknownEvent` - the block's table has no entry named `event`
    pub fn code_for(&self, block: i64, event: &str) -> Result<i64> {
        let table = self.blocks.get(&block).ok_or_else(|| TrialsError::UnknownBlock {
            block,
            known: self.blocks(),
        })?;
        table
            .get(event)
            .copied()
            .ok_or_else(|| TrialsError::UnknownEvent {
                block,
                event: event.to_string(),
            })
    }

    /// Registered block ids in ascending order
    pub fn blocks(&self) -> Vec<i64> {
        self.blocks.keys().copied().collect()
    }

    /// Event names of `block` with their codes, sorted by name
    pub fn events(&self, block: i64) -> Option<impl Iterator<Item = (&str, i64)>> {
        self.blocks
            .get(&block)
            .map(|table| table.iter().map(|(name, code)| (name.as_str(), *code)))
    }
}
