//! Address ledger for duplicate detection.
//!
//! The ledger maps a canonical resource address to the position of the
//! record that first claimed it in the merge output. It is created by the
//! merge engine for a single merge call and handed by reference to the tree
//! walker; nothing outlives the call.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Scoped address → output position map.
#[derive(Debug, Default)]
pub struct Ledger {
    entries: HashMap<String, usize>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of the record that claimed `address`, if any.
    pub fn position(&self, address: &str) -> Option<usize> {
        self.entries.get(address).copied()
    }

    pub fn contains(&self, address: &str) -> bool {
        self.entries.contains_key(address)
    }

    /// Register `address` as placed at `position`.
    ///
    /// An address is only ever claimed once; returns `false` and leaves the
    /// existing entry untouched if it was already present.
    pub fn claim(&mut self, address: impl Into<String>, position: usize) -> bool {
        match self.entries.entry(address.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(position);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
