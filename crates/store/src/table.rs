use std::collections::{BTreeMap, HashSet};

use linekv_protocol::KeyValue;

use crate::{Result, StoreError, WriteReceipt};

/// An ordered key-value table with all-or-nothing batch writes.
///
/// Both the in-process store and the reference server keep their data here,
/// so the two agree on what a valid batch is.
#[derive(Debug, Default)]
pub struct Table {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
    last_tx: u64,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply every pair or none of them.
    ///
    /// Empty batches and batches that name the same key twice are rejected.
    pub fn set_all(&mut self, kvs: &[KeyValue]) -> Result<WriteReceipt> {
        if kvs.is_empty() {
            return Err(StoreError::Rejected("empty batch".into()));
        }

        let mut seen = HashSet::with_capacity(kvs.len());
        for kv in kvs {
            if !seen.insert(kv.key.as_slice()) {
                return Err(StoreError::Rejected(format!(
                    "duplicate key in batch: {}",
                    String::from_utf8_lossy(&kv.key)
                )));
            }
        }

        for kv in kvs {
            self.entries.insert(kv.key.clone(), kv.value.clone());
        }
        self.last_tx += 1;

        Ok(WriteReceipt {
            tx_id: self.last_tx,
            count: kvs.len(),
        })
    }

    pub fn get_all(&self, keys: &[Vec<u8>]) -> Vec<Option<Vec<u8>>> {
        keys.iter().map(|k| self.entries.get(k).cloned()).collect()
    }

    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Overwrite a single value outside of any batch.
    pub fn put(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_tx(&self) -> u64 {
        self.last_tx
    }

    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.entries.keys().map(Vec::as_slice)
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
