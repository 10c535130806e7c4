use std::sync::{Arc, Mutex, MutexGuard};

use linekv_protocol::KeyValue;

use crate::{KvStore, Result, StoreError, Table, WriteReceipt};

/// A store request as recorded by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Write { keys: Vec<Vec<u8>> },
    Read { keys: Vec<Vec<u8>> },
}

#[derive(Debug, Default)]
struct Shared {
    table: Table,
    calls: Vec<StoreCall>,
    fail_write_at: Option<usize>,
    fail_read_at: Option<usize>,
}

/// In-process store.
///
/// Clones share the same table, so a test can hand one clone to the pipeline
/// and inspect the data and request log through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        // Table::set_all validates before mutating, so a poisoned table is
        // still consistent.
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Fail the `n`-th write request (0-based) with [`StoreError::Rejected`].
    pub fn fail_write_at(self, n: usize) -> Self {
        self.lock().fail_write_at = Some(n);
        self
    }

    /// Fail the `n`-th read request (0-based) with [`StoreError::Rejected`].
    pub fn fail_read_at(self, n: usize) -> Self {
        self.lock().fail_read_at = Some(n);
        self
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    pub fn write_calls(&self) -> usize {
        self.lock().write_count()
    }

    pub fn read_calls(&self) -> usize {
        self.lock().read_count()
    }

    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.lock().table.get(key).map(<[u8]>::to_vec)
    }

    pub fn put(&self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.lock().table.put(key, value);
    }

    pub fn len(&self) -> usize {
        self.lock().table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().table.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn write_batch(&mut self, kvs: &[KeyValue]) -> Result<WriteReceipt> {
        let mut shared = self.lock();
        let nth = shared.write_count();
        shared.calls.push(StoreCall::Write {
            keys: kvs.iter().map(|kv| kv.key.clone()).collect(),
        });

        if shared.fail_write_at == Some(nth) {
            return Err(StoreError::Rejected(format!("injected failure on write {nth}")));
        }

        shared.table.set_all(kvs)
    }

    fn read_batch(&mut self, keys: &[Vec<u8>]) -> Result<Vec<Option<Vec<u8>>>> {
        let mut shared = self.lock();
        let nth = shared.read_count();
        shared.calls.push(StoreCall::Read {
            keys: keys.to_vec(),
        });

        if shared.fail_read_at == Some(nth) {
            return Err(StoreError::Rejected(format!("injected failure on read {nth}")));
        }

        Ok(shared.table.get_all(keys))
    }
}

impl Shared {
    fn write_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, StoreCall::Write { .. }))
            .count()
    }

    fn read_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, StoreCall::Read { .. }))
            .count()
    }
}
