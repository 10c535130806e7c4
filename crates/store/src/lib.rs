//! Client side of the key-value store used by the ingestion pipeline.
//!
//! [`KvStore`] is the whole contract the pipeline relies on: one atomic
//! multi-key write and one positional multi-key read. [`RemoteStore`] speaks
//! the wire protocol over TCP; [`MemoryStore`] keeps everything in process.

mod error;
mod memory;
mod remote;
mod table;

pub use error::{Result, StoreError};
pub use linekv_protocol::KeyValue;
pub use memory::{MemoryStore, StoreCall};
pub use remote::{ConnectOptions, RemoteStore};
pub use table::Table;

/// Acknowledgement of a committed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReceipt {
    pub tx_id: u64,
    pub count: usize,
}

/// Storage contract for batch ingestion.
///
/// A store handle belongs to one caller at a time; implementations need to be
/// `Send` so the handle can move into the consumer thread, not `Sync`.
pub trait KvStore {
    /// Commit every pair in `kvs` as one atomic write.
    fn write_batch(&mut self, kvs: &[KeyValue]) -> Result<WriteReceipt>;

    /// Fetch the values stored under `keys`.
    ///
    /// The result has one slot per key, in request order; `None` marks a key
    /// the store does not hold.
    fn read_batch(&mut self, keys: &[Vec<u8>]) -> Result<Vec<Option<Vec<u8>>>>;
}

impl<S: KvStore + ?Sized> KvStore for Box<S> {
    fn write_batch(&mut self, kvs: &[KeyValue]) -> Result<WriteReceipt> {
        (**self).write_batch(kvs)
    }

    fn read_batch(&mut self, keys: &[Vec<u8>]) -> Result<Vec<Option<Vec<u8>>>> {
        (**self).read_batch(keys)
    }
}
