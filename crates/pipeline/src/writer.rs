use linekv_store::KvStore;
use log::debug;

use crate::{Batch, BatchSink, Mode, PipelineError, StoreOp};

/// Commits each batch with a single atomic store write.
pub struct StoreWriter<S> {
    store: S,
}

impl<S: KvStore> StoreWriter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: KvStore> BatchSink for StoreWriter<S> {
    fn mode(&self) -> Mode {
        Mode::Write
    }

    fn handle(&mut self, batch: &Batch) -> Result<usize, PipelineError> {
        let receipt = self
            .store
            .write_batch(batch.entries())
            .map_err(|source| PipelineError::store(StoreOp::Write, batch, source))?;

        debug!(
            "Committed {} records from ordinal {} in tx {}",
            receipt.count,
            batch.first_ordinal(),
            receipt.tx_id
        );

        Ok(batch.len())
    }
}
