use linekv_store::KvStore;

use crate::{Batch, BatchSink, Mode, PipelineError, StoreOp};

/// Reads each batch back from the store and compares it with the input.
///
/// The store answers in request order, so values are compared by position.
/// The first difference ends the run.
pub struct StoreVerifier<S> {
    store: S,
}

impl<S: KvStore> StoreVerifier<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: KvStore> BatchSink for StoreVerifier<S> {
    fn mode(&self) -> Mode {
        Mode::Verify
    }

    fn handle(&mut self, batch: &Batch) -> Result<usize, PipelineError> {
        let stored = self
            .store
            .read_batch(&batch.keys())
            .map_err(|source| PipelineError::store(StoreOp::Read, batch, source))?;

        if stored.len() != batch.len() {
            return Err(PipelineError::ShortRead {
                expected: batch.len(),
                got: stored.len(),
            });
        }

        for (expected, actual) in batch.entries().iter().zip(stored) {
            let key = || String::from_utf8_lossy(&expected.key).into_owned();
            match actual {
                None => return Err(PipelineError::Missing { key: key() }),
                Some(actual) if actual != expected.value => {
                    return Err(PipelineError::Mismatch {
                        key: key(),
                        expected: String::from_utf8_lossy(&expected.value).into_owned(),
                        actual: String::from_utf8_lossy(&actual).into_owned(),
                    });
                }
                Some(_) => {}
            }
        }

        Ok(batch.len())
    }
}

#[cfg(test)]
#[path = "verifier_tests.rs"]
mod tests;
