use crate::{Batch, Mode, PipelineError};

/// Consumer end of the pipeline: does something with each completed batch.
pub trait BatchSink {
    /// Which pipeline role this sink plays.
    fn mode(&self) -> Mode;

    /// Process one batch, returning how many records it covered.
    ///
    /// Any error ends the run.
    fn handle(&mut self, batch: &Batch) -> Result<usize, PipelineError>;
}

impl<K: BatchSink + ?Sized> BatchSink for Box<K> {
    fn mode(&self) -> Mode {
        (**self).mode()
    }

    fn handle(&mut self, batch: &Batch) -> Result<usize, PipelineError> {
        (**self).handle(batch)
    }
}
