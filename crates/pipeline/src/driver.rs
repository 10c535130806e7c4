use std::{io::BufRead, num::NonZeroUsize, thread, time::Instant};

use crossbeam::channel::{self, Receiver, Sender};
use linekv_store::{KvStore, StoreError};
use log::{debug, info};

use crate::{
    Batch, BatchAccumulator, BatchSink, LineSource, Mode, PipelineConfig, PipelineError, RunStats,
    StoreVerifier, StoreWriter,
};

/// Configuration checked, no store session yet.
pub struct Starting;

/// Store session open, ready to consume input.
pub struct Connected<S> {
    store: S,
}

/// A single ingestion or verification run.
///
/// Uses typestate to enforce the order of operations: a [`Pipeline`] is
/// created from a validated configuration, then given a store session, then
/// run exactly once.
///
/// - `Pipeline<Starting>`     => configuration accepted
/// - `Pipeline<Connected<S>>` => owns the store session
pub struct Pipeline<St> {
    config: PipelineConfig,
    batch_size: NonZeroUsize,
    state: St,
}

impl Pipeline<Starting> {
    /// Validate `config`. Nothing is opened or read yet.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        let batch_size = config.validate()?;
        Ok(Self {
            config,
            batch_size,
            state: Starting,
        })
    }

    /// Open the store session with `connect`.
    pub fn connect<S, F>(self, connect: F) -> Result<Pipeline<Connected<S>>, PipelineError>
    where
        F: FnOnce() -> Result<S, StoreError>,
    {
        let store = connect().map_err(PipelineError::Connect)?;
        Ok(self.with_store(store))
    }

    /// Use an already open store session.
    pub fn with_store<S>(self, store: S) -> Pipeline<Connected<S>> {
        let Pipeline {
            config,
            batch_size,
            state: Starting,
        } = self;

        Pipeline {
            config,
            batch_size,
            state: Connected { store },
        }
    }
}

impl<St> Pipeline<St> {
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

impl<S: KvStore + Send + 'static> Pipeline<Connected<S>> {
    /// Feed `input` through the pipeline until it is exhausted or a batch
    /// fails.
    ///
    /// A reader thread hands lines to a consumer thread over a bounded
    /// queue; the consumer owns the store and processes one batch at a
    /// time. A failed batch is returned as soon as the consumer stops. The
    /// reader is left behind in that case, since it may be parked on input
    /// that never arrives, and it exits at its next send.
    pub fn run<R>(self, input: R) -> Result<RunStats, PipelineError>
    where
        R: BufRead + Send + 'static,
    {
        let Pipeline {
            config,
            batch_size,
            state: Connected { store },
        } = self;

        let mode = config.mode;
        let acc = BatchAccumulator::new(config.prefix.clone(), config.offset, batch_size);
        let (line_tx, line_rx) = channel::bounded::<Vec<u8>>(config.queue_depth);
        let source = LineSource::new(input, config.max_line_bytes);

        debug!(
            "Starting {mode} run: batch_size={}, offset={}, prefix={:?}, queue_depth={}",
            batch_size, config.offset, config.prefix, config.queue_depth
        );

        let reader = thread::Builder::new()
            .name("linekv-reader".into())
            .spawn(move || produce(source, line_tx))
            .map_err(PipelineError::Spawn)?;

        let consumer = thread::Builder::new()
            .name("linekv-batcher".into())
            .spawn(move || match mode {
                Mode::Write => consume(line_rx, acc, StoreWriter::new(store)),
                Mode::Verify => consume(line_rx, acc, StoreVerifier::new(store)),
            })
            .map_err(PipelineError::Spawn)?;

        let mut stats = consumer
            .join()
            .unwrap_or(Err(PipelineError::ConsumerPanicked))?;

        // The consumer only finishes cleanly once the queue is closed, so the
        // reader has already returned.
        stats.read_error = reader.join().map_err(|_| PipelineError::ReaderPanicked)?;

        info!(
            "DONE: {} {} lines in {:?} ({:.0} lines/s)",
            mode.summary_verb(),
            stats.lines,
            stats.elapsed,
            stats.lines_per_sec()
        );

        Ok(stats)
    }
}

/// Push every input line into the queue. Returns when the input ends or the
/// consumer has gone away; dropping `line_tx` tells the consumer no more
/// lines are coming. The result is whether reading stopped on an I/O error.
fn produce<R: BufRead>(mut source: LineSource<R>, line_tx: Sender<Vec<u8>>) -> bool {
    for line in source.by_ref() {
        if line_tx.send(line).is_err() {
            debug!("Batch consumer stopped; no longer reading input");
            break;
        }
    }
    source.hit_read_error()
}

/// Drain the queue into batches and hand each one to `sink`, flushing the
/// trailing partial batch once the queue is closed.
fn consume<K: BatchSink>(
    line_rx: Receiver<Vec<u8>>,
    mut acc: BatchAccumulator,
    mut sink: K,
) -> Result<RunStats, PipelineError> {
    let mut stats = RunStats::default();
    let started = Instant::now();

    for line in line_rx.iter() {
        if let Some(batch) = acc.push(line) {
            deliver(&mut sink, &batch, &mut stats)?;
        }
    }

    if let Some(batch) = acc.finish() {
        deliver(&mut sink, &batch, &mut stats)?;
    }

    stats.elapsed = started.elapsed();
    Ok(stats)
}

fn deliver<K: BatchSink>(
    sink: &mut K,
    batch: &Batch,
    stats: &mut RunStats,
) -> Result<(), PipelineError> {
    let n = sink.handle(batch)?;
    stats.record_batch(n);
    info!("{} {} lines", sink.mode().progress_verb(), stats.lines);
    Ok(())
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
