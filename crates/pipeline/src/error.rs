use std::fmt;

use linekv_store::StoreError;

use crate::{Batch, config::ConfigError};

/// The store operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Write,
    Read,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreOp::Write => f.write_str("submit the batch"),
            StoreOp::Read => f.write_str("read the batch"),
        }
    }
}

/// Everything that ends a run early. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to use the database: {0}")]
    Connect(#[source] StoreError),

    #[error("failed to {op} (first key {first_key}): {source}")]
    Store {
        op: StoreOp,
        first_key: String,
        #[source]
        source: StoreError,
    },

    #[error("store returned {got} values for {expected} keys")]
    ShortRead { expected: usize, got: usize },

    #[error("missing value for {key}")]
    Missing { key: String },

    #[error("mismatch at {key}: {expected:?} <> {actual:?}")]
    Mismatch {
        key: String,
        expected: String,
        actual: String,
    },

    #[error("failed to start pipeline thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("batch consumer panicked")]
    ConsumerPanicked,

    #[error("input reader panicked")]
    ReaderPanicked,
}

impl PipelineError {
    pub(crate) fn store(op: StoreOp, batch: &Batch, source: StoreError) -> Self {
        PipelineError::Store {
            op,
            first_key: batch.first_key(),
            source,
        }
    }

    /// True for errors found at startup, before any input was read.
    pub fn is_config(&self) -> bool {
        matches!(self, PipelineError::Config(_))
    }
}
