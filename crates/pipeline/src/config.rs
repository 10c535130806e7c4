use std::{fmt, num::NonZeroUsize};

use linekv_protocol::MAX_FRAME_LEN;
use linekv_runtime::{
    DEFAULT_BATCH_SIZE, DEFAULT_KEY_PREFIX, DEFAULT_MAX_LINE_BYTES, DEFAULT_QUEUE_DEPTH,
};

/// Which role consumes the batches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Commit every batch to the store.
    #[default]
    Write,
    /// Read every batch back and compare it with the input.
    Verify,
}

impl Mode {
    /// Verb for the per-batch progress line.
    pub fn progress_verb(self) -> &'static str {
        match self {
            Mode::Write => "Inserted",
            Mode::Verify => "Read",
        }
    }

    /// Verb for the final summary line.
    pub fn summary_verb(self) -> &'static str {
        match self {
            Mode::Write => "inserted",
            Mode::Verify => "read",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Write => f.write_str("write"),
            Mode::Verify => f.write_str("verify"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("batch size must be at least 1")]
    ZeroBatchSize,

    #[error("maximum line length must be at least 1 byte")]
    ZeroMaxLineBytes,

    #[error(
        "a batch of {batch_size} lines of up to {max_line_bytes} bytes can exceed \
         the {limit} byte request limit; lower --batchsize or --max-line-bytes"
    )]
    BatchTooLarge {
        batch_size: usize,
        max_line_bytes: usize,
        limit: usize,
    },
}

/// Bytes a record can add to a request beyond its value and key prefix: the
/// key digits (a u128 ordinal) and the encoder's length prefixes.
const RECORD_OVERHEAD: usize = 64;

/// Settings for one pipeline run. Built once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub mode: Mode,
    /// Records per store request.
    pub batch_size: usize,
    /// Added to every ordinal when building keys.
    pub offset: u64,
    /// Prepended to every key.
    pub prefix: String,
    /// Capacity of the handoff queue between reader and consumer.
    /// Zero makes every send wait for the consumer.
    pub queue_depth: usize,
    /// Longer lines end the input as a read error.
    pub max_line_bytes: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Write,
            batch_size: DEFAULT_BATCH_SIZE,
            offset: 0,
            prefix: DEFAULT_KEY_PREFIX.to_string(),
            queue_depth: DEFAULT_QUEUE_DEPTH,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

impl PipelineConfig {
    /// Check the settings, returning the batch size in its non-zero form.
    pub fn validate(&self) -> Result<NonZeroUsize, ConfigError> {
        if self.max_line_bytes == 0 {
            return Err(ConfigError::ZeroMaxLineBytes);
        }
        let batch_size = NonZeroUsize::new(self.batch_size).ok_or(ConfigError::ZeroBatchSize)?;

        if self.worst_case_request() > MAX_FRAME_LEN {
            return Err(ConfigError::BatchTooLarge {
                batch_size: self.batch_size,
                max_line_bytes: self.max_line_bytes,
                limit: MAX_FRAME_LEN,
            });
        }

        Ok(batch_size)
    }

    /// Encoded size of a full batch of maximum-length lines, rounded up.
    fn worst_case_request(&self) -> usize {
        let per_record = self
            .max_line_bytes
            .saturating_add(self.prefix.len())
            .saturating_add(RECORD_OVERHEAD);
        self.batch_size.saturating_mul(per_record)
    }
}
