//! Line-to-batch ingestion pipeline.
//!
//! Lines read from an input stream are numbered in arrival order, keyed
//! deterministically, grouped into fixed-size batches and either committed to
//! a [`KvStore`](linekv_store::KvStore) or checked against what it already
//! holds.

mod batch;
mod config;
mod driver;
mod error;
mod keys;
mod sink;
mod source;
mod stats;
mod verifier;
mod writer;

pub use batch::{Batch, BatchAccumulator, Batches, Record};
pub use config::{ConfigError, Mode, PipelineConfig};
pub use driver::{Connected, Pipeline, Starting};
pub use error::{PipelineError, StoreOp};
pub use keys::{KEY_DIGITS, make_key};
pub use sink::BatchSink;
pub use source::LineSource;
pub use stats::RunStats;
pub use verifier::StoreVerifier;
pub use writer::StoreWriter;
