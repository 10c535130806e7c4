use std::num::NonZeroUsize;

use linekv_protocol::KeyValue;

use crate::keys::make_key;

/// One input line with its 0-based arrival position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub ordinal: u64,
    pub value: Vec<u8>,
}

impl Record {
    pub fn into_entry(self, prefix: &str, offset: u64) -> KeyValue {
        KeyValue {
            key: make_key(prefix, offset, self.ordinal).into_bytes(),
            value: self.value,
        }
    }
}

/// Consecutive records, keyed, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    first_ordinal: u64,
    entries: Vec<KeyValue>,
}

impl Batch {
    /// Arrival position of the first record in the batch.
    pub fn first_ordinal(&self) -> u64 {
        self.first_ordinal
    }

    pub fn entries(&self) -> &[KeyValue] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<KeyValue> {
        self.entries
    }

    pub fn keys(&self) -> Vec<Vec<u8>> {
        self.entries.iter().map(|kv| kv.key.clone()).collect()
    }

    pub fn first_key(&self) -> String {
        self.entries
            .first()
            .map(|kv| String::from_utf8_lossy(&kv.key).into_owned())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Groups lines into batches of a fixed size.
///
/// Boundaries depend only on how many lines have arrived: every batch is full
/// except possibly the one returned by [`finish`](Self::finish).
#[derive(Debug)]
pub struct BatchAccumulator {
    prefix: String,
    offset: u64,
    batch_size: NonZeroUsize,
    next_ordinal: u64,
    buf: Vec<KeyValue>,
}

impl BatchAccumulator {
    pub fn new(prefix: impl Into<String>, offset: u64, batch_size: NonZeroUsize) -> Self {
        Self {
            prefix: prefix.into(),
            offset,
            batch_size,
            next_ordinal: 0,
            buf: Vec::with_capacity(batch_size.get()),
        }
    }

    /// Ordinal the next pushed line will get.
    pub fn next_ordinal(&self) -> u64 {
        self.next_ordinal
    }

    /// Lines held back until the current batch fills up.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Add one line; returns the batch it completes, if any.
    pub fn push(&mut self, value: Vec<u8>) -> Option<Batch> {
        let record = Record {
            ordinal: self.next_ordinal,
            value,
        };
        self.next_ordinal += 1;
        self.buf.push(record.into_entry(&self.prefix, self.offset));

        if self.buf.len() == self.batch_size.get() {
            Some(self.take())
        } else {
            None
        }
    }

    /// End of input: hand out the trailing partial batch, if there is one.
    pub fn finish(mut self) -> Option<Batch> {
        if self.buf.is_empty() {
            None
        } else {
            Some(self.take())
        }
    }

    fn take(&mut self) -> Batch {
        let entries = std::mem::replace(&mut self.buf, Vec::with_capacity(self.batch_size.get()));
        Batch {
            first_ordinal: self.next_ordinal - entries.len() as u64,
            entries,
        }
    }
}

/// Iterator adapter turning a sequence of lines into a sequence of batches.
pub struct Batches<I> {
    lines: I,
    acc: Option<BatchAccumulator>,
}

impl<I> Batches<I>
where
    I: Iterator<Item = Vec<u8>>,
{
    pub fn new(lines: I, acc: BatchAccumulator) -> Self {
        Self {
            lines,
            acc: Some(acc),
        }
    }
}

impl<I> Iterator for Batches<I>
where
    I: Iterator<Item = Vec<u8>>,
{
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        loop {
            let acc = self.acc.as_mut()?;
            match self.lines.next() {
                Some(line) => {
                    if let Some(batch) = acc.push(line) {
                        return Some(batch);
                    }
                }
                None => return self.acc.take()?.finish(),
            }
        }
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
