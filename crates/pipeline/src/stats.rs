use std::time::Duration;

/// Counters for one run, reported once when it ends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    /// Records written or verified.
    pub lines: u64,
    /// Store requests issued.
    pub batches: u64,
    /// Wall time from the start of consumption to the last batch.
    pub elapsed: Duration,
    /// Input ended with a read error instead of a clean EOF.
    pub read_error: bool,
}

impl RunStats {
    pub(crate) fn record_batch(&mut self, lines: usize) {
        self.lines += lines as u64;
        self.batches += 1;
    }

    /// Throughput over the whole run; zero when nothing was timed.
    pub fn lines_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.lines as f64 / secs
        } else {
            0.0
        }
    }
}
