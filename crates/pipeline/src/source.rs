use std::io::{self, BufRead, Read};

use log::warn;

/// Lazily splits a byte stream into lines.
///
/// Each item is one line without its `\n` (or `\r\n`) terminator. A last line
/// without a terminator is still yielded. The iterator ends at end of input or
/// at the first read error; a read error is logged and remembered, never
/// returned, so whatever was read before it still gets processed.
pub struct LineSource<R> {
    reader: R,
    max_line_bytes: usize,
    done: bool,
    read_error: bool,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R, max_line_bytes: usize) -> Self {
        Self {
            reader,
            max_line_bytes,
            done: false,
            read_error: false,
        }
    }

    /// Whether the input ended with a read error rather than a clean EOF.
    pub fn hit_read_error(&self) -> bool {
        self.read_error
    }

    fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut buf = Vec::new();
        // Room for the longest accepted line plus "\r\n".
        let limit = self.max_line_bytes as u64 + 2;
        let n = (&mut self.reader).take(limit).read_until(b'\n', &mut buf)?;
        if n == 0 {
            return Ok(None);
        }

        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }

        if buf.len() > self.max_line_bytes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("line longer than {} bytes", self.max_line_bytes),
            ));
        }

        Ok(Some(buf))
    }
}

impl<R: BufRead> Iterator for LineSource<R> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.read_line() {
            Ok(Some(line)) => Some(line),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                warn!("Input read error, treating as end of input: {err}");
                self.done = true;
                self.read_error = true;
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
