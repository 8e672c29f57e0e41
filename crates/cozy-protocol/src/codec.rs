//! Streaming line codec
//!
//! Buffers raw bytes as they arrive and hands back complete lines. The codec
//! knows nothing about what the lines mean.

use crate::LINE_DELIMITER;

/// Streaming newline-delimited codec
#[derive(Debug, Default)]
pub struct LineCodec {
    buffer: Vec<u8>,
}

impl LineCodec {
    /// Create a new line codec
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(256),
        }
    }

    /// Push raw bytes into the codec's buffer
    pub fn push_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to extract the next complete line, delimiter included
    ///
    /// Bytes after the delimiter stay buffered for the next call.
    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        let end = self.buffer.iter().position(|&b| b == LINE_DELIMITER)?;
        Some(self.buffer.drain(..=end).collect())
    }

    /// Number of bytes waiting for a delimiter
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }
}
