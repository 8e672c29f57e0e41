//! Line framing over a transport

use cozy_protocol::LineCodec;
use tracing::trace;

use crate::error::HalError;
use crate::transport::Transport;

/// Largest chunk requested from the transport in one read
pub const MAX_CHUNK: usize = 2048;

/// Assembles newline-terminated lines from a byte transport
///
/// Bytes after the last delimiter stay buffered for the next call.
#[derive(Debug, Default)]
pub struct LineFramer {
    codec: LineCodec,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the next line, delimiter included, reading as much as needed
    ///
    /// Each read asks for the bytes the transport reports as available,
    /// at least one and at most [`MAX_CHUNK`]. A read that returns nothing
    /// fails with [`HalError::TransportTimeout`] straight away.
    pub fn next_line<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<Vec<u8>, HalError> {
        let mut chunk = [0u8; MAX_CHUNK];

        loop {
            if let Some(line) = self.codec.next_line() {
                return Ok(line);
            }

            let wanted = transport.bytes_available()?.clamp(1, MAX_CHUNK);
            let n = transport.read(&mut chunk[..wanted])?;
            if n == 0 {
                return Err(HalError::TransportTimeout);
            }

            trace!("Read {} bytes", n);
            self.codec.push_bytes(&chunk[..n]);
        }
    }

    /// Bytes buffered without a delimiter yet
    pub fn buffered_len(&self) -> usize {
        self.codec.buffered_len()
    }
}
