//! Byte transports between the host and the controller
//!
//! [`Transport`] is the narrow view the HAL needs of a serial link: a read
//! that returns zero bytes on timeout, a hint of how many bytes are waiting,
//! and a blocking write. [`SerialTransport`] backs it with a real serial
//! port; [`MemoryTransport`] is a scripted in-memory link for tests and
//! demos.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serialport::{DataBits, Parity, SerialPort, StopBits};
use tracing::debug;

use crate::config::BoardConfig;
use crate::error::HalError;

/// Byte-oriented, timeout-capable duplex stream
pub trait Transport: Send {
    /// Read up to `buf.len()` bytes; `Ok(0)` means the read timed out
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Number of bytes that can be read without blocking
    fn bytes_available(&mut self) -> io::Result<usize>;

    /// Write all bytes and flush
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;
}

/// Serial port transport (8N1)
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open a serial port with the board's baud rate and read timeout
    pub fn open(port_name: &str, config: &BoardConfig) -> Result<Self, HalError> {
        let port = serialport::new(port_name, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(Duration::from_millis(config.read_timeout_ms))
            .open()
            .map_err(|source| HalError::Open {
                port: port_name.to_string(),
                source,
            })?;

        debug!(
            "Opened {} at {} baud, {} ms timeout",
            port_name, config.baud_rate, config.read_timeout_ms
        );
        Ok(Self { port })
    }

}

impl Transport for SerialTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        timeout_as_empty(self.port.read(buf))
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        Ok(self.port.bytes_to_read()? as usize)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.port.write_all(data)?;
        self.port.flush()
    }
}

/// Map a read that timed out to an empty read
fn timeout_as_empty(result: io::Result<usize>) -> io::Result<usize> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
        other => other,
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    inbound: VecDeque<Vec<u8>>,
    written: Vec<Vec<u8>>,
    read_requests: Vec<usize>,
}

/// Scripted in-memory transport
///
/// Inbound bytes are queued as chunks; each read returns at most one chunk,
/// and an empty queue reads as a timeout. Clones share the same state, so a
/// test can keep one clone and hand the other to the board.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue one chunk of bytes for the board to read
    pub fn push_inbound(&self, data: impl AsRef<[u8]>) {
        let data = data.as_ref();
        if !data.is_empty() {
            self.state().inbound.push_back(data.to_vec());
        }
    }

    /// Bytes still queued for reading
    pub fn pending_inbound(&self) -> usize {
        self.state().inbound.iter().map(Vec::len).sum()
    }

    /// Every write made by the board, in order
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.state().written.clone()
    }

    /// Writes decoded as text
    pub fn written_text(&self) -> Vec<String> {
        self.state()
            .written
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }

    /// Buffer sizes the board asked for on each read
    pub fn read_requests(&self) -> Vec<usize> {
        self.state().read_requests.clone()
    }
}

impl Transport for MemoryTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state();
        state.read_requests.push(buf.len());

        let Some(mut chunk) = state.inbound.pop_front() else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            state.inbound.push_front(chunk.split_off(n));
        }
        Ok(n)
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        Ok(self.state().inbound.front().map_or(0, Vec::len))
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.state().written.push(data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_timeout_reads_as_empty() {
        let timed_out = io::Error::new(io::ErrorKind::TimedOut, "Operation timed out");
        assert_eq!(timeout_as_empty(Err(timed_out)).unwrap(), 0);
        assert_eq!(timeout_as_empty(Ok(12)).unwrap(), 12);

        let unplugged = io::Error::new(io::ErrorKind::BrokenPipe, "device disconnected");
        let err = timeout_as_empty(Err(unplugged)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_memory_read_splits_chunks() {
        let mut transport = MemoryTransport::new();
        transport.push_inbound(b"abcdef");

        let mut buf = [0u8; 4];
        assert_eq!(transport.bytes_available().unwrap(), 6);
        assert_eq!(transport.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"abcd");

        assert_eq!(transport.bytes_available().unwrap(), 2);
        assert_eq!(transport.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ef");

        assert_eq!(transport.read_requests(), vec![4, 4]);
    }

    #[test]
    fn test_memory_empty_reads_as_timeout() {
        let mut transport = MemoryTransport::new();
        let mut buf = [0u8; 8];
        assert_eq!(transport.bytes_available().unwrap(), 0);
        assert_eq!(transport.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_memory_clones_share_state() {
        let observer = MemoryTransport::new();
        let mut board_side = observer.clone();

        board_side.write_all(b"S 0 30.00\n").unwrap();
        observer.push_inbound(b"x\n");

        assert_eq!(observer.written_text(), vec!["S 0 30.00\n".to_string()]);
        assert_eq!(board_side.pending_inbound(), 2);
    }
}
