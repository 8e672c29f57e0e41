//! Error types for the hardware abstraction layer

use thiserror::Error;

/// Errors that can occur while driving the mainboard
#[derive(Debug, Error)]
pub enum HalError {
    /// Transport delivered nothing within its read timeout
    #[error("timed out waiting for data from the controller")]
    TransportTimeout,

    /// Operation needs a connection and the board has none
    #[error("board is not connected")]
    NotConnected,

    /// Chamber index does not exist on this board
    #[error("chamber {index} out of range (board has {count})")]
    ChamberOutOfRange { index: usize, count: usize },

    /// Serial port could not be opened
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    /// I/O error on an open transport
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
