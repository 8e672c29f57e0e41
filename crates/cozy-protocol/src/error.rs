//! Error types for FishCozy protocol parsing

use thiserror::Error;

/// Errors that can occur while parsing a single channel token or command
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Channel token does not hold exactly three fields
    #[error("expected 3 fields in channel token, found {0}")]
    FieldCount(usize),

    /// Field is not a valid floating-point literal
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),

    /// Line is not a well-formed setpoint command
    #[error("invalid setpoint command: {0}")]
    InvalidCommand(String),
}

/// Errors that make an inbound line unusable as a state frame
///
/// Every variant is recoverable: the poll loop counts it against its error
/// budget and reads the next line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Bytes received are not ASCII text
    #[error("line is not valid ASCII text")]
    Decode,

    /// Token count does not match the chamber count
    #[error("malformed frame: expected {expected} channel tokens, found {found}")]
    MalformedFrame { expected: usize, found: usize },

    /// One channel token failed to parse
    #[error("channel {channel}: {source}")]
    Channel {
        channel: usize,
        #[source]
        source: ParseError,
    },
}
