//! FishCozy Protocol Library
//!
//! This crate provides parsing and encoding for the newline-delimited text
//! protocol spoken by the FishCozy thermal controller firmware.
//!
//! # Format
//!
//! - Outbound setpoint command: `S <channel> <celsius>\n`, value with two decimals
//! - Inbound state frame: one token per chamber joined by `\t`, each token
//!   `temperature setpoint power`
//! - Inbound log line: any line starting with `Command`
//!
//! # Architecture
//!
//! - [`LineCodec`] buffers raw bytes and splits them into lines
//! - [`decode_line`] classifies a raw line as a firmware log or a state frame
//! - [`parse_frame`] turns a state frame into one [`ChannelState`] per chamber
//! - [`SetpointCommand`] encodes (and decodes) the outbound command
//!
//! # Example
//!
//! ```rust
//! use cozy_protocol::{decode_line, parse_frame, Line, LineCodec};
//!
//! let mut codec = LineCodec::new();
//! codec.push_bytes(b"25.00 28.00 10\t24.50 26.00 -5\n");
//!
//! let raw = codec.next_line().unwrap();
//! let Line::Frame(text) = decode_line(&raw).unwrap() else {
//!     panic!("expected a state frame");
//! };
//!
//! let states = parse_frame(&text, 2).unwrap();
//! assert_eq!(states[1].temperature, 24.5);
//! assert_eq!(states[1].power, -5.0);
//! ```

pub mod codec;
pub mod command;
pub mod error;
pub mod frame;

pub use codec::LineCodec;
pub use command::SetpointCommand;
pub use error::{FrameError, ParseError};
pub use frame::{decode_line, encode_frame, parse_frame, ChannelState, Line};

/// Terminator of every line in both directions
pub const LINE_DELIMITER: u8 = b'\n';

/// Separator between chamber tokens inside a state frame
pub const CHANNEL_SEPARATOR: char = '\t';

/// Prefix of lines the firmware emits as log/echo output
pub const LOG_PREFIX: &str = "Command";

/// Trait for messages that can be encoded to bytes
pub trait EncodeCommand {
    /// Encode this message to its wire format
    fn encode(&self) -> Vec<u8>;
}
