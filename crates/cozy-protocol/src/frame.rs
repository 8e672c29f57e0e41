//! Inbound lines: firmware log output and state frames
//!
//! A state frame carries one token per chamber, joined by tabs:
//!
//! ```text
//! 25.00 28.00 10\t24.50 26.00 -5\n
//! ```
//!
//! Each token is `temperature setpoint power`, whitespace separated.

use std::fmt;
use std::str::FromStr;

use crate::error::{FrameError, ParseError};
use crate::{CHANNEL_SEPARATOR, LOG_PREFIX};

/// A classified inbound line, with surrounding whitespace trimmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Log/echo output from the firmware (starts with `Command`)
    FirmwareLog(String),
    /// Candidate state frame, not yet parsed
    Frame(String),
}

/// Decode raw line bytes into a classified [`Line`]
///
/// The firmware only ever emits ASCII; anything else is a decode error.
pub fn decode_line(raw: &[u8]) -> Result<Line, FrameError> {
    if !raw.is_ascii() {
        return Err(FrameError::Decode);
    }
    let text = std::str::from_utf8(raw).map_err(|_| FrameError::Decode)?.trim();

    if text.starts_with(LOG_PREFIX) {
        Ok(Line::FirmwareLog(text.to_string()))
    } else {
        Ok(Line::Frame(text.to_string()))
    }
}

/// Reported state of one chamber
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelState {
    /// Measured temperature in degrees Celsius
    pub temperature: f64,
    /// Target temperature the firmware is regulating to
    pub setpoint: f64,
    /// Actuator output, -255..=255
    pub power: f64,
}

impl ChannelState {
    pub fn new(temperature: f64, setpoint: f64, power: f64) -> Self {
        Self {
            temperature,
            setpoint,
            power,
        }
    }
}

impl FromStr for ChannelState {
    type Err = ParseError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = token.split_whitespace().collect();
        let [temperature, setpoint, power] = fields.as_slice() else {
            return Err(ParseError::FieldCount(fields.len()));
        };

        Ok(Self {
            temperature: parse_number(temperature)?,
            setpoint: parse_number(setpoint)?,
            power: parse_number(power)?,
        })
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Power goes out as a whole number, truncated like the firmware prints it
        write!(
            f,
            "{:.2} {:.2} {}",
            self.temperature,
            self.setpoint,
            self.power.trunc() as i64
        )
    }
}

fn parse_number(field: &str) -> Result<f64, ParseError> {
    field
        .parse::<f64>()
        .map_err(|_| ParseError::InvalidNumber(field.to_string()))
}

/// Parse a state frame into exactly `channels` chamber states
///
/// Either every token parses or nothing is returned, so callers can apply the
/// result to all chambers as one unit.
pub fn parse_frame(text: &str, channels: usize) -> Result<Vec<ChannelState>, FrameError> {
    let tokens: Vec<&str> = text.split(CHANNEL_SEPARATOR).collect();
    if tokens.len() != channels {
        return Err(FrameError::MalformedFrame {
            expected: channels,
            found: tokens.len(),
        });
    }

    tokens
        .iter()
        .enumerate()
        .map(|(channel, token)| {
            token
                .parse::<ChannelState>()
                .map_err(|source| FrameError::Channel { channel, source })
        })
        .collect()
}

/// Encode chamber states as a state frame line, terminator included
pub fn encode_frame(states: &[ChannelState]) -> String {
    let tokens: Vec<String> = states.iter().map(ToString::to_string).collect();
    let mut line = tokens.join(&CHANNEL_SEPARATOR.to_string());
    line.push('\n');
    line
}
