//! Outbound setpoint command
//!
//! The only command the host sends to the controller: `S <channel> <celsius>\n`
//! with the temperature formatted to two decimal places.

use std::fmt;

use crate::error::ParseError;
use crate::EncodeCommand;

/// Command letter for a setpoint change
const SETPOINT_OPCODE: &str = "S";

/// Set the target temperature of one chamber
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SetpointCommand {
    /// Zero-based chamber channel
    pub channel: usize,
    /// Target temperature in degrees Celsius
    pub celsius: f64,
}

impl SetpointCommand {
    /// Create a new setpoint command
    pub fn new(channel: usize, celsius: f64) -> Self {
        Self { channel, celsius }
    }

    /// Parse a command line as the firmware would read it
    ///
    /// Surrounding whitespace, including the line terminator, is ignored.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [opcode, channel, celsius] = fields.as_slice() else {
            return Err(ParseError::InvalidCommand(line.trim().to_string()));
        };

        if *opcode != SETPOINT_OPCODE {
            return Err(ParseError::InvalidCommand(format!(
                "unknown opcode {opcode:?}"
            )));
        }

        let channel = channel
            .parse::<usize>()
            .map_err(|_| ParseError::InvalidCommand(format!("invalid channel {channel:?}")))?;
        let celsius = celsius
            .parse::<f64>()
            .map_err(|_| ParseError::InvalidNumber((*celsius).to_string()))?;

        Ok(Self { channel, celsius })
    }
}

impl fmt::Display for SetpointCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:.2}", SETPOINT_OPCODE, self.channel, self.celsius)
    }
}

impl EncodeCommand for SetpointCommand {
    fn encode(&self) -> Vec<u8> {
        format!("{self}\n").into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode() {
        assert_eq!(SetpointCommand::new(0, 28.0).encode(), b"S 0 28.00\n");
        assert_eq!(SetpointCommand::new(5, 4.0).encode(), b"S 5 4.00\n");
        assert_eq!(SetpointCommand::new(2, 33.456).encode(), b"S 2 33.46\n");
        assert_eq!(SetpointCommand::new(1, -3.5).encode(), b"S 1 -3.50\n");
    }

    #[test]
    fn test_parse() {
        let cmd = SetpointCommand::parse("S 3 26.50\n").unwrap();
        assert_eq!(cmd, SetpointCommand::new(3, 26.5));
    }

    #[test]
    fn test_parse_rejects_wrong_opcode() {
        assert!(matches!(
            SetpointCommand::parse("T 3 26.50"),
            Err(ParseError::InvalidCommand(_))
        ));
    }

    #[test]
    fn test_parse_rejects_bad_fields() {
        assert!(matches!(
            SetpointCommand::parse("S 3"),
            Err(ParseError::InvalidCommand(_))
        ));
        assert!(matches!(
            SetpointCommand::parse("S -1 26.50"),
            Err(ParseError::InvalidCommand(_))
        ));
        assert_eq!(
            SetpointCommand::parse("S 1 warm"),
            Err(ParseError::InvalidNumber("warm".into()))
        );
    }

    proptest! {
        #[test]
        fn encoded_command_decodes_within_rounding(
            channel in 0usize..64,
            celsius in -100.0f64..200.0
        ) {
            let bytes = SetpointCommand::new(channel, celsius).encode();
            prop_assert!(bytes.ends_with(b"\n"));

            let text = String::from_utf8(bytes).unwrap();
            let decoded = SetpointCommand::parse(&text).unwrap();
            prop_assert_eq!(decoded.channel, channel);
            prop_assert!((decoded.celsius - celsius).abs() < 0.01);
        }
    }
}
