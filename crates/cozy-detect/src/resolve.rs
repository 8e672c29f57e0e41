//! Port selection
//!
//! Turns what the user asked for (a port name, "pick one for me", or "no
//! hardware") into the concrete target the mainboard will connect to.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::scanner::{PortScanner, SerialDevice};

/// What the user asked for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "port")]
pub enum PortSelection {
    /// Use this port
    Explicit(String),
    /// Use the last enumerated serial device, or simulate if there is none
    #[default]
    Auto,
    /// Run the thermal simulation instead of talking to hardware
    Simulate,
}

/// Where the mainboard will connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortTarget {
    /// A serial device by port name
    Device(String),
    /// No hardware
    Simulated,
}

impl PortSelection {
    /// Resolve the selection, enumerating ports if needed
    ///
    /// Enumeration failures are treated like an empty port list.
    pub fn resolve(&self, scanner: &PortScanner) -> PortTarget {
        match self {
            Self::Auto => match scanner.enumerate_ports() {
                Ok(devices) => self.resolve_among(&devices),
                Err(e) => {
                    warn!("{}; entering hardware simulation", e);
                    PortTarget::Simulated
                }
            },
            _ => self.resolve_among(&[]),
        }
    }

    /// Resolve the selection against an already enumerated device list
    pub fn resolve_among(&self, devices: &[SerialDevice]) -> PortTarget {
        match self {
            Self::Explicit(port) => PortTarget::Device(port.clone()),
            Self::Simulate => PortTarget::Simulated,
            Self::Auto => match devices.last() {
                Some(device) => {
                    info!("Auto-selected serial port {}", device.description());
                    PortTarget::Device(device.port.clone())
                }
                None => {
                    warn!("No serial port detected: entering hardware simulation");
                    PortTarget::Simulated
                }
            },
        }
    }
}

impl PortTarget {
    pub fn is_simulated(&self) -> bool {
        matches!(self, Self::Simulated)
    }
}
