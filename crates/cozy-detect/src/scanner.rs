//! Serial device enumeration

use serialport::{available_ports, SerialPortType};
use tracing::info;

use crate::error::DetectError;

/// A serial device visible to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialDevice {
    /// Port name (e.g., /dev/ttyACM0, COM3)
    pub port: String,
    /// USB vendor/product IDs, when the device is a USB adapter
    pub usb_ids: Option<(u16, u16)>,
    /// USB product string (e.g. "Arduino Uno")
    pub product: Option<String>,
}

impl SerialDevice {
    /// Create a device entry with only a port name
    pub fn named(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            usb_ids: None,
            product: None,
        }
    }

    fn from_serialport(port: String, port_type: &SerialPortType) -> Self {
        match port_type {
            SerialPortType::UsbPort(usb) => Self {
                port,
                usb_ids: Some((usb.vid, usb.pid)),
                product: usb.product.clone(),
            },
            _ => Self::named(port),
        }
    }

    /// Short human-readable description for logs
    pub fn description(&self) -> String {
        match (&self.product, self.usb_ids) {
            (Some(product), _) => format!("{} - {}", self.port, product),
            (None, Some((vid, pid))) => format!("{} - USB {:04x}:{:04x}", self.port, vid, pid),
            (None, None) => self.port.clone(),
        }
    }
}

/// Serial port scanner
pub struct PortScanner {
    /// Skip ports whose name contains any of these patterns
    skip_patterns: Vec<String>,
}

impl PortScanner {
    /// Create a scanner that ignores macOS Bluetooth pseudo-ports
    pub fn new() -> Self {
        Self {
            skip_patterns: vec!["Bluetooth".to_string()],
        }
    }

    /// Enumerate available serial devices, in the order the OS reports them
    pub fn enumerate_ports(&self) -> Result<Vec<SerialDevice>, DetectError> {
        let devices = available_ports()?
            .into_iter()
            .map(|p| SerialDevice::from_serialport(p.port_name, &p.port_type))
            .collect();

        let devices = self.filter(devices);
        info!("Found {} serial port(s)", devices.len());
        for device in &devices {
            info!("  {}", device.description());
        }

        Ok(devices)
    }

    fn filter(&self, devices: Vec<SerialDevice>) -> Vec<SerialDevice> {
        devices
            .into_iter()
            .filter(|d| {
                !self
                    .skip_patterns
                    .iter()
                    .any(|pattern| d.port.contains(pattern.as_str()))
            })
            .collect()
    }
}

impl Default for PortScanner {
    fn default() -> Self {
        Self::new()
    }
}
