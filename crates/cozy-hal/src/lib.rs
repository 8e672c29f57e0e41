//! FishCozy Hardware Abstraction Layer
//!
//! This crate wraps the serial link to the FishCozy thermal controller. A
//! [`Mainboard`] owns a fixed set of [`Chamber`]s and keeps them in sync with
//! the firmware:
//!
//! - **Hardware mode**: each `refresh()` reads one tab-separated state frame
//!   and applies it to every chamber at once
//! - **Simulation mode**: with no controller attached, each `refresh()` steps
//!   a synthetic proportional thermal model instead
//!
//! Setpoint changes go through [`Mainboard::set_setpoint`], which updates the
//! chamber and writes `S <channel> <celsius>` to the controller.
//!
//! # Example
//!
//! ```rust
//! use cozy_detect::PortTarget;
//! use cozy_hal::{BoardConfig, Mainboard, MemoryTransport};
//!
//! let link = MemoryTransport::new();
//! link.push_inbound(b"25.00 28.00 10\t24.50 26.00 -5\n");
//!
//! let mut board = Mainboard::with_target(
//!     2,
//!     PortTarget::Device("loopback".into()),
//!     BoardConfig::default(),
//! );
//! board.connect_transport("loopback", link.clone());
//!
//! board.refresh().unwrap();
//! assert_eq!(board.chambers()[1].temperature(), 24.5);
//!
//! board.set_setpoint(0, 30.0).unwrap();
//! assert_eq!(link.written_text(), vec!["S 0 30.00\n".to_string()]);
//! ```

pub mod board;
pub mod chamber;
pub mod config;
pub mod error;
pub mod framer;
pub mod transport;

pub use board::{ConnectionMode, HardwareLink, Mainboard, RefreshOutcome};
pub use chamber::{Chamber, DEFAULT_SETPOINT, DEFAULT_TEMPERATURE};
pub use config::BoardConfig;
pub use error::HalError;
pub use framer::{LineFramer, MAX_CHUNK};
pub use transport::{MemoryTransport, SerialTransport, Transport};
