//! FishCozy Serial Port Detection Library
//!
//! This crate enumerates serial devices and turns the user's port choice into
//! the concrete target the mainboard connects to.
//!
//! # Example
//!
//! ```rust,no_run
//! use cozy_detect::{PortScanner, PortSelection, PortTarget};
//!
//! let target = PortSelection::Auto.resolve(&PortScanner::new());
//! match target {
//!     PortTarget::Device(port) => println!("Using {port}"),
//!     PortTarget::Simulated => println!("No controller attached, simulating"),
//! }
//! ```

pub mod error;
pub mod resolve;
pub mod scanner;

pub use error::DetectError;
pub use resolve::{PortSelection, PortTarget};
pub use scanner::{PortScanner, SerialDevice};
