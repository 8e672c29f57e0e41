//! FishCozy Simulation Library
//!
//! This crate provides the synthetic thermal model that stands in for the
//! controller firmware when no hardware is attached:
//!
//! - **ThermalModel**: a proportional step toward the setpoint plus a derived
//!   actuator power
//! - **NoiseSource**: injectable measurement noise (gaussian, seeded, or silent)
//!
//! # Example
//!
//! ```rust
//! use cozy_sim::{Silent, ThermalModel};
//!
//! let model = ThermalModel::default();
//! let step = model.step(25.0, 28.0, &mut Silent);
//!
//! assert!((step.temperature - 25.03).abs() < 1e-9);
//! assert_eq!(step.power, 150.0);
//! ```

pub mod noise;
pub mod thermal;

pub use noise::{GaussianNoise, NoiseSource, Silent};
pub use thermal::{ThermalModel, ThermalStep};
