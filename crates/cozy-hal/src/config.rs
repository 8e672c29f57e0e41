//! Mainboard configuration

use cozy_sim::ThermalModel;
use serde::{Deserialize, Serialize};

/// Link and polling parameters agreed with the controller firmware
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Serial baud rate
    pub baud_rate: u32,
    /// Serial read timeout in milliseconds
    pub read_timeout_ms: u64,
    /// Consecutive bad lines tolerated within one refresh
    pub error_budget: usize,
    /// Pause after each simulated refresh, in milliseconds
    pub sim_interval_ms: u64,
    /// Thermal model used in simulation mode
    pub simulation: ThermalModel,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            read_timeout_ms: 1000,
            error_budget: 3,
            sim_interval_ms: 25,
            simulation: ThermalModel::default(),
        }
    }
}
