//! Per-chamber state

use std::fmt;

use cozy_protocol::{ChannelState, ParseError, SetpointCommand};
use cozy_sim::{NoiseSource, ThermalModel};

/// Temperature a chamber reports before the first refresh
pub const DEFAULT_TEMPERATURE: f64 = 25.0;
/// Setpoint a chamber starts with
pub const DEFAULT_SETPOINT: f64 = 28.0;

/// One independently controlled thermal channel
#[derive(Debug, Clone, PartialEq)]
pub struct Chamber {
    index: usize,
    temperature: f64,
    setpoint: f64,
    power: f64,
    error: bool,
}

impl Chamber {
    /// Create a chamber for channel `index` with default state
    pub fn new(index: usize) -> Self {
        Self {
            index,
            temperature: DEFAULT_TEMPERATURE,
            setpoint: DEFAULT_SETPOINT,
            power: 0.0,
            error: false,
        }
    }

    /// Channel number, equal to the chamber's position on the board
    pub fn index(&self) -> usize {
        self.index
    }

    /// Last measured temperature
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Desired temperature
    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Last actuator output, -255..=255
    pub fn power(&self) -> f64 {
        self.power
    }

    /// Channel fault flag
    pub fn error(&self) -> bool {
        self.error
    }

    pub fn set_error(&mut self, error: bool) {
        self.error = error;
    }

    /// Snapshot of the reported fields
    pub fn state(&self) -> ChannelState {
        ChannelState::new(self.temperature, self.setpoint, self.power)
    }

    /// Change the setpoint and return the command that tells the firmware
    ///
    /// The caller is responsible for sending the command; see
    /// `Mainboard::set_setpoint`.
    pub fn set_setpoint(&mut self, celsius: f64) -> SetpointCommand {
        self.setpoint = celsius;
        SetpointCommand::new(self.index, celsius)
    }

    /// Overwrite temperature, setpoint and power from a reported state
    pub fn apply_state(&mut self, state: &ChannelState) {
        self.temperature = state.temperature;
        self.setpoint = state.setpoint;
        self.power = state.power;
    }

    /// Parse one channel token and apply it
    ///
    /// Nothing is written unless all three fields parse.
    pub fn apply_state_frame(&mut self, token: &str) -> Result<(), ParseError> {
        let state = token.parse::<ChannelState>()?;
        self.apply_state(&state);
        Ok(())
    }

    /// Advance the synthetic thermal model one step
    pub fn mock(&mut self, model: &ThermalModel, noise: &mut dyn NoiseSource) {
        let step = model.step(self.temperature, self.setpoint, noise);
        self.temperature = step.temperature;
        self.power = step.power;
    }
}

impl fmt::Display for Chamber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.state(), f)
    }
}
