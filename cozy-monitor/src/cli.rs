//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;
use cozy_detect::PortSelection;

use crate::settings::Settings;

/// FishCozy thermal controller monitor
#[derive(Parser, Debug)]
#[command(
    name = "fishcozy",
    about = "Poll a FishCozy controller (or its simulation) and print chamber state."
)]
pub struct Cli {
    /// Serial port of the controller (auto-detected when omitted)
    #[arg(short, long, conflicts_with = "simulate")]
    pub port: Option<String>,

    /// Run the thermal simulation instead of talking to hardware
    #[arg(long)]
    pub simulate: bool,

    /// Number of chambers on the board
    #[arg(short, long)]
    pub chambers: Option<usize>,

    /// Setpoint to send after connecting (e.g. --set 2=33.0)
    #[arg(long, value_parser = parse_setpoint)]
    pub set: Vec<(usize, f64)>,

    /// Stop after this many refresh cycles
    #[arg(long)]
    pub cycles: Option<u64>,

    /// Seed for simulation noise
    #[arg(long)]
    pub seed: Option<u64>,

    /// Settings file (defaults to the user config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the effective settings back to the settings file and exit
    #[arg(long)]
    pub write_config: bool,
}

impl Cli {
    /// Port selection after applying command-line overrides
    pub fn port_selection(&self, settings: &Settings) -> PortSelection {
        if self.simulate {
            PortSelection::Simulate
        } else if let Some(port) = &self.port {
            PortSelection::Explicit(port.clone())
        } else {
            settings.port.clone()
        }
    }

    /// Apply overrides to loaded settings
    pub fn apply(&self, settings: &mut Settings) {
        settings.port = self.port_selection(settings);
        if let Some(chambers) = self.chambers {
            settings.chambers = chambers;
        }
    }
}

fn parse_setpoint(s: &str) -> Result<(usize, f64), String> {
    let (index, celsius) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid INDEX=CELSIUS: no `=` found in '{}'.", s))?;
    let index = index
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("Invalid chamber index '{}'.", index))?;
    let celsius = celsius
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("Invalid temperature '{}'.", celsius))?;
    Ok((index, celsius))
}
