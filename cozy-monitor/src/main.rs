//! FishCozy Monitor
//!
//! Connects to the thermal controller (or simulates it), applies any
//! setpoints given on the command line and prints the chamber table after
//! every refresh.

mod cli;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use cozy_detect::PortScanner;
use cozy_hal::{HalError, Mainboard, RefreshOutcome};
use cozy_sim::GaussianNoise;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;
use settings::Settings;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cozy_monitor=info,cozy_protocol=info,cozy_detect=info,cozy_hal=info,cozy_sim=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;
    cli.apply(&mut settings);

    if cli.write_config {
        let path = settings.save(cli.config.as_deref())?;
        info!("Settings written to {}", path.display());
        return Ok(());
    }

    let target = settings.port.resolve(&PortScanner::new());
    let mut board = Mainboard::with_target(settings.chambers, target, settings.board.clone());
    if let Some(seed) = cli.seed {
        board = board.with_noise(GaussianNoise::seeded(seed));
    }

    board.connect().context("Failed to connect to the controller")?;

    apply_setpoints(&mut board, &cli.set)?;

    let result = poll(&mut board, cli.cycles);
    board.disconnect();
    result
}

/// Apply `--set` values in order
///
/// A write that fails on the transport leaves the local setpoint in place and
/// is only logged; the next frame from the firmware shows what it accepted.
fn apply_setpoints(board: &mut Mainboard, setpoints: &[(usize, f64)]) -> Result<()> {
    for &(index, celsius) in setpoints {
        match board.set_setpoint(index, celsius) {
            Ok(_) => {}
            Err(HalError::Io(e)) => warn!("Failed to send setpoint for chamber {}: {}", index, e),
            Err(e) => return Err(e).with_context(|| format!("Failed to set chamber {index}")),
        }
    }
    Ok(())
}

/// Refresh and print until `cycles` runs out (forever when `None`)
///
/// A transport timeout only ends the current cycle; the controller may still
/// be booting. Any other error ends the session.
fn poll(board: &mut Mainboard, cycles: Option<u64>) -> Result<()> {
    let mut cycle = 0u64;
    while cycles.map_or(true, |limit| cycle < limit) {
        cycle += 1;
        match board.refresh() {
            Ok(RefreshOutcome::Failed { .. }) => {}
            Ok(_) => println!("{}", chamber_table(board)),
            Err(HalError::TransportTimeout) => warn!("No data from controller"),
            Err(e) => return Err(e).context("Refresh failed"),
        }
    }
    Ok(())
}

fn chamber_table(board: &Mainboard) -> String {
    let cells: Vec<String> = board.chambers().iter().map(ToString::to_string).collect();
    format!("[{}]", cells.join(", "))
}
