//! Mainboard engine
//!
//! Owns the chambers and the connection to the controller, and runs the
//! refresh cycle: read one state frame from the firmware, or step the thermal
//! model when there is no hardware.

use std::fmt;
use std::mem;
use std::thread;
use std::time::Duration;

use cozy_detect::{PortScanner, PortSelection, PortTarget};
use cozy_protocol::{decode_line, parse_frame, EncodeCommand, FrameError, Line, SetpointCommand};
use cozy_sim::{GaussianNoise, NoiseSource};
use tracing::{debug, info, warn};

use crate::chamber::Chamber;
use crate::config::BoardConfig;
use crate::error::HalError;
use crate::framer::LineFramer;
use crate::transport::{SerialTransport, Transport};

/// An open link to the controller firmware
pub struct HardwareLink {
    port: String,
    transport: Box<dyn Transport>,
    framer: LineFramer,
}

impl HardwareLink {
    fn new(port: String, transport: Box<dyn Transport>) -> Self {
        Self {
            port,
            transport,
            framer: LineFramer::new(),
        }
    }

    fn send(&mut self, message: &impl EncodeCommand) -> Result<(), HalError> {
        self.transport.write_all(&message.encode())?;
        Ok(())
    }

    fn next_line(&mut self) -> Result<Vec<u8>, HalError> {
        self.framer.next_line(self.transport.as_mut())
    }
}

impl fmt::Debug for HardwareLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HardwareLink")
            .field("port", &self.port)
            .field("buffered", &self.framer.buffered_len())
            .finish_non_exhaustive()
    }
}

/// How the board currently gets its chamber state
#[derive(Debug)]
pub enum ConnectionMode {
    /// Not connected yet, or hardware link closed
    Disconnected,
    /// Live link to the controller
    Hardware(HardwareLink),
    /// No hardware; chambers follow the thermal model
    Simulated,
}

impl ConnectionMode {
    pub fn is_hardware(&self) -> bool {
        matches!(self, Self::Hardware(_))
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self, Self::Simulated)
    }

    pub fn is_connected(&self) -> bool {
        !matches!(self, Self::Disconnected)
    }
}

/// Result of one `refresh()` call that did not hit a fatal error
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// A full frame was applied to every chamber
    Applied {
        /// Firmware log lines seen before the frame
        firmware_messages: Vec<String>,
    },
    /// The error budget ran out; no chamber was touched
    Failed {
        /// Bad lines seen (equals the error budget)
        errors: usize,
        /// Text of the last bad line, if any line was read
        last_line: Option<String>,
        /// Why the last bad line was rejected
        last_error: Option<FrameError>,
        /// Firmware log lines seen during the attempt
        firmware_messages: Vec<String>,
    },
    /// The thermal model advanced one step
    Simulated,
}

impl RefreshOutcome {
    /// Whether chamber state changed
    pub fn updated(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Firmware log lines seen during the call
    pub fn firmware_messages(&self) -> &[String] {
        match self {
            Self::Applied { firmware_messages } | Self::Failed { firmware_messages, .. } => {
                firmware_messages
            }
            Self::Simulated => &[],
        }
    }
}

/// The controller board and its chambers
pub struct Mainboard {
    chambers: Vec<Chamber>,
    target: PortTarget,
    connection: ConnectionMode,
    config: BoardConfig,
    noise: Box<dyn NoiseSource>,
}

impl Mainboard {
    /// Create a board with `num_chambers` chambers, resolving the port now
    ///
    /// `PortSelection::Auto` picks the last enumerated serial device and
    /// falls back to simulation (with a warning) when there is none.
    pub fn new(num_chambers: usize, selection: &PortSelection) -> Self {
        let target = selection.resolve(&PortScanner::new());
        Self::with_target(num_chambers, target, BoardConfig::default())
    }

    /// Create a board for an already resolved target
    pub fn with_target(num_chambers: usize, target: PortTarget, config: BoardConfig) -> Self {
        Self {
            chambers: (0..num_chambers).map(Chamber::new).collect(),
            target,
            connection: ConnectionMode::Disconnected,
            config,
            noise: Box::new(GaussianNoise::new()),
        }
    }

    /// Replace the simulation noise source
    pub fn with_noise(mut self, noise: impl NoiseSource + 'static) -> Self {
        self.noise = Box::new(noise);
        self
    }

    /// All chambers, in channel order
    pub fn chambers(&self) -> &[Chamber] {
        &self.chambers
    }

    /// One chamber by channel number
    pub fn chamber(&self, index: usize) -> Option<&Chamber> {
        self.chambers.get(index)
    }

    pub fn num_chambers(&self) -> usize {
        self.chambers.len()
    }

    pub fn target(&self) -> &PortTarget {
        &self.target
    }

    pub fn connection(&self) -> &ConnectionMode {
        &self.connection
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Open the connection for the board's target
    ///
    /// A device target opens the serial port; a simulated target enters
    /// simulation mode. Any existing connection is closed first.
    pub fn connect(&mut self) -> Result<(), HalError> {
        match &self.target {
            PortTarget::Device(port) => {
                let port = port.clone();
                self.disconnect();
                let transport = SerialTransport::open(&port, &self.config)?;
                self.connect_transport(port, transport);
            }
            PortTarget::Simulated => {
                self.disconnect();
                info!("Running {} simulated chambers", self.chambers.len());
                self.connection = ConnectionMode::Simulated;
            }
        }
        Ok(())
    }

    /// Attach an already open transport and enter hardware mode
    pub fn connect_transport(&mut self, port: impl Into<String>, transport: impl Transport + 'static) {
        self.disconnect();
        let port = port.into();
        info!("Connected to controller on {}", port);
        self.connection = ConnectionMode::Hardware(HardwareLink::new(port, Box::new(transport)));
    }

    /// Close the hardware link, if any
    ///
    /// Does nothing in simulation mode or when already disconnected.
    pub fn disconnect(&mut self) {
        if !self.connection.is_hardware() {
            return;
        }
        if let ConnectionMode::Hardware(link) =
            mem::replace(&mut self.connection, ConnectionMode::Disconnected)
        {
            info!("Closing connection to {}", link.port);
        }
    }

    /// Change a chamber's setpoint and tell the firmware
    ///
    /// The local setpoint changes first. In hardware mode exactly one command
    /// is written to the transport; otherwise nothing is sent.
    pub fn set_setpoint(&mut self, index: usize, celsius: f64) -> Result<SetpointCommand, HalError> {
        let count = self.chambers.len();
        let chamber = self
            .chambers
            .get_mut(index)
            .ok_or(HalError::ChamberOutOfRange { index, count })?;

        let command = chamber.set_setpoint(celsius);
        info!("Setting chamber {} to {:.2}", index, celsius);

        if let ConnectionMode::Hardware(link) = &mut self.connection {
            link.send(&command)?;
        }
        Ok(command)
    }

    /// Flag or clear a chamber fault
    pub fn set_chamber_error(&mut self, index: usize, error: bool) -> Result<(), HalError> {
        let count = self.chambers.len();
        self.chambers
            .get_mut(index)
            .ok_or(HalError::ChamberOutOfRange { index, count })?
            .set_error(error);
        Ok(())
    }

    /// Run one polling cycle
    ///
    /// In hardware mode this blocks until a full frame is applied, the error
    /// budget is spent (`RefreshOutcome::Failed`), or the transport times out
    /// (`HalError::TransportTimeout`). In simulation mode every chamber steps
    /// the thermal model and the call sleeps for the simulation interval.
    pub fn refresh(&mut self) -> Result<RefreshOutcome, HalError> {
        match &mut self.connection {
            ConnectionMode::Hardware(link) => {
                read_frame(link, &mut self.chambers, self.config.error_budget)
            }
            ConnectionMode::Simulated => {
                for chamber in &mut self.chambers {
                    chamber.mock(&self.config.simulation, self.noise.as_mut());
                }
                thread::sleep(Duration::from_millis(self.config.sim_interval_ms));
                Ok(RefreshOutcome::Simulated)
            }
            ConnectionMode::Disconnected => Err(HalError::NotConnected),
        }
    }
}

/// Read lines until one full frame applies or the error budget runs out
fn read_frame(
    link: &mut HardwareLink,
    chambers: &mut [Chamber],
    error_budget: usize,
) -> Result<RefreshOutcome, HalError> {
    let budget = error_budget.max(1);
    let mut errors = 0;
    let mut last_line: Option<String> = None;
    let mut last_error: Option<FrameError> = None;
    let mut firmware_messages = Vec::new();

    while errors < budget {
        let raw = link.next_line()?;
        debug!("Line from {}: {:?}", link.port, String::from_utf8_lossy(&raw));

        let rejected = match decode_line(&raw) {
            Ok(Line::FirmwareLog(message)) => {
                info!("{}", message);
                firmware_messages.push(message);
                continue;
            }
            Ok(Line::Frame(text)) => match parse_frame(&text, chambers.len()) {
                Ok(states) => {
                    for (chamber, state) in chambers.iter_mut().zip(&states) {
                        chamber.apply_state(state);
                    }
                    return Ok(RefreshOutcome::Applied { firmware_messages });
                }
                Err(e) => (text, e),
            },
            Err(e) => (String::from_utf8_lossy(&raw).trim().to_string(), e),
        };

        let (text, error) = rejected;
        errors += 1;
        warn!("Unable to read line: '{}' ({})", text, error);
        last_line = Some(text);
        last_error = Some(error);
    }

    warn!(
        "No valid frame after {} bad lines, last: {:?}",
        errors,
        last_line.as_deref().unwrap_or("")
    );
    Ok(RefreshOutcome::Failed {
        errors,
        last_line,
        last_error,
        firmware_messages,
    })
}

impl Drop for Mainboard {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl fmt::Debug for Mainboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mainboard")
            .field("chambers", &self.chambers)
            .field("target", &self.target)
            .field("connection", &self.connection)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;
    use cozy_sim::Silent;

    fn fast_config() -> BoardConfig {
        BoardConfig {
            sim_interval_ms: 0,
            ..Default::default()
        }
    }

    fn hardware_board(n: usize) -> (Mainboard, MemoryTransport) {
        let transport = MemoryTransport::new();
        let mut board = Mainboard::with_target(n, PortTarget::Device("mem".into()), fast_config());
        board.connect_transport("mem", transport.clone());
        (board, transport)
    }

    #[test]
    fn test_new_board_defaults() {
        let board = Mainboard::with_target(6, PortTarget::Simulated, fast_config());
        assert_eq!(board.num_chambers(), 6);
        for (i, chamber) in board.chambers().iter().enumerate() {
            assert_eq!(chamber.index(), i);
            assert_eq!(chamber.temperature(), 25.0);
            assert_eq!(chamber.setpoint(), 28.0);
        }
        assert!(!board.connection().is_connected());
    }

    #[test]
    fn test_refresh_before_connect() {
        let mut board = Mainboard::with_target(2, PortTarget::Simulated, fast_config());
        assert!(matches!(board.refresh(), Err(HalError::NotConnected)));
    }

    #[test]
    fn test_connect_simulated() {
        let mut board =
            Mainboard::with_target(2, PortTarget::Simulated, fast_config()).with_noise(Silent);
        board.connect().unwrap();
        assert!(board.connection().is_simulated());

        assert_eq!(board.refresh().unwrap(), RefreshOutcome::Simulated);
        assert!((board.chambers()[0].temperature() - 25.03).abs() < 1e-9);
        assert_eq!(board.chambers()[1].power(), 150.0);

        // No-op in simulation
        board.disconnect();
        assert!(board.connection().is_simulated());
    }

    #[test]
    fn test_two_chamber_frame() {
        let (mut board, transport) = hardware_board(2);
        transport.push_inbound(b"25.00 28.00 10\t24.50 26.00 -5\n");

        let outcome = board.refresh().unwrap();
        assert!(outcome.updated());

        let c0 = &board.chambers()[0];
        assert_eq!((c0.temperature(), c0.setpoint(), c0.power()), (25.0, 28.0, 10.0));
        let c1 = &board.chambers()[1];
        assert_eq!((c1.temperature(), c1.setpoint(), c1.power()), (24.5, 26.0, -5.0));
    }

    #[test]
    fn test_log_lines_are_not_errors() {
        let (mut board, transport) = hardware_board(1);
        for _ in 0..5 {
            transport.push_inbound(b"Command S 0 30.00\n");
        }
        transport.push_inbound(b"29.00 30.00 100\n");

        let outcome = board.refresh().unwrap();
        assert_eq!(outcome.firmware_messages().len(), 5);
        assert!(matches!(outcome, RefreshOutcome::Applied { .. }));
        assert_eq!(board.chambers()[0].temperature(), 29.0);
    }

    #[test]
    fn test_error_budget() {
        let (mut board, transport) = hardware_board(2);
        transport.push_inbound(b"garbage\n");
        transport.push_inbound(b"25.00 28.00 10\n");
        transport.push_inbound(b"\xfe\xff\n");
        transport.push_inbound(b"25.00 28.00 10\t24.50 26.00 -5\n");

        let outcome = board.refresh().unwrap();
        match outcome {
            RefreshOutcome::Failed {
                errors,
                last_line,
                last_error,
                ..
            } => {
                assert_eq!(errors, 3);
                assert_eq!(last_error, Some(FrameError::Decode));
                assert!(last_line.is_some());
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(board.chambers()[0], Chamber::new(0));
        assert_eq!(board.chambers()[1], Chamber::new(1));

        // The good frame is still there for the next call
        assert!(board.refresh().unwrap().updated());
        assert_eq!(board.chambers()[1].temperature(), 24.5);
    }

    #[test]
    fn test_bad_number_counts_against_budget() {
        let (mut board, transport) = hardware_board(2);
        transport.push_inbound(b"25.00 28.00 10\t24.50 warm -5\n");
        transport.push_inbound(b"26.00 28.00 10\t24.00 26.00 -5\n");

        assert!(board.refresh().unwrap().updated());
        // First chamber was not written by the rejected frame
        assert_eq!(board.chambers()[0].temperature(), 26.0);
    }

    #[test]
    fn test_timeout_propagates() {
        let (mut board, transport) = hardware_board(2);
        transport.push_inbound(b"garbage\n");

        assert!(matches!(board.refresh(), Err(HalError::TransportTimeout)));
        assert_eq!(board.chambers()[0], Chamber::new(0));
    }

    #[test]
    fn test_set_setpoint_hardware() {
        let (mut board, transport) = hardware_board(6);
        let command = board.set_setpoint(2, 33.0).unwrap();

        assert_eq!(command, SetpointCommand::new(2, 33.0));
        assert_eq!(board.chambers()[2].setpoint(), 33.0);
        assert_eq!(transport.written_text(), vec!["S 2 33.00\n".to_string()]);
    }

    #[test]
    fn test_set_setpoint_without_transport() {
        let mut board = Mainboard::with_target(2, PortTarget::Simulated, fast_config());
        board.connect().unwrap();
        board.set_setpoint(1, 4.0).unwrap();
        assert_eq!(board.chambers()[1].setpoint(), 4.0);
    }

    #[test]
    fn test_set_setpoint_out_of_range() {
        let (mut board, transport) = hardware_board(2);
        assert!(matches!(
            board.set_setpoint(2, 30.0),
            Err(HalError::ChamberOutOfRange { index: 2, count: 2 })
        ));
        assert!(transport.written().is_empty());
    }

    #[test]
    fn test_disconnect_hardware() {
        let (mut board, transport) = hardware_board(2);
        board.disconnect();
        assert!(!board.connection().is_connected());

        // Writes after disconnect stay local
        board.set_setpoint(0, 20.0).unwrap();
        assert!(transport.written().is_empty());

        // Idempotent
        board.disconnect();
        assert!(matches!(board.refresh(), Err(HalError::NotConnected)));
    }

    #[test]
    fn test_connect_closes_existing_link_first() {
        let transport = MemoryTransport::new();
        let mut board = Mainboard::with_target(
            1,
            PortTarget::Device("/dev/fishcozy-absent".into()),
            fast_config(),
        );
        board.connect_transport("mem", transport.clone());
        assert!(board.connection().is_hardware());

        assert!(matches!(board.connect(), Err(HalError::Open { .. })));
        assert!(!board.connection().is_connected());

        // Old link no longer receives writes
        board.set_setpoint(0, 30.0).unwrap();
        assert!(transport.written().is_empty());
    }

    #[test]
    fn test_chamber_error_flag() {
        let mut board = Mainboard::with_target(2, PortTarget::Simulated, fast_config());
        board.set_chamber_error(1, true).unwrap();
        assert!(board.chambers()[1].error());
        assert!(board.set_chamber_error(5, true).is_err());
    }
}
