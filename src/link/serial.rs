// Serial link to the robot
//
// Protocol: one ASCII command character per write, no framing, no checksum,
// no acknowledgment.

use std::io::{self, Write};
use tracing::{debug, info};

use crate::config::{SERIAL_BAUD_RATE, SERIAL_TIMEOUT};
use crate::drive::DriveCommand;

/// Error types for the serial link
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, LinkError>;

/// Write half of the robot link
pub struct SerialLink {
    port: Box<dyn Write + Send>,
    name: String,
}

impl SerialLink {
    /// Open the serial device at the default baud rate
    pub fn open(port_name: &str) -> Result<Self> {
        Self::open_with_baudrate(port_name, SERIAL_BAUD_RATE)
    }

    /// Open with custom baudrate
    pub fn open_with_baudrate(port_name: &str, baudrate: u32) -> Result<Self> {
        info!("Opening serial link on {} at {} baud", port_name, baudrate);
        let port = serialport::new(port_name, baudrate)
            .timeout(SERIAL_TIMEOUT)
            .open()?;

        Ok(Self::from_writer(port, port_name))
    }

    /// Link that discards every byte (no robot attached)
    pub fn simulated() -> Self {
        info!("Serial link simulated, commands are only logged");
        Self::from_writer(io::sink(), "simulated")
    }

    /// Wrap any writer, e.g. a buffer in tests
    pub fn from_writer(port: impl Write + Send + 'static, name: &str) -> Self {
        Self {
            port: Box::new(port),
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Write the command character and flush
    pub fn write_command(&mut self, command: DriveCommand) -> Result<()> {
        debug!("Writing {} to {}", command, self.name);
        self.port.write_all(&[command.as_byte()])?;
        self.port.flush()?;
        Ok(())
    }
}
