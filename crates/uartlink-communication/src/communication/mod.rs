//! Transport layer
//!
//! [`SerialChannel`] is the only thing the receive loop and the session know
//! about the wire. The native implementation wraps the `serialport` crate.

pub mod serial;

use serde::{Deserialize, Serialize};
use std::io;
use std::time::Duration;
use uartlink_core::constants::{BAUD_RATE, DEFAULT_READ_TIMEOUT_MS};
use uartlink_core::{ConnectionError, Result};

/// Byte-level, blocking-with-timeout serial channel
///
/// One handle is read by the receive loop while a cloned handle is written
/// by the foreground, so implementations must allow a read and a write to
/// proceed concurrently on two handles of the same port.
pub trait SerialChannel: Send {
    /// Read one byte, or `None` if the read timeout elapsed first
    ///
    /// Any error is terminal for the connection.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Write exactly one byte
    fn write_byte(&mut self, value: u8) -> io::Result<()>;

    /// Open a second handle to the same connection
    fn try_clone_channel(&self) -> io::Result<Box<dyn SerialChannel>>;

    /// Port name for logs
    fn name(&self) -> String;
}

/// Parameters for opening a connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Port name (e.g., "/dev/ttyUSB0", "COM3")
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Read timeout in milliseconds; bounds how long a stop request waits
    pub read_timeout_ms: u64,
}

impl ConnectionParams {
    /// Parameters for `port` at the link's fixed baud rate
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Self::default()
        }
    }

    /// Override the baud rate
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Override the read timeout
    pub fn with_read_timeout_ms(mut self, read_timeout_ms: u64) -> Self {
        self.read_timeout_ms = read_timeout_ms;
        self
    }

    /// Read timeout as a `Duration`
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Check the parameters before any port is touched
    pub fn validate(&self) -> Result<()> {
        if self.port.trim().is_empty() {
            return Err(invalid("no port selected"));
        }
        if self.baud_rate == 0 {
            return Err(invalid("baud rate must be > 0"));
        }
        if self.read_timeout_ms == 0 || self.read_timeout_ms > 1000 {
            return Err(invalid("read timeout must be between 1 and 1000 ms"));
        }
        Ok(())
    }
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: BAUD_RATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

fn invalid(reason: &str) -> uartlink_core::Error {
    ConnectionError::InvalidParameters {
        reason: reason.to_string(),
    }
    .into()
}
