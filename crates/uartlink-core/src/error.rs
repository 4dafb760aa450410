//! Error handling for UARTLink
//!
//! Provides the error types for every layer of the link:
//! - Connection errors (port open failures, I/O on a live link)
//! - Input errors (operator entry rejected before it reaches the transmit path)
//!
//! Decoding has no error type: every byte is valid in every mode.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Connection error type
///
/// Represents errors related to the serial link with the device.
/// Any of these ends the active session; there is no automatic reconnect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// No connection is open
    #[error("Not connected")]
    NotConnected,

    /// A connection is already open
    #[error("Already connected")]
    AlreadyConnected,

    /// Port not found
    #[error("Port not found: {port}")]
    PortNotFound {
        /// The name of the port that was not found.
        port: String,
    },

    /// Failed to open port
    #[error("Failed to open port {port}: {reason}")]
    FailedToOpen {
        /// The name of the port that failed to open.
        port: String,
        /// The reason the port failed to open.
        reason: String,
    },

    /// Connection lost while the session was active
    #[error("Connection lost: {reason}")]
    ConnectionLost {
        /// The reason the connection was lost.
        reason: String,
    },

    /// Invalid connection parameters
    #[error("Invalid connection parameters: {reason}")]
    InvalidParameters {
        /// The reason the parameters are invalid.
        reason: String,
    },

    /// Serial port error
    #[error("Serial port error: {reason}")]
    SerialError {
        /// The reason for the serial port error.
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {reason}")]
    IoError {
        /// The reason for the I/O error.
        reason: String,
    },
}

/// Operator input error type
///
/// Raised at the boundary, before anything is written to the link.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Entry field was empty
    #[error("Enter HEX value (00-FF)")]
    Empty,

    /// Entry is not a hexadecimal byte
    #[error("Enter HEX value (00-FF), got '{input}'")]
    InvalidHex {
        /// The rejected text.
        input: String,
    },

    /// Unknown operator command or argument
    #[error("Invalid command: {reason}")]
    InvalidCommand {
        /// Why the command was rejected.
        reason: String,
    },
}

/// Main error type for UARTLink
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Input validation error
    #[error(transparent)]
    Input(#[from] InputError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is an input validation error
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::Input(_))
    }

    /// Check if this error ends the active session
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::Connection(ConnectionError::ConnectionLost { .. })
        )
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
