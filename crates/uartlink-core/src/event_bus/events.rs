//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable so they can be logged or replayed.

use serde::{Deserialize, Serialize};

use crate::decoder::DecodedEvent;
use crate::mode::Mode;

/// Everything the link reports to the foreground
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkEvent {
    /// A byte was read and decoded
    Received(DecodedEvent),
    /// A byte was written to the device
    Transmitted {
        /// The byte that was written
        raw: u8,
    },
    /// The operator selected a different mode
    ModeChanged {
        /// Mode before the change
        from: Mode,
        /// Mode after the change
        to: Mode,
    },
    /// A connection was opened
    Connected {
        /// Port name
        port: String,
    },
    /// The connection was closed by the operator
    Disconnected {
        /// Port name
        port: String,
    },
    /// The connection failed while active; the session is over
    ConnectionLost {
        /// Port name
        port: String,
        /// Error that ended the session
        reason: String,
    },
}

impl LinkEvent {
    /// Human-readable description, one line per event
    pub fn description(&self) -> String {
        match self {
            LinkEvent::Received(decoded) => decoded.to_string(),
            LinkEvent::Transmitted { raw } => format!("TX -> 0x{:02X}", raw),
            LinkEvent::ModeChanged { to, .. } => format!("Display mode changed to: {}", to),
            LinkEvent::Connected { port } => format!("Connected to {}", port),
            LinkEvent::Disconnected { .. } => "Disconnected".to_string(),
            LinkEvent::ConnectionLost { reason, .. } => format!("Connection lost: {}", reason),
        }
    }
}
