//! Display view-model
//!
//! Text the operator sees, driven only by [`LinkEvent`]s. Any front end can
//! render it; nothing here depends on a UI toolkit.

use crate::decoder::{DecodedEvent, Temperature};
use crate::event_bus::LinkEvent;
use crate::mode::Mode;

/// Placeholder for a field with no value
const EMPTY: &str = "--";

/// Current display contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayModel {
    mode: Mode,
    connected_port: Option<String>,
    raw: Option<u8>,
    switch: Option<u8>,
    temperature: Option<Temperature>,
}

impl DisplayModel {
    /// Empty display in `Temperature` mode
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the display from one event
    pub fn apply(&mut self, event: &LinkEvent) {
        match event {
            LinkEvent::Received(decoded) => self.apply_received(decoded),
            LinkEvent::ModeChanged { to, .. } => {
                self.mode = *to;
                self.clear();
            }
            LinkEvent::Connected { port } => self.connected_port = Some(port.clone()),
            LinkEvent::Disconnected { .. } | LinkEvent::ConnectionLost { .. } => {
                self.connected_port = None;
            }
            LinkEvent::Transmitted { .. } => {}
        }
    }

    fn apply_received(&mut self, decoded: &DecodedEvent) {
        // A byte decoded under another mode is never shown under this one.
        if decoded.mode() != self.mode {
            tracing::debug!(
                "Dropping {} byte 0x{:02X} while showing {}",
                decoded.mode(),
                decoded.raw(),
                self.mode
            );
            return;
        }

        self.raw = Some(decoded.raw());
        match decoded {
            DecodedEvent::TemperatureReading { .. } => {
                self.temperature = decoded.temperature();
                self.switch = None;
            }
            DecodedEvent::SwitchReading(raw) => {
                self.switch = Some(*raw);
                self.temperature = None;
            }
            DecodedEvent::LedEvent(_) => {
                self.switch = None;
                self.temperature = None;
            }
        }
    }

    /// Clear every value field
    pub fn clear(&mut self) {
        self.raw = None;
        self.switch = None;
        self.temperature = None;
    }

    /// Mode the display is showing
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Port of the open connection, if any
    pub fn connected_port(&self) -> Option<&str> {
        self.connected_port.as_deref()
    }

    /// Last raw byte, hex and binary
    pub fn raw_text(&self) -> String {
        match self.raw {
            Some(raw) => format!("0x{:02X}   {:08b}", raw, raw),
            None => EMPTY.to_string(),
        }
    }

    /// SW[7:0] field
    pub fn switch_text(&self) -> String {
        match self.switch {
            Some(raw) => format!("SW[7:0]: 0x{:02X} ({:08b})", raw, raw),
            None => format!("SW[7:0]: {}", EMPTY),
        }
    }

    /// Temperature field
    pub fn temperature_text(&self) -> String {
        match self.temperature {
            Some(t) => format!("Temperature: {} °C", t),
            None => "Temperature: --.-- °C".to_string(),
        }
    }

    /// Which mode is displayed and what it shows
    pub fn mode_banner(&self) -> String {
        format!("Mode: {} | Showing: {}", self.mode, self.mode.showing())
    }

    /// Switch setting the device must have for the selected mode
    pub fn device_hint(&self) -> String {
        format!("FPGA Mode: {} ({})", self.mode, self.mode.device_switches())
    }

    /// Connection line
    pub fn connection_text(&self) -> String {
        match &self.connected_port {
            Some(port) => format!("Connected: {}", port),
            None => "Disconnected".to_string(),
        }
    }
}

impl std::fmt::Display for DisplayModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.connection_text())?;
        writeln!(f, "{}", self.device_hint())?;
        writeln!(f, "{}", self.mode_banner())?;
        writeln!(f, "RX: {}", self.raw_text())?;
        writeln!(f, "{}", self.switch_text())?;
        write!(f, "{}", self.temperature_text())
    }
}
