//! Decoding mode and the state shared between the operator and the receive loop
//!
//! The mode is operator-supplied and must match the device's switch setting;
//! nothing here tries to infer it from the byte stream.

use crate::decoder::{decode, DecodedEvent};
use crate::event_bus::{EventSink, LinkEvent};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::InputError;

/// How incoming bytes are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Bytes are raw temperature counts
    #[default]
    Temperature,
    /// Bytes are the device's switch bank SW[7:0]
    SwitchValue,
    /// Bytes are acknowledged and logged only
    LedOnly,
}

impl Mode {
    /// All modes in display order
    pub const ALL: [Mode; 3] = [Mode::Temperature, Mode::SwitchValue, Mode::LedOnly];

    /// Short tag used in log lines
    pub fn tag(&self) -> &'static str {
        match self {
            Mode::Temperature => "TEMP",
            Mode::SwitchValue => "SW",
            Mode::LedOnly => "LED",
        }
    }

    /// Device switch setting that selects this mode on the board
    pub fn device_switches(&self) -> &'static str {
        match self {
            Mode::Temperature => "sw[10]=0, sw[9]=0, sw[8]=1",
            Mode::SwitchValue => "sw[10]=1, sw[9]=0, sw[8]=0",
            Mode::LedOnly => "sw[10]=0, sw[9]=1, sw[8]=0",
        }
    }

    /// What the display shows while this mode is active
    pub fn showing(&self) -> &'static str {
        match self {
            Mode::Temperature => "Temperature",
            Mode::SwitchValue => "SW[7:0] value",
            Mode::LedOnly => "Nothing (RX only)",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for Mode {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "temp" | "temperature" => Ok(Mode::Temperature),
            "sw" | "switch" | "switchvalue" => Ok(Mode::SwitchValue),
            "led" | "ledonly" => Ok(Mode::LedOnly),
            other => Err(InputError::InvalidCommand {
                reason: format!("unknown mode '{}', expected temp, sw or led", other),
            }),
        }
    }
}

/// Values retained for display, one per interpreting mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Retained {
    /// Last raw byte received in `Temperature` mode, or 0
    pub temperature_raw: u8,
    /// Last raw byte received in `SwitchValue` mode, or 0
    pub switch_raw: u8,
}

/// A mode transition reported by [`ModeState::set_mode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeChange {
    /// Mode before the change
    pub from: Mode,
    /// Mode after the change
    pub to: Mode,
}

/// Consistent view of the mode and its retained values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeSnapshot {
    /// Current mode
    pub mode: Mode,
    /// Retained values
    pub retained: Retained,
}

/// Current mode plus the retained values
///
/// Written by the operator (mode selection) and by the receive loop (one
/// decode per byte). Both paths take the same short lock, so a byte is always
/// decoded under a mode the operator actually selected and its retained-value
/// update cannot interleave with a mode switch. The `*_published` variants
/// also publish under that lock, so observers see events in decode order.
#[derive(Debug, Default)]
pub struct ModeState {
    inner: Mutex<ModeSnapshot>,
}

impl ModeState {
    /// Create state in `Temperature` mode with cleared values
    pub fn new() -> Self {
        Self::default()
    }

    /// Mode in effect at call time
    pub fn get_mode(&self) -> Mode {
        self.inner.lock().mode
    }

    /// Retained values at call time
    pub fn retained(&self) -> Retained {
        self.inner.lock().retained
    }

    /// Mode and retained values read under one lock
    pub fn snapshot(&self) -> ModeSnapshot {
        *self.inner.lock()
    }

    /// Select a new mode
    ///
    /// Returns `None` if the mode is unchanged. Otherwise both retained values
    /// are reset and the transition is returned.
    pub fn set_mode(&self, mode: Mode) -> Option<ModeChange> {
        let mut inner = self.inner.lock();
        Self::switch(&mut inner, mode)
    }

    /// Select a new mode and publish `ModeChanged` before the lock is released
    ///
    /// Any byte decoded under the old mode reaches `sink` before the change,
    /// and any byte decoded under the new mode after it. `sink` must not call
    /// back into this state.
    pub fn set_mode_published(&self, mode: Mode, sink: &dyn EventSink) -> Option<ModeChange> {
        let mut inner = self.inner.lock();
        let change = Self::switch(&mut inner, mode)?;
        sink.publish(LinkEvent::ModeChanged {
            from: change.from,
            to: change.to,
        });
        Some(change)
    }

    fn switch(inner: &mut ModeSnapshot, mode: Mode) -> Option<ModeChange> {
        if inner.mode == mode {
            return None;
        }

        let change = ModeChange {
            from: inner.mode,
            to: mode,
        };
        inner.mode = mode;
        inner.retained = Retained::default();

        tracing::info!("Display mode changed to: {}", mode);
        Some(change)
    }

    /// Decode one received byte under the mode current at this instant
    pub fn apply(&self, raw: u8) -> DecodedEvent {
        let mut inner = self.inner.lock();
        let decoded = decode(inner.mode, raw);
        inner.retained = decoded.retained;
        decoded.event
    }

    /// Decode one byte and publish `Received` before the lock is released
    ///
    /// Same ordering guarantee as [`set_mode_published`](Self::set_mode_published).
    pub fn apply_published(&self, raw: u8, sink: &dyn EventSink) -> DecodedEvent {
        let mut inner = self.inner.lock();
        let decoded = decode(inner.mode, raw);
        inner.retained = decoded.retained;
        sink.publish(LinkEvent::Received(decoded.event));
        decoded.event
    }
}
