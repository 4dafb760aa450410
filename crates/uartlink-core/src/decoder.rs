//! Byte decoder
//!
//! Maps `(mode, raw byte)` to exactly one [`DecodedEvent`] and the retained
//! values that follow from it. A byte only ever sets the retained value of the
//! mode it arrived under; every other retained value is cleared on every byte,
//! not just on a mode switch, so a value from an earlier mode can never be
//! shown again.
//!
//! The function is total: all 256 byte values are valid in all three modes.

use crate::constants::CENTI_CELSIUS_PER_COUNT;
use crate::mode::{Mode, Retained};
use serde::{Deserialize, Serialize};

/// Fixed-point temperature reading
///
/// One raw count is 0.25 °C, so 0..=255 maps to 0.00..=63.75 °C exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Temperature {
    raw: u8,
}

impl Temperature {
    /// Temperature for a raw device count
    pub fn from_raw(raw: u8) -> Self {
        Self { raw }
    }

    /// The raw device count
    pub fn raw(&self) -> u8 {
        self.raw
    }

    /// Temperature in hundredths of a degree
    pub fn centi_celsius(&self) -> u16 {
        u16::from(self.raw) * CENTI_CELSIUS_PER_COUNT
    }

    /// Whole degrees
    pub fn whole(&self) -> u8 {
        (self.centi_celsius() / 100) as u8
    }

    /// Hundredths of a degree, 0..=99
    pub fn hundredths(&self) -> u8 {
        (self.centi_celsius() % 100) as u8
    }
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.whole(), self.hundredths())
    }
}

/// What one byte meant under the mode active when it arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodedEvent {
    /// Byte interpreted as a temperature
    TemperatureReading {
        /// Raw byte
        raw: u8,
        /// Whole degrees Celsius
        celsius_int: u8,
        /// Hundredths of a degree, rendered zero-padded to two digits
        celsius_frac: u8,
    },
    /// Byte interpreted as SW[7:0]
    SwitchReading(u8),
    /// Byte acknowledged without interpretation
    LedEvent(u8),
}

impl DecodedEvent {
    /// The raw byte that produced this event
    pub fn raw(&self) -> u8 {
        match *self {
            DecodedEvent::TemperatureReading { raw, .. } => raw,
            DecodedEvent::SwitchReading(raw) | DecodedEvent::LedEvent(raw) => raw,
        }
    }

    /// The mode the byte was decoded under
    pub fn mode(&self) -> Mode {
        match self {
            DecodedEvent::TemperatureReading { .. } => Mode::Temperature,
            DecodedEvent::SwitchReading(_) => Mode::SwitchValue,
            DecodedEvent::LedEvent(_) => Mode::LedOnly,
        }
    }

    /// The temperature, for temperature readings
    pub fn temperature(&self) -> Option<Temperature> {
        match *self {
            DecodedEvent::TemperatureReading { raw, .. } => Some(Temperature::from_raw(raw)),
            _ => None,
        }
    }
}

impl std::fmt::Display for DecodedEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodedEvent::TemperatureReading {
                raw,
                celsius_int,
                celsius_frac,
            } => write!(
                f,
                "[TEMP] RX <- 0x{:02X} = {}.{:02} °C",
                raw, celsius_int, celsius_frac
            ),
            DecodedEvent::SwitchReading(raw) => write!(f, "[SW] RX <- 0x{:02X} = SW value", raw),
            DecodedEvent::LedEvent(raw) => write!(f, "[LED] RX <- 0x{:02X}", raw),
        }
    }
}

/// Result of decoding one byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    /// Event to publish
    pub event: DecodedEvent,
    /// Retained values after this byte
    pub retained: Retained,
}

/// Decode one raw byte under `mode`
pub fn decode(mode: Mode, raw: u8) -> Decoded {
    match mode {
        Mode::Temperature => {
            let temperature = Temperature::from_raw(raw);
            Decoded {
                event: DecodedEvent::TemperatureReading {
                    raw,
                    celsius_int: temperature.whole(),
                    celsius_frac: temperature.hundredths(),
                },
                retained: Retained {
                    temperature_raw: raw,
                    switch_raw: 0,
                },
            }
        }
        Mode::SwitchValue => Decoded {
            event: DecodedEvent::SwitchReading(raw),
            retained: Retained {
                temperature_raw: 0,
                switch_raw: raw,
            },
        },
        Mode::LedOnly => Decoded {
            event: DecodedEvent::LedEvent(raw),
            retained: Retained::default(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_fixed_point() {
        assert_eq!(Temperature::from_raw(0).to_string(), "0.00");
        assert_eq!(Temperature::from_raw(4).to_string(), "1.00");
        assert_eq!(Temperature::from_raw(255).to_string(), "63.75");
        assert_eq!(Temperature::from_raw(1).to_string(), "0.25");
        assert_eq!(Temperature::from_raw(255).centi_celsius(), 6375);
    }

    #[test]
    fn test_decode_temperature() {
        let decoded = decode(Mode::Temperature, 4);
        assert_eq!(
            decoded.event,
            DecodedEvent::TemperatureReading {
                raw: 4,
                celsius_int: 1,
                celsius_frac: 0
            }
        );
        assert_eq!(
            decoded.retained,
            Retained {
                temperature_raw: 4,
                switch_raw: 0
            }
        );
    }

    #[test]
    fn test_decode_switch_clears_temperature() {
        let decoded = decode(Mode::SwitchValue, 0xA5);
        assert_eq!(decoded.event, DecodedEvent::SwitchReading(0xA5));
        assert_eq!(decoded.retained.temperature_raw, 0);
        assert_eq!(decoded.retained.switch_raw, 0xA5);
    }

    #[test]
    fn test_decode_led_produces_no_values() {
        for raw in [0x00, 0x55, 0xFF] {
            let decoded = decode(Mode::LedOnly, raw);
            assert_eq!(decoded.event, DecodedEvent::LedEvent(raw));
            assert_eq!(decoded.retained, Retained::default());
        }
    }

    #[test]
    fn test_event_display() {
        assert_eq!(
            decode(Mode::Temperature, 0x04).event.to_string(),
            "[TEMP] RX <- 0x04 = 1.00 °C"
        );
        assert_eq!(
            decode(Mode::SwitchValue, 0x10).event.to_string(),
            "[SW] RX <- 0x10 = SW value"
        );
        assert_eq!(decode(Mode::LedOnly, 0x55).event.to_string(), "[LED] RX <- 0x55");
    }

    #[test]
    fn test_event_accessors() {
        let event = decode(Mode::Temperature, 200).event;
        assert_eq!(event.raw(), 200);
        assert_eq!(event.mode(), Mode::Temperature);
        assert_eq!(event.temperature().map(|t| t.to_string()), Some("50.00".to_string()));
        assert!(DecodedEvent::SwitchReading(1).temperature().is_none());
    }
}
