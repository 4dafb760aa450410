//! Transmit path and manual-send validation
//!
//! Operator text is validated here; only a `u8` ever reaches the channel.

use crate::communication::SerialChannel;
use std::io;
use std::str::FromStr;
use uartlink_core::InputError;

/// Parse operator hex entry into a byte
///
/// Accepts one or two hex digits, optionally prefixed with `0x`, surrounding
/// whitespace ignored. Anything else is rejected.
pub fn parse_hex_byte(text: &str) -> Result<u8, InputError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(InputError::Empty);
    }

    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() || digits.len() > 2 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(InputError::InvalidHex {
            input: text.to_string(),
        });
    }

    u8::from_str_radix(digits, 16).map_err(|_| InputError::InvalidHex {
        input: text.to_string(),
    })
}

/// Fixed one-press byte values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// 0x00
    Zero,
    /// 0x55
    Alternating01,
    /// 0xAA
    Alternating10,
    /// 0xFF
    Full,
}

impl Preset {
    /// All presets in button order
    pub const ALL: [Preset; 4] = [
        Preset::Zero,
        Preset::Alternating01,
        Preset::Alternating10,
        Preset::Full,
    ];

    /// The byte this preset sends
    pub fn value(&self) -> u8 {
        match self {
            Preset::Zero => 0x00,
            Preset::Alternating01 => 0x55,
            Preset::Alternating10 => 0xAA,
            Preset::Full => 0xFF,
        }
    }

    /// Preset for a byte, if it is one of the four
    pub fn from_value(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.value() == value)
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:02X}", self.value())
    }
}

impl FromStr for Preset {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = parse_hex_byte(s)?;
        Preset::from_value(value).ok_or_else(|| InputError::InvalidCommand {
            reason: format!("no preset 0x{:02X}, expected 00, 55, AA or FF", value),
        })
    }
}

/// Write one byte to the device
pub fn transmit(channel: &mut dyn SerialChannel, value: u8) -> io::Result<()> {
    channel.write_byte(value)?;
    tracing::debug!("TX -> 0x{:02X}", value);
    Ok(())
}
