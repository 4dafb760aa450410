//! Link-wide constants

use std::time::Duration;

/// Fixed baud rate of the device link
pub const BAUD_RATE: u32 = 1_000_000;

/// Default read timeout of the receive loop, in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 100;

/// Default read timeout of the receive loop
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(DEFAULT_READ_TIMEOUT_MS);

/// Hundredths of a degree Celsius per raw temperature count
pub const CENTI_CELSIUS_PER_COUNT: u16 = 25;

/// Default number of audit lines kept in memory
pub const DEFAULT_AUDIT_CAPACITY: usize = 1000;
