//! # UARTLink
//!
//! Operator console for a byte-oriented UART link to an FPGA board.
//!
//! The board sends single bytes whose meaning depends on its switch setting:
//! a temperature count, the SW[7:0] switch bank, or an LED echo. The operator
//! selects the matching decode mode; every received byte is decoded under the
//! mode current at arrival and only that mode's value is ever shown.
//!
//! ## Architecture
//!
//! 1. **uartlink-core** - Mode state, decoder, events, display model, audit log
//! 2. **uartlink-communication** - Serial transport, receive loop, link session
//! 3. **uartlink-settings** - Configuration loading and validation
//! 4. **uartlink** - Interactive console binary

pub mod console;

pub use console::{Command, Console, Flow};

pub use uartlink_core::{
    decode, AuditEntry, AuditLog, ConnectionError, Decoded, DecodedEvent, DisplayModel, Error,
    EventSink, InputError, LinkEvent, MemorySink, Mode, ModeState, Result, Retained, Temperature,
};

pub use uartlink_communication::{
    list_ports, parse_hex_byte, ConnectionParams, LinkSession, Preset, SerialChannel,
    SerialPortInfo,
};

pub use uartlink_settings::{Config, ConnectionSettings, ConsoleSettings, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Diagnostics go to stderr so they never interleave with the console
/// output on stdout. `RUST_LOG` overrides the default `info` level.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_names(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Load the configuration and apply command-line overrides
///
/// With no explicit path the platform default location is used, and a
/// missing file means defaults.
pub fn load_config(
    path: Option<&std::path::Path>,
    port: Option<String>,
    baud_rate: Option<u32>,
) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => Config::load_from_file(path)?,
        None => match Config::default_path() {
            Ok(path) => Config::load_or_default(&path)?,
            Err(e) => {
                tracing::warn!("{}, using default settings", e);
                Config::default()
            }
        },
    };

    if let Some(port) = port {
        config.connection.port = port;
    }
    if let Some(baud_rate) = baud_rate {
        config.connection.baud_rate = baud_rate;
    }

    config.validate()?;
    Ok(config)
}
