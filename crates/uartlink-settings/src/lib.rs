//! UARTLink Settings Crate
//!
//! Handles application configuration and settings persistence.

pub mod config;
pub mod error;

pub use config::{Config, ConnectionSettings, ConsoleSettings};
pub use error::{SettingsError, SettingsResult};
