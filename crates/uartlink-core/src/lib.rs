//! # UARTLink Core
//!
//! Core types for the byte-oriented device link.
//! Provides the decoding mode, the mode-scoped decoder, link events,
//! the display view-model, the audit log and error types.
//! Nothing in this crate touches a serial port.

pub mod audit;
pub mod constants;
pub mod decoder;
pub mod display;
pub mod error;
pub mod event_bus;
pub mod mode;

pub use audit::{AuditEntry, AuditLog};
pub use decoder::{decode, Decoded, DecodedEvent, Temperature};
pub use display::DisplayModel;
pub use error::{ConnectionError, Error, InputError, Result};
pub use mode::{Mode, ModeChange, ModeSnapshot, ModeState, Retained};

// Re-export event bus for convenience
pub use event_bus::{EventSink, LinkEvent, MemorySink};
