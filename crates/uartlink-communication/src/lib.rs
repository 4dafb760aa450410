//! # UARTLink Communication
//!
//! Serial transport and the link session for UARTLink.
//! A background receive loop decodes every byte under the operator-selected
//! mode; the session handles connect, disconnect, mode changes and sends.

pub mod communication;
pub mod receiver;
pub mod session;
pub mod transmit;

pub use communication::{
    serial::{list_ports, NativeSerialChannel, SerialPortInfo},
    ConnectionParams, SerialChannel,
};
pub use receiver::{ReceiveExit, ReceiveLoop, ReceiverHandle};
pub use session::LinkSession;
pub use transmit::{parse_hex_byte, transmit, Preset};
