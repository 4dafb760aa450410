//! Link session
//!
//! The foreground controller: owns the write half of the connection, the
//! receive loop handle and the shared [`ModeState`]. Every operator action
//! goes through here.

use crate::communication::serial::NativeSerialChannel;
use crate::communication::{ConnectionParams, SerialChannel};
use crate::receiver::{ReceiveExit, ReceiveLoop, ReceiverHandle};
use crate::transmit::{parse_hex_byte, transmit, Preset};
use std::sync::Arc;
use uartlink_core::{ConnectionError, EventSink, LinkEvent, Mode, ModeState, Result};

struct ActiveConnection {
    port: String,
    writer: Box<dyn SerialChannel>,
    receiver: ReceiverHandle,
}

/// One operator session against the device
pub struct LinkSession {
    mode: Arc<ModeState>,
    sink: Arc<dyn EventSink>,
    connection: Option<ActiveConnection>,
}

impl LinkSession {
    /// Create a disconnected session in `Temperature` mode
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            mode: Arc::new(ModeState::new()),
            sink,
            connection: None,
        }
    }

    /// Shared mode state
    pub fn mode_state(&self) -> &Arc<ModeState> {
        &self.mode
    }

    /// Current mode
    pub fn mode(&self) -> Mode {
        self.mode.get_mode()
    }

    /// True while a connection is open
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Port of the open connection
    pub fn port(&self) -> Option<&str> {
        self.connection.as_ref().map(|c| c.port.as_str())
    }

    /// Open the serial port described by `params`
    pub fn connect(&mut self, params: &ConnectionParams) -> Result<()> {
        if self.is_connected() {
            return Err(ConnectionError::AlreadyConnected.into());
        }

        let channel = NativeSerialChannel::open(params)?;
        self.connect_channel(Box::new(channel))
    }

    /// Start a session over an already open channel
    pub fn connect_channel(&mut self, channel: Box<dyn SerialChannel>) -> Result<()> {
        if self.is_connected() {
            return Err(ConnectionError::AlreadyConnected.into());
        }

        let port = channel.name();
        let reader = channel
            .try_clone_channel()
            .map_err(|e| ConnectionError::SerialError {
                reason: format!("failed to clone {}: {}", port, e),
            })?;

        let receiver = ReceiveLoop::new(reader, self.mode.clone(), self.sink.clone()).spawn()?;

        self.connection = Some(ActiveConnection {
            port: port.clone(),
            writer: channel,
            receiver,
        });

        tracing::info!("Connected to {}", port);
        self.sink.publish(LinkEvent::Connected { port });
        Ok(())
    }

    /// Close the connection; a no-op when disconnected
    pub fn disconnect(&mut self) -> Result<()> {
        let Some(connection) = self.connection.take() else {
            return Ok(());
        };

        let exit = connection.receiver.stop();
        drop(connection.writer);

        tracing::info!("Disconnected from {}", connection.port);
        if exit == ReceiveExit::Stopped {
            self.sink.publish(LinkEvent::Disconnected {
                port: connection.port,
            });
        }
        Ok(())
    }

    /// Connect if disconnected, disconnect otherwise
    ///
    /// Returns whether the session is connected afterwards.
    pub fn toggle_connection(&mut self, params: &ConnectionParams) -> Result<bool> {
        if self.is_connected() {
            self.disconnect()?;
        } else {
            self.connect(params)?;
        }
        Ok(self.is_connected())
    }

    /// Reap a receive loop that ended on its own
    ///
    /// Returns the failure reason once, after which the session is
    /// disconnected. The loop has already published `ConnectionLost`.
    pub fn poll_worker(&mut self) -> Option<String> {
        let finished = self
            .connection
            .as_ref()
            .is_some_and(|c| c.receiver.is_finished());
        if !finished {
            return None;
        }

        let connection = self.connection.take()?;
        match connection.receiver.join() {
            ReceiveExit::Failed(reason) => {
                tracing::warn!("Session on {} ended: {}", connection.port, reason);
                Some(reason)
            }
            ReceiveExit::Stopped => None,
        }
    }

    /// Select the decoding mode
    ///
    /// Returns true and publishes `ModeChanged` if the mode actually changed.
    pub fn set_mode(&self, mode: Mode) -> bool {
        self.mode
            .set_mode_published(mode, self.sink.as_ref())
            .is_some()
    }

    /// Send operator hex entry; invalid text never reaches the link
    pub fn send_hex(&mut self, text: &str) -> Result<u8> {
        let value = parse_hex_byte(text)?;
        self.send_byte(value)?;
        Ok(value)
    }

    /// Send one of the fixed preset bytes
    pub fn send_preset(&mut self, preset: Preset) -> Result<()> {
        self.send_byte(preset.value())
    }

    /// Send one byte
    ///
    /// A write failure ends the session.
    pub fn send_byte(&mut self, value: u8) -> Result<()> {
        let connection = self
            .connection
            .as_mut()
            .ok_or(ConnectionError::NotConnected)?;

        match transmit(connection.writer.as_mut(), value) {
            Ok(()) => {
                self.sink.publish(LinkEvent::Transmitted { raw: value });
                Ok(())
            }
            Err(e) => {
                let reason = e.to_string();
                self.fail(reason.clone());
                Err(ConnectionError::ConnectionLost { reason }.into())
            }
        }
    }

    fn fail(&mut self, reason: String) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        tracing::error!("Write error on {}: {}", connection.port, reason);
        // The loop publishes its own ConnectionLost if it saw the failure first.
        if let ReceiveExit::Stopped = connection.receiver.stop() {
            self.sink.publish(LinkEvent::ConnectionLost {
                port: connection.port,
                reason,
            });
        }
    }
}

impl Drop for LinkSession {
    fn drop(&mut self) {
        let _ = self.disconnect();
    }
}
