//! Receive loop
//!
//! A dedicated OS thread owns the read half of the connection. It blocks on
//! one byte at a time (bounded by the channel's read timeout), decodes each
//! byte under the mode current at arrival and publishes the result. Events go
//! out in wire order because one thread reads, decodes and publishes, and a
//! byte is published under the same lock that decoded it.

use crate::communication::SerialChannel;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use uartlink_core::{ConnectionError, EventSink, LinkEvent, ModeState, Result};

/// Why the receive loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiveExit {
    /// Stop was requested
    Stopped,
    /// The connection failed; `ConnectionLost` has been published
    Failed(String),
}

/// Background reader for one connection
pub struct ReceiveLoop {
    channel: Box<dyn SerialChannel>,
    mode: Arc<ModeState>,
    sink: Arc<dyn EventSink>,
    stop: Arc<AtomicBool>,
    port: String,
}

impl ReceiveLoop {
    /// Create a loop over `channel`; nothing runs until [`spawn`](Self::spawn)
    pub fn new(
        channel: Box<dyn SerialChannel>,
        mode: Arc<ModeState>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let port = channel.name();
        Self {
            channel,
            mode,
            sink,
            stop: Arc::new(AtomicBool::new(false)),
            port,
        }
    }

    /// Start the loop on its own thread
    pub fn spawn(self) -> Result<ReceiverHandle> {
        let stop = self.stop.clone();
        let thread = thread::Builder::new()
            .name("uartlink-rx".to_string())
            .spawn(move || self.run())
            .map_err(|e| ConnectionError::IoError {
                reason: format!("failed to start receive thread: {}", e),
            })?;

        Ok(ReceiverHandle {
            stop,
            thread: Some(thread),
        })
    }

    /// Run on the current thread until stopped or the connection fails
    pub fn run(mut self) -> ReceiveExit {
        tracing::debug!("Receive loop started on {}", self.port);

        while !self.stop.load(Ordering::Acquire) {
            match self.channel.read_byte() {
                Ok(Some(raw)) => {
                    let decoded = self.mode.apply_published(raw, self.sink.as_ref());
                    tracing::trace!("{}", decoded);
                }
                Ok(None) => {}
                Err(e) => {
                    let reason = e.to_string();
                    tracing::error!("Read error on {}: {}", self.port, reason);
                    self.sink.publish(LinkEvent::ConnectionLost {
                        port: self.port.clone(),
                        reason: reason.clone(),
                    });
                    return ReceiveExit::Failed(reason);
                }
            }
        }

        tracing::debug!("Receive loop on {} stopped", self.port);
        ReceiveExit::Stopped
    }
}

/// Control handle for a spawned [`ReceiveLoop`]
#[derive(Debug)]
pub struct ReceiverHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<ReceiveExit>>,
}

impl ReceiverHandle {
    /// Ask the loop to stop; honoured within one read timeout
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// True once the loop thread has returned
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Wait for the loop to end without requesting a stop
    pub fn join(mut self) -> ReceiveExit {
        self.join_inner()
    }

    /// Request a stop and wait for the loop to end
    pub fn stop(mut self) -> ReceiveExit {
        self.request_stop();
        self.join_inner()
    }

    fn join_inner(&mut self) -> ReceiveExit {
        match self.thread.take().map(JoinHandle::join) {
            Some(Ok(exit)) => exit,
            Some(Err(_)) => ReceiveExit::Failed("receive thread panicked".to_string()),
            None => ReceiveExit::Stopped,
        }
    }
}

impl Drop for ReceiverHandle {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.request_stop();
            let _ = self.join_inner();
        }
    }
}
