//! Scripted in-memory serial channel for driving the link without hardware

#![allow(dead_code)]

use parking_lot::{Condvar, Mutex};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uartlink_communication::SerialChannel;
use uartlink_core::{EventSink, LinkEvent, MemorySink};

/// Something the device does
pub enum Step {
    /// Device sends a byte
    Byte(u8),
    /// The link fails with this error kind
    Fail(io::ErrorKind),
}

/// Test-side controls for a [`ScriptedChannel`]
#[derive(Clone)]
pub struct Script {
    tx: mpsc::Sender<Step>,
    written: Arc<Mutex<Vec<u8>>>,
    fail_writes: Arc<AtomicBool>,
}

impl Script {
    pub fn send(&self, raw: u8) {
        let _ = self.tx.send(Step::Byte(raw));
    }

    pub fn send_all(&self, bytes: &[u8]) {
        for raw in bytes {
            self.send(*raw);
        }
    }

    pub fn fail_reads(&self, kind: io::ErrorKind) {
        let _ = self.tx.send(Step::Fail(kind));
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn written(&self) -> Vec<u8> {
        self.written.lock().clone()
    }
}

/// Channel whose reads come from a [`Script`] and whose writes are recorded
pub struct ScriptedChannel {
    name: String,
    timeout: Duration,
    rx: Arc<Mutex<mpsc::Receiver<Step>>>,
    written: Arc<Mutex<Vec<u8>>>,
    fail_writes: Arc<AtomicBool>,
}

impl ScriptedChannel {
    pub fn new(name: &str, timeout: Duration) -> (Self, Script) {
        let (tx, rx) = mpsc::channel();
        let written = Arc::new(Mutex::new(Vec::new()));
        let fail_writes = Arc::new(AtomicBool::new(false));
        let channel = Self {
            name: name.to_string(),
            timeout,
            rx: Arc::new(Mutex::new(rx)),
            written: written.clone(),
            fail_writes: fail_writes.clone(),
        };
        let script = Script {
            tx,
            written,
            fail_writes,
        };
        (channel, script)
    }
}

impl SerialChannel for ScriptedChannel {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let rx = self.rx.lock();
        match rx.recv_timeout(self.timeout) {
            Ok(Step::Byte(raw)) => Ok(Some(raw)),
            Ok(Step::Fail(kind)) => Err(io::Error::new(kind, "scripted failure")),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                std::thread::sleep(self.timeout);
                Ok(None)
            }
        }
    }

    fn write_byte(&mut self, value: u8) -> io::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device removed"));
        }
        self.written.lock().push(value);
        Ok(())
    }

    fn try_clone_channel(&self) -> io::Result<Box<dyn SerialChannel>> {
        Ok(Box::new(Self {
            name: self.name.clone(),
            timeout: self.timeout,
            rx: self.rx.clone(),
            written: self.written.clone(),
            fail_writes: self.fail_writes.clone(),
        }))
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

/// Poll `sink` until `done` holds or two seconds pass
pub fn wait_for(sink: &MemorySink, done: impl Fn(&[LinkEvent]) -> bool) -> Vec<LinkEvent> {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let events = sink.events();
        if done(&events) || Instant::now() >= deadline {
            return events;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}

/// Bytes of every `Received` event, in order
pub fn received_raws(events: &[LinkEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|e| match e {
            LinkEvent::Received(decoded) => Some(decoded.raw()),
            _ => None,
        })
        .collect()
}

/// Sink that can hold the receive loop inside `publish(Received)`
#[derive(Default)]
pub struct GatedSink {
    events: MemorySink,
    closed: Mutex<bool>,
    released: Condvar,
    holding: AtomicBool,
}

impl GatedSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every later `Received` until [`open`](Self::open)
    pub fn close(&self) {
        *self.closed.lock() = true;
    }

    pub fn open(&self) {
        *self.closed.lock() = false;
        self.released.notify_all();
    }

    /// Wait up to two seconds for a publisher to be held at the gate
    pub fn wait_holding(&self) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while !self.holding.load(Ordering::SeqCst) {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        true
    }

    pub fn events(&self) -> Vec<LinkEvent> {
        self.events.events()
    }
}

impl EventSink for GatedSink {
    fn publish(&self, event: LinkEvent) {
        if matches!(event, LinkEvent::Received(_)) {
            let mut closed = self.closed.lock();
            while *closed {
                self.holding.store(true, Ordering::SeqCst);
                self.released.wait(&mut closed);
            }
        }
        self.events.publish(event);
    }
}
