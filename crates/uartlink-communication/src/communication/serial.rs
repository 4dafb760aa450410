//! Serial port communication implementation
//!
//! Provides low-level serial port operations for the device link over
//! USB-UART bridges.
//!
//! Supports:
//! - Port enumeration and discovery
//! - 8-N-1 framing at a configurable (normally fixed) baud rate
//! - Blocking-with-timeout single byte reads
//! - Independent read and write handles via `try_clone`

use super::{ConnectionParams, SerialChannel};
use std::io::{self, Read, Write};
use uartlink_core::{ConnectionError, Error, Result};

/// Information about an available serial port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialPortInfo {
    /// Port name (e.g., "/dev/ttyUSB0", "COM3")
    pub port_name: String,

    /// Port description (e.g., "USB Serial Port")
    pub description: String,

    /// Manufacturer name if available
    pub manufacturer: Option<String>,

    /// Serial number if available
    pub serial_number: Option<String>,

    /// USB vendor ID if applicable
    pub vid: Option<u16>,

    /// USB product ID if applicable
    pub pid: Option<u16>,
}

impl SerialPortInfo {
    /// Create a new port info
    pub fn new(port_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            description: description.into(),
            manufacturer: None,
            serial_number: None,
            vid: None,
            pid: None,
        }
    }

    /// Set manufacturer
    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    /// Set serial number
    pub fn with_serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = Some(serial_number.into());
        self
    }

    /// Set USB IDs
    pub fn with_usb_ids(mut self, vid: u16, pid: u16) -> Self {
        self.vid = Some(vid);
        self.pid = Some(pid);
        self
    }
}

impl std::fmt::Display for SerialPortInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.port_name, self.description)?;
        if let (Some(vid), Some(pid)) = (self.vid, self.pid) {
            write!(f, " [{:04x}:{:04x}]", vid, pid)?;
        }
        Ok(())
    }
}

/// List available serial ports on the system, sorted by name
pub fn list_ports() -> Result<Vec<SerialPortInfo>> {
    let ports = serialport::available_ports().map_err(|e| {
        tracing::error!("Failed to enumerate serial ports: {}", e);
        Error::other(format!("Failed to enumerate ports: {}", e))
    })?;

    let mut infos: Vec<SerialPortInfo> = ports.iter().map(to_port_info).collect();
    infos.sort_by(|a, b| a.port_name.cmp(&b.port_name));
    Ok(infos)
}

fn to_port_info(port: &serialport::SerialPortInfo) -> SerialPortInfo {
    let info = SerialPortInfo::new(&port.port_name, get_port_description(port));

    match &port.port_type {
        serialport::SerialPortType::UsbPort(usb_info) => {
            let mut info = info.with_usb_ids(usb_info.vid, usb_info.pid);
            if let Some(ref mfg) = usb_info.manufacturer {
                info = info.with_manufacturer(mfg);
            }
            if let Some(ref serial) = usb_info.serial_number {
                info = info.with_serial_number(serial);
            }
            info
        }
        _ => info,
    }
}

/// Get a user-friendly description for a port
fn get_port_description(port: &serialport::SerialPortInfo) -> String {
    match &port.port_type {
        serialport::SerialPortType::UsbPort(usb_info) => {
            format!(
                "USB {} {}",
                usb_info.manufacturer.as_deref().unwrap_or("Device"),
                usb_info.product.as_deref().unwrap_or("Serial Port")
            )
        }
        serialport::SerialPortType::BluetoothPort => "Bluetooth Serial".to_string(),
        serialport::SerialPortType::PciPort => "PCI Serial".to_string(),
        _ => "Serial Port".to_string(),
    }
}

/// Map a byte read result onto the channel contract
///
/// A timeout is not an error. End of stream means the port went away.
pub(crate) fn classify_read(result: io::Result<usize>, buf: &[u8; 1]) -> io::Result<Option<u8>> {
    match result {
        Ok(0) => Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "serial port closed",
        )),
        Ok(_) => Ok(Some(buf[0])),
        Err(e)
            if matches!(
                e.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
            ) =>
        {
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Serial channel backed by the `serialport` crate
pub struct NativeSerialChannel {
    port: Box<dyn serialport::SerialPort>,
    name: String,
}

impl NativeSerialChannel {
    /// Open a serial port with the given parameters
    pub fn open(params: &ConnectionParams) -> Result<Self> {
        params.validate()?;

        let builder = serialport::new(&params.port, params.baud_rate)
            .timeout(params.read_timeout())
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None)
            .flow_control(serialport::FlowControl::None);

        match builder.open() {
            Ok(port) => {
                tracing::debug!(
                    "Opened {} at {} baud (8-N-1, timeout {} ms)",
                    params.port,
                    params.baud_rate,
                    params.read_timeout_ms
                );
                Ok(Self {
                    port,
                    name: params.port.clone(),
                })
            }
            Err(e) => {
                tracing::warn!("Failed to open serial port {}: {}", params.port, e);
                let err = match e.kind {
                    serialport::ErrorKind::NoDevice => ConnectionError::PortNotFound {
                        port: params.port.clone(),
                    },
                    _ => ConnectionError::FailedToOpen {
                        port: params.port.clone(),
                        reason: e.to_string(),
                    },
                };
                Err(err.into())
            }
        }
    }
}

impl SerialChannel for NativeSerialChannel {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        let result = self.port.read(&mut buf);
        classify_read(result, &buf)
    }

    fn write_byte(&mut self, value: u8) -> io::Result<()> {
        self.port.write_all(&[value])?;
        self.port.flush()
    }

    fn try_clone_channel(&self) -> io::Result<Box<dyn SerialChannel>> {
        let port = self.port.try_clone().map_err(io::Error::from)?;
        Ok(Box::new(Self {
            port,
            name: self.name.clone(),
        }))
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}
