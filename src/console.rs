//! Interactive operator console
//!
//! Line commands typed by the operator are parsed into [`Command`] and run
//! against a [`LinkSession`]. Link events update the [`DisplayModel`] and the
//! [`AuditLog`]; the console never decodes bytes itself.

use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;

use uartlink_communication::{list_ports, LinkSession, Preset};
use uartlink_core::{
    AuditLog, DisplayModel, Error, EventSink, InputError, LinkEvent, Mode, Result,
};
use uartlink_settings::Config;

const HELP: &str = "\
Commands:
  ports               list serial ports
  connect [port]      open the configured port, or the one given
  disconnect          close the connection
  toggle              connect or disconnect
  mode temp|sw|led    select the decode mode (must match the board switches)
  send [hex]          send one byte, 00-FF (default from settings)
  preset 00|55|AA|FF  send a preset byte
  status              show the display
  help                show this help
  quit                exit";

/// One operator command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List serial ports
    Ports,
    /// Connect to the given port, or the configured one
    Connect(Option<String>),
    /// Close the connection
    Disconnect,
    /// Connect if disconnected, disconnect otherwise
    Toggle,
    /// Select the decode mode
    Mode(Mode),
    /// Hex text as typed, or the configured default; validated by the
    /// session before anything is sent
    Send(Option<String>),
    /// Send a preset byte
    Preset(Preset),
    /// Print the display
    Status,
    /// Print the command list
    Help,
    /// Disconnect and exit
    Quit,
}

impl Command {
    /// Parse one input line
    pub fn parse(line: &str) -> std::result::Result<Self, InputError> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(InputError::Empty);
        };
        let arg = words.next();
        if let Some(extra) = words.next() {
            return Err(InputError::InvalidCommand {
                reason: format!("unexpected argument '{}'", extra),
            });
        }

        let command = match (verb.to_ascii_lowercase().as_str(), arg) {
            ("ports", None) => Command::Ports,
            ("connect", port) => Command::Connect(port.map(str::to_string)),
            ("disconnect", None) => Command::Disconnect,
            ("toggle", None) => Command::Toggle,
            ("mode", Some(mode)) => Command::Mode(mode.parse()?),
            ("send", hex) => Command::Send(hex.map(str::to_string)),
            ("preset", Some(preset)) => Command::Preset(preset.parse()?),
            ("status", None) => Command::Status,
            ("help" | "?", None) => Command::Help,
            ("quit" | "exit", None) => Command::Quit,
            ("mode" | "preset", None) => {
                return Err(InputError::InvalidCommand {
                    reason: format!("'{}' needs an argument", verb),
                })
            }
            (_, Some(_)) if is_known(verb) => {
                return Err(InputError::InvalidCommand {
                    reason: format!("'{}' takes no argument", verb),
                })
            }
            _ => {
                return Err(InputError::InvalidCommand {
                    reason: format!("unknown command '{}', try 'help'", verb),
                })
            }
        };
        Ok(command)
    }
}

fn is_known(verb: &str) -> bool {
    matches!(
        verb.to_ascii_lowercase().as_str(),
        "ports" | "disconnect" | "toggle" | "status" | "help" | "?" | "quit" | "exit"
    )
}

impl FromStr for Command {
    type Err = InputError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Command::parse(s)
    }
}

/// Whether the console keeps running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next command
    Continue,
    /// Stop the console
    Quit,
}

/// Console state: the session plus what the operator sees
pub struct Console {
    session: LinkSession,
    display: DisplayModel,
    audit: AuditLog,
    config: Config,
}

impl Console {
    /// Create a disconnected console publishing link events to `sink`
    pub fn new(config: Config, sink: Arc<dyn EventSink>) -> Self {
        Self {
            session: LinkSession::new(sink),
            display: DisplayModel::new(),
            audit: AuditLog::new(config.console.audit_capacity),
            config,
        }
    }

    /// Link session driven by this console
    pub fn session(&self) -> &LinkSession {
        &self.session
    }

    /// Mutable link session
    pub fn session_mut(&mut self) -> &mut LinkSession {
        &mut self.session
    }

    /// What the operator currently sees
    pub fn display(&self) -> &DisplayModel {
        &self.display
    }

    /// Audit lines recorded so far
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Settings in effect, including the last port connected to
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one command, writing any reply to `out`
    pub fn execute(&mut self, command: Command, out: &mut dyn Write) -> Result<Flow> {
        match command {
            Command::Ports => {
                let ports = list_ports()?;
                if ports.is_empty() {
                    writeln!(out, "No serial ports found")?;
                }
                for port in ports {
                    writeln!(out, "  {}", port)?;
                }
            }
            Command::Connect(port) => {
                if let Some(port) = port {
                    self.config.connection.port = port;
                }
                self.session.connect(&self.config.connection.to_params())?;
            }
            Command::Disconnect => {
                if !self.session.is_connected() {
                    writeln!(out, "Not connected")?;
                }
                self.session.disconnect()?;
            }
            Command::Toggle => {
                self.session
                    .toggle_connection(&self.config.connection.to_params())?;
            }
            Command::Mode(mode) => {
                if !self.session.set_mode(mode) {
                    writeln!(out, "Already in {} mode", mode)?;
                }
            }
            Command::Send(hex) => {
                let hex = hex.unwrap_or_else(|| self.config.console.default_hex.clone());
                self.session.send_hex(&hex)?;
            }
            Command::Preset(preset) => {
                self.session.send_preset(preset)?;
            }
            Command::Status => {
                writeln!(out, "{}", self.display)?;
            }
            Command::Help => {
                writeln!(out, "{}", HELP)?;
            }
            Command::Quit => {
                self.session.disconnect()?;
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    /// Apply a link event to the display and audit log
    ///
    /// Returns the audit line for the event.
    pub fn handle_event(&mut self, event: &LinkEvent) -> String {
        self.display.apply(event);
        self.audit.record(event).to_string()
    }

    /// Text shown to the operator for a failed command
    ///
    /// Errors that end the session are marked so they stand out from
    /// rejected input.
    pub fn describe_error(&self, err: &Error) -> String {
        if err.is_terminal() {
            format!("Session ended: {}", err)
        } else {
            err.to_string()
        }
    }

    /// Reap a receive loop that ended on its own
    pub fn poll_worker(&mut self) -> Option<String> {
        self.session.poll_worker()
    }
}
