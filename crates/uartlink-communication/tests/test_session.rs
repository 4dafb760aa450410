//! Link session: connect lifecycle, mode selection and the send boundary

mod common;

use common::{received_raws, wait_for, GatedSink, ScriptedChannel};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use uartlink_communication::{ConnectionParams, LinkSession, Preset};
use uartlink_core::{
    ConnectionError, DecodedEvent, DisplayModel, Error, InputError, LinkEvent, MemorySink, Mode,
    Retained,
};

const TIMEOUT: Duration = Duration::from_millis(20);

fn connected_session() -> (LinkSession, Arc<MemorySink>, common::Script) {
    let sink = Arc::new(MemorySink::new());
    let mut session = LinkSession::new(sink.clone());
    let (channel, script) = ScriptedChannel::new("sim0", TIMEOUT);
    session.connect_channel(Box::new(channel)).unwrap();
    (session, sink, script)
}

fn transmitted(events: &[LinkEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|e| match e {
            LinkEvent::Transmitted { raw } => Some(*raw),
            _ => None,
        })
        .collect()
}

#[test]
fn test_connect_and_disconnect() {
    let (mut session, sink, _script) = connected_session();
    assert!(session.is_connected());
    assert_eq!(session.port(), Some("sim0"));
    assert_eq!(session.mode(), Mode::Temperature);

    session.disconnect().unwrap();
    assert!(!session.is_connected());

    // Second disconnect is a no-op
    session.disconnect().unwrap();

    assert_eq!(
        sink.events(),
        vec![
            LinkEvent::Connected {
                port: "sim0".to_string()
            },
            LinkEvent::Disconnected {
                port: "sim0".to_string()
            },
        ]
    );
}

#[test]
fn test_connect_twice_is_rejected() {
    let (mut session, _sink, _script) = connected_session();
    let (other, _other_script) = ScriptedChannel::new("sim1", TIMEOUT);

    let err = session.connect_channel(Box::new(other)).unwrap_err();
    assert!(matches!(
        err,
        Error::Connection(ConnectionError::AlreadyConnected)
    ));
    assert_eq!(session.port(), Some("sim0"));
}

#[test]
fn test_invalid_hex_sends_nothing() {
    let (mut session, sink, script) = connected_session();

    let err = session.send_hex("ZZ").unwrap_err();
    assert!(matches!(err, Error::Input(InputError::InvalidHex { .. })));
    assert!(script.written().is_empty());
    assert!(session.is_connected());
    assert!(transmitted(&sink.events()).is_empty());
}

#[test]
fn test_valid_hex_sends_exactly_once() {
    let (mut session, sink, script) = connected_session();

    assert_eq!(session.send_hex("AA").unwrap(), 0xAA);
    assert_eq!(script.written(), vec![0xAA]);
    assert_eq!(transmitted(&sink.events()), vec![0xAA]);
}

#[test]
fn test_presets_send_their_byte() {
    let (mut session, _sink, script) = connected_session();
    for preset in Preset::ALL {
        session.send_preset(preset).unwrap();
    }
    assert_eq!(script.written(), vec![0x00, 0x55, 0xAA, 0xFF]);
}

#[test]
fn test_send_when_disconnected() {
    let sink = Arc::new(MemorySink::new());
    let mut session = LinkSession::new(sink.clone());

    let err = session.send_byte(0x01).unwrap_err();
    assert!(matches!(err, Error::Connection(ConnectionError::NotConnected)));

    // Validation still runs first
    let err = session.send_hex("G1").unwrap_err();
    assert!(err.is_input_error());
    assert!(sink.is_empty());
}

#[test]
fn test_set_mode_publishes_only_on_change() {
    let sink = Arc::new(MemorySink::new());
    let session = LinkSession::new(sink.clone());

    assert!(!session.set_mode(Mode::Temperature));
    assert!(session.set_mode(Mode::SwitchValue));
    assert!(!session.set_mode(Mode::SwitchValue));

    assert_eq!(
        sink.events(),
        vec![LinkEvent::ModeChanged {
            from: Mode::Temperature,
            to: Mode::SwitchValue
        }]
    );
}

#[test]
fn test_mode_switch_clears_switch_value_before_next_byte() {
    let (session, sink, script) = connected_session();
    session.set_mode(Mode::SwitchValue);
    script.send(0x7E);
    wait_for(&sink, |e| received_raws(e).len() == 1);
    assert_eq!(session.mode_state().retained().switch_raw, 0x7E);

    session.set_mode(Mode::Temperature);
    assert_eq!(session.mode_state().retained(), Retained::default());
}

#[test]
fn test_switch_bytes_observed_in_order() {
    let (session, sink, script) = connected_session();
    session.set_mode(Mode::SwitchValue);
    script.send_all(&[0x10, 0x20, 0x30]);

    let events = wait_for(&sink, |e| received_raws(e).len() == 3);
    assert_eq!(received_raws(&events), vec![0x10, 0x20, 0x30]);
    assert_eq!(session.mode_state().retained().switch_raw, 0x30);
}

#[test]
fn test_write_failure_ends_session() {
    let (mut session, sink, script) = connected_session();
    script.fail_writes();

    let err = session.send_byte(0x55).unwrap_err();
    assert!(err.is_terminal());
    assert!(!session.is_connected());

    let lost = sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, LinkEvent::ConnectionLost { .. }))
        .count();
    assert_eq!(lost, 1);
}

#[test]
fn test_read_failure_is_reaped() {
    let (mut session, sink, script) = connected_session();
    script.fail_reads(io::ErrorKind::BrokenPipe);

    wait_for(&sink, |e| {
        e.iter().any(|e| matches!(e, LinkEvent::ConnectionLost { .. }))
    });

    let mut reason = None;
    for _ in 0..100 {
        reason = session.poll_worker();
        if reason.is_some() {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    assert!(reason.is_some());
    assert!(!session.is_connected());
    assert!(session.poll_worker().is_none());
}

#[test]
fn test_connect_rejects_invalid_params() {
    let mut session = LinkSession::new(Arc::new(MemorySink::new()));
    let err = session.connect(&ConnectionParams::default()).unwrap_err();
    assert!(matches!(
        err,
        Error::Connection(ConnectionError::InvalidParameters { .. })
    ));
    assert!(!session.is_connected());
}

#[test]
fn test_mode_change_waits_for_byte_in_flight() {
    let sink = Arc::new(GatedSink::new());
    let mut session = LinkSession::new(sink.clone());
    let (channel, script) = ScriptedChannel::new("sim0", TIMEOUT);
    session.connect_channel(Box::new(channel)).unwrap();
    session.set_mode(Mode::SwitchValue);

    sink.close();
    script.send(0x3C);
    assert!(sink.wait_holding());

    let gate = sink.clone();
    let opener = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        gate.open();
    });
    assert!(session.set_mode(Mode::Temperature));
    opener.join().unwrap();
    session.disconnect().unwrap();

    let events = sink.events();
    let received = events
        .iter()
        .position(|e| *e == LinkEvent::Received(DecodedEvent::SwitchReading(0x3C)))
        .unwrap();
    let changed = events
        .iter()
        .position(|e| {
            *e == LinkEvent::ModeChanged {
                from: Mode::SwitchValue,
                to: Mode::Temperature,
            }
        })
        .unwrap();
    assert!(received < changed, "{:?}", events);

    let mut display = DisplayModel::new();
    for event in &events {
        display.apply(event);
    }
    assert_eq!(display.mode(), Mode::Temperature);
    assert_eq!(display.switch_text(), "SW[7:0]: --");
    assert_eq!(display.raw_text(), "--");
}
