//! Integration tests for the TCP command protocol
//!
//! Each test starts a full service (sampler plus command server) on an
//! ephemeral port and talks to it the way a real client would: one
//! request per connection, reading the response to EOF.

mod common;

use common::{packet, roundtrip, send_command};
use rtscope::config::ScopeConfig;
use rtscope::directory::{ProcessDirectory, SimDirectory};
use rtscope::server::protocol::{CommandCode, Request, RequestValue, REQUEST_SIZE};
use rtscope::service::ScopeService;
use rtscope::types::{Direction, DirectoryHandle, SourceKind, TriggerMode, TypedValue, ValueType};
use serial_test::serial;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

fn test_config() -> ScopeConfig {
    let mut config = ScopeConfig::default();
    config.port = 0;
    config.channel_count = 4;
    config.sample_capacity = 6;
    config
}

fn start_service(dir: &SimDirectory) -> ScopeService {
    let directory = Arc::new(Mutex::new(dir.clone()));
    ScopeService::start(&test_config(), directory).unwrap()
}

/// Poll CHECK until the trigger reports the wanted mode
fn wait_for_mode(service: &ScopeService, mode: TriggerMode) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let response = send_command(
            service.local_addr(),
            CommandCode::Check,
            0,
            RequestValue::Int(0),
        )
        .unwrap();
        if response == format!("{}\n", mode.code()) {
            return;
        }
        assert!(Instant::now() < deadline, "trigger never reached {:?}", mode);
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[test]
#[serial]
fn test_list_enumerates_entries_by_kind() {
    let dir = SimDirectory::new();
    let speed = dir.add_entry("motor.speed", SourceKind::Pin, ValueType::Float, Direction::Out);
    dir.add_entry("motor.enable", SourceKind::Signal, ValueType::Bit, Direction::InOut);
    let mut service = start_service(&dir);

    let pins = send_command(
        service.local_addr(),
        CommandCode::List,
        SourceKind::Pin.code(),
        RequestValue::Int(0),
    )
    .unwrap();
    assert_eq!(pins, format!("{}  2  32 motor.speed\n", speed));

    let signals = send_command(
        service.local_addr(),
        CommandCode::List,
        SourceKind::Signal.code(),
        RequestValue::Int(0),
    )
    .unwrap();
    assert!(signals.ends_with(" motor.enable\n"));

    let params = send_command(
        service.local_addr(),
        CommandCode::List,
        SourceKind::Parameter.code(),
        RequestValue::Int(0),
    )
    .unwrap();
    assert!(params.is_empty());

    service.stop();
}

#[test]
#[serial]
fn test_state_reports_live_value() {
    let dir = SimDirectory::new();
    let handle = dir.add_entry("motor.speed", SourceKind::Pin, ValueType::Float, Direction::Out);
    dir.set_value(handle, TypedValue::Float(1.5));
    let mut service = start_service(&dir);

    let response = send_command(
        service.local_addr(),
        CommandCode::State,
        SourceKind::Pin.code(),
        RequestValue::Int(handle.0 as i64),
    )
    .unwrap();
    assert_eq!(response, "1.5\n");

    service.stop();
}

#[test]
#[serial]
fn test_full_capture_session() {
    let dir = SimDirectory::new();
    let handle = dir.add_entry("motor.speed", SourceKind::Pin, ValueType::Float, Direction::Out);
    dir.set_value(handle, TypedValue::Float(2.5));
    let mut service = start_service(&dir);
    let addr = service.local_addr();

    // Bind slot 0 to the pin: selector = slot * 10 + kind
    let response = send_command(
        addr,
        CommandCode::Channel,
        0,
        RequestValue::Int(handle.0 as i64),
    )
    .unwrap();
    assert!(response.is_empty());

    // Immediate capture
    send_command(
        addr,
        CommandCode::Run,
        TriggerMode::Capturing.code(),
        RequestValue::Float(0.0),
    )
    .unwrap();
    wait_for_mode(&service, TriggerMode::Complete);

    let response = send_command(addr, CommandCode::Get, 0, RequestValue::Int(0)).unwrap();
    let mut lines = response.lines();
    assert_eq!(lines.next(), Some("Samples 6 Thread 1000000"));
    for line in lines {
        assert_eq!(line, "0 2.5");
    }

    // GET drains the ring
    let response = send_command(addr, CommandCode::Get, 0, RequestValue::Int(0)).unwrap();
    assert_eq!(response, "Samples 0 Thread 1000000\n");

    // STOP returns the trigger to Idle
    send_command(addr, CommandCode::Stop, 0, RequestValue::Int(0)).unwrap();
    wait_for_mode(&service, TriggerMode::Idle);

    service.stop();
}

#[test]
#[serial]
fn test_edge_triggered_capture_over_tcp() {
    let dir = SimDirectory::new();
    let source = dir.add_entry("trig.src", SourceKind::Pin, ValueType::Float, Direction::Out);
    dir.set_value(source, TypedValue::Float(0.0));
    let mut service = start_service(&dir);
    let addr = service.local_addr();

    send_command(
        addr,
        CommandCode::Channel,
        0,
        RequestValue::Int(source.0 as i64),
    )
    .unwrap();
    send_command(
        addr,
        CommandCode::Trig,
        SourceKind::Pin.code(),
        RequestValue::Int(source.0 as i64),
    )
    .unwrap();
    send_command(
        addr,
        CommandCode::Run,
        TriggerMode::ArmedHigh.code(),
        RequestValue::Float(5.0),
    )
    .unwrap();

    // Below threshold: stays armed
    std::thread::sleep(Duration::from_millis(50));
    let response = send_command(addr, CommandCode::Check, 0, RequestValue::Int(0)).unwrap();
    assert_eq!(response, format!("{}\n", TriggerMode::ArmedHigh.code()));

    // Rising crossing fires and the capture runs to completion
    dir.set_value(source, TypedValue::Float(9.0));
    wait_for_mode(&service, TriggerMode::Complete);

    let response = send_command(addr, CommandCode::Get, 0, RequestValue::Int(0)).unwrap();
    assert!(response.starts_with("Samples 6 Thread "));

    service.stop();
}

#[test]
#[serial]
fn test_clearing_channel_with_null_handle() {
    let dir = SimDirectory::new();
    let handle = dir.add_entry("motor.speed", SourceKind::Pin, ValueType::Float, Direction::Out);
    let mut service = start_service(&dir);
    let addr = service.local_addr();

    send_command(addr, CommandCode::Channel, 0, RequestValue::Int(handle.0 as i64)).unwrap();
    send_command(
        addr,
        CommandCode::Channel,
        0,
        RequestValue::Int(DirectoryHandle::NULL.0 as i64),
    )
    .unwrap();

    let ctx = service.context();
    assert_eq!(ctx.lock().unwrap().channels.active().count(), 0);

    service.stop();
}

#[test]
#[serial]
fn test_control_word_mismatch_drops_connection() {
    let dir = SimDirectory::new();
    let mut service = start_service(&dir);

    let buf = Request::pack(0x1BAD, CommandCode::Check, 0, RequestValue::Int(0));
    let response = roundtrip(service.local_addr(), &buf).unwrap();
    assert!(response.is_empty());

    // The server keeps serving afterwards
    let response = send_command(
        service.local_addr(),
        CommandCode::Check,
        0,
        RequestValue::Int(0),
    )
    .unwrap();
    assert_eq!(response, "0\n");

    service.stop();
}

#[test]
#[serial]
fn test_undersized_request_drops_connection() {
    let dir = SimDirectory::new();
    let mut service = start_service(&dir);

    let short = [0u8; REQUEST_SIZE - 4];
    let response = roundtrip(service.local_addr(), &short).unwrap();
    assert!(response.is_empty());

    service.stop();
}

#[test]
#[serial]
fn test_unknown_command_drops_connection() {
    let dir = SimDirectory::new();
    let mut service = start_service(&dir);

    let mut buf = packet(CommandCode::Check, 0, RequestValue::Int(0));
    buf[8] = 99; // command byte
    let response = roundtrip(service.local_addr(), &buf).unwrap();
    assert!(response.is_empty());

    service.stop();
}

#[test]
#[serial]
fn test_invalid_run_mode_is_rejected() {
    let dir = SimDirectory::new();
    let mut service = start_service(&dir);
    let addr = service.local_addr();

    // Idle and Complete are not runnable modes
    let response = send_command(addr, CommandCode::Run, 0, RequestValue::Float(0.0)).unwrap();
    assert!(response.is_empty());
    let response = send_command(addr, CommandCode::Check, 0, RequestValue::Int(0)).unwrap();
    assert_eq!(response, "0\n");

    service.stop();
}

#[test]
#[serial]
fn test_demo_directory_end_to_end() {
    let dir = SimDirectory::with_demo_entries();
    let wave = dir
        .enumerate(SourceKind::Pin)
        .into_iter()
        .find(|e| e.name == "demo.wave")
        .map(|e| e.handle)
        .unwrap();
    let mut service = start_service(&dir);
    let addr = service.local_addr();

    send_command(addr, CommandCode::Channel, 0, RequestValue::Int(wave.0 as i64)).unwrap();
    send_command(
        addr,
        CommandCode::Run,
        TriggerMode::Capturing.code(),
        RequestValue::Float(0.0),
    )
    .unwrap();
    wait_for_mode(&service, TriggerMode::Complete);

    let response = send_command(addr, CommandCode::Get, 0, RequestValue::Int(0)).unwrap();
    let samples: Vec<f64> = response
        .lines()
        .skip(1)
        .map(|line| {
            line.split_whitespace()
                .nth(1)
                .and_then(|v| v.parse().ok())
                .unwrap()
        })
        .collect();
    assert_eq!(samples.len(), 6);
    // Sine amplitude 10
    for value in samples {
        assert!(value.abs() <= 10.0);
    }

    service.stop();
}
