//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

use rtscope::server::protocol::{CommandCode, Request, RequestValue, REQUEST_SIZE};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

/// Control word used by every test config
pub const TEST_CONTROL_WORD: i64 = 0x53434F50;

/// Pack a request with the test control word
pub fn packet(command: CommandCode, selector: u8, value: RequestValue) -> [u8; REQUEST_SIZE] {
    Request::pack(TEST_CONTROL_WORD, command, selector, value)
}

/// Send one request and read the full response
///
/// The server closes the connection after every request, so read to EOF.
pub fn roundtrip(addr: SocketAddr, buf: &[u8]) -> std::io::Result<String> {
    let mut stream = TcpStream::connect(addr)?;
    stream.set_read_timeout(Some(Duration::from_secs(5)))?;
    stream.write_all(buf)?;
    let mut response = String::new();
    stream.read_to_string(&mut response)?;
    Ok(response)
}

/// Send one command and read the response
pub fn send_command(
    addr: SocketAddr,
    command: CommandCode,
    selector: u8,
    value: RequestValue,
) -> std::io::Result<String> {
    roundtrip(addr, &packet(command, selector, value))
}

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}
