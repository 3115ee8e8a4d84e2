//! Serial transport driver for the board's text interpreter.
//!
//! A command is written as one line terminated by `\r`. The board echoes,
//! evaluates it and prints its result framed as `RESPONSE: [==>message<==]`,
//! then returns to the `>>>` prompt. Everything up to the prompt is read and
//! the framed message is extracted.

use regex::Regex;
use serialport::SerialPort;
use std::io::{self, Read, Write};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use super::config::SerialConfig;
use super::error::ChannelError;

/// Byte sequence marking the end of a reply (the interpreter prompt).
pub const PROMPT: &[u8] = b">>>";

/// Serial connection to the board.
///
/// The port is opened by [`SerialTransport::connect`] and released by
/// [`SerialTransport::close`] or when the transport is dropped.
pub struct SerialTransport {
    config: SerialConfig,
    debug: bool,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialTransport {
    pub fn new(config: SerialConfig, debug: bool) -> Self {
        Self {
            config,
            debug,
            port: None,
        }
    }

    /// Open the serial port with the configured framing.
    pub fn connect(&mut self) -> Result<(), ChannelError> {
        let port = serialport::new(&self.config.port, self.config.baud_rate)
            .parity(self.config.parity.into())
            .stop_bits(self.config.stop_bits.into())
            .timeout(self.config.timeout())
            .open()
            .map_err(|e| ChannelError::Connect {
                port: self.config.port.clone(),
                reason: e.to_string(),
            })?;

        log::info!("Connected to {}", self.config.port);
        self.port = Some(port);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    /// Send one raw command line and return the framed response message.
    pub fn send_command(&mut self, command: &str) -> Result<String, ChannelError> {
        let timeout = self.config.timeout();
        let debug = self.debug;
        let Some(port) = self.port.as_mut() else {
            log::warn!("Not connected to the serial port.");
            return Err(ChannelError::NotConnected);
        };

        if debug {
            log::debug!("Sending to {}: {}", self.config.port, command);
        }
        exchange(port.as_mut(), command, timeout, debug)
    }

    /// Close the port if it is open. Safe to call repeatedly or before `connect`.
    pub fn close(&mut self) {
        if self.port.take().is_some() {
            log::info!("Connection to {} closed.", self.config.port);
        }
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        self.close();
    }
}

/// Write `command` followed by `\r`, read up to the prompt and extract the response.
pub fn exchange<P>(port: &mut P, command: &str, timeout: Duration, debug: bool) -> Result<String, ChannelError>
where
    P: Read + Write + ?Sized,
{
    port.flush()?;
    port.write_all(format!("{}\r", command).as_bytes())?;

    let received = read_until(port, PROMPT, timeout)?;
    extract_response(&String::from_utf8_lossy(&received), debug)
}

/// Read bytes until `terminator` has been received or `timeout` elapses.
///
/// A read timeout or end of stream ends the read early; whatever arrived so
/// far is returned. Other I/O errors are propagated.
pub fn read_until<R>(reader: &mut R, terminator: &[u8], timeout: Duration) -> io::Result<Vec<u8>>
where
    R: Read + ?Sized,
{
    let deadline = Instant::now() + timeout;
    let mut received = Vec::new();
    let mut byte = [0u8; 1];

    while !received.ends_with(terminator) && Instant::now() < deadline {
        match reader.read(&mut byte) {
            Ok(0) => break,
            Ok(_) => received.push(byte[0]),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(received)
}

fn response_pattern() -> &'static Regex {
    static RESPONSE_RE: OnceLock<Regex> = OnceLock::new();
    RESPONSE_RE.get_or_init(|| Regex::new(r"(?s)RESPONSE:\s?\[==>(.*?)<==\]").expect("static pattern is valid"))
}

/// Pull the message out of `RESPONSE: [==>message<==]` in a decoded reply.
///
/// The message may span several lines. When no frame is present the error
/// carries the (trimmed) raw reply in debug mode only.
pub fn extract_response(reply: &str, debug: bool) -> Result<String, ChannelError> {
    let reply = reply.trim();
    match response_pattern().captures(reply).and_then(|caps| caps.get(1)) {
        Some(message) => Ok(message.as_str().to_string()),
        None => Err(ChannelError::InvalidResponse {
            raw: debug.then(|| reply.to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// In-memory stand-in for a serial port: records writes and replays a canned reply.
    struct FakePort {
        written: Vec<u8>,
        reply: Cursor<Vec<u8>>,
        flushed: bool,
    }

    impl FakePort {
        fn replying(reply: &[u8]) -> Self {
            Self {
                written: Vec::new(),
                reply: Cursor::new(reply.to_vec()),
                flushed: false,
            }
        }
    }

    impl Read for FakePort {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.reply.position() as usize >= self.reply.get_ref().len() {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "Operation timed out"));
            }
            self.reply.read(buf)
        }
    }

    impl Write for FakePort {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushed = true;
            Ok(())
        }
    }

    struct BrokenPort;

    impl Read for BrokenPort {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"))
        }
    }

    impl Write for BrokenPort {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    const TIMEOUT: Duration = Duration::from_secs(1);

    #[test]
    fn exchange_writes_carriage_return_terminated_line() {
        let mut port = FakePort::replying(b"run_command(\"start\",\"test_gpio\")\r\nRESPONSE: [==>ok<==]\r\n>>>");
        let response = exchange(&mut port, r#"run_command("start","test_gpio")"#, TIMEOUT, false).unwrap();

        assert_eq!(response, "ok");
        assert!(port.flushed);
        assert_eq!(port.written, b"run_command(\"start\",\"test_gpio\")\r");
    }

    #[test]
    fn invalid_utf8_in_reply_is_replaced_not_rejected() {
        let mut port = FakePort::replying(b"RESPONSE: [==>temp \xFF 21<==]\r\n>>>");
        let response = exchange(&mut port, r#"run_command("get_all_config")"#, TIMEOUT, false).unwrap();
        assert_eq!(response, "temp \u{FFFD} 21");
    }

    #[test]
    fn read_stops_at_prompt() {
        let mut reader = Cursor::new(b"RESPONSE: [==>ok<==]\r\n>>> trailing".to_vec());
        let received = read_until(&mut reader, PROMPT, TIMEOUT).unwrap();
        assert_eq!(received, b"RESPONSE: [==>ok<==]\r\n>>>");
    }

    #[test]
    fn read_returns_partial_data_on_timeout() {
        let mut port = FakePort::replying(b"RESPONSE: [==>trunc");
        let received = read_until(&mut port, PROMPT, TIMEOUT).unwrap();
        assert_eq!(received, b"RESPONSE: [==>trunc");
    }

    #[test]
    fn io_failures_propagate_as_fatal_errors() {
        let err = exchange(&mut BrokenPort, "run_command(\"list_commands\")", TIMEOUT, false).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, ChannelError::Io(_)));
    }

    #[test]
    fn extracts_framed_message() {
        assert_eq!(extract_response("...RESPONSE: [==>ok<==]...>>>", false).unwrap(), "ok");
    }

    #[test]
    fn extracts_multiline_message_with_optional_space() {
        let reply = "RESPONSE:[==>{'gpio': {'test_gpio': {'value': 1}}}\nline two<==]\r\n>>>";
        assert_eq!(
            extract_response(reply, false).unwrap(),
            "{'gpio': {'test_gpio': {'value': 1}}}\nline two"
        );
    }

    #[test]
    fn first_frame_wins() {
        let reply = "RESPONSE: [==>first<==] RESPONSE: [==>second<==] >>>";
        assert_eq!(extract_response(reply, false).unwrap(), "first");
    }

    #[test]
    fn delimiters_are_case_sensitive() {
        assert!(extract_response("response: [==>ok<==] >>>", false).is_err());
    }

    #[test]
    fn missing_frame_hides_raw_text_outside_debug() {
        let err = extract_response("  Traceback: NameError >>>  ", false).unwrap_err();
        assert_eq!(err.to_string(), "No valid response found or invalid format.");
        assert!(!err.is_fatal());
    }

    #[test]
    fn missing_frame_shows_trimmed_raw_text_in_debug() {
        let err = extract_response("  Traceback: NameError >>>  ", true).unwrap_err();
        assert_eq!(
            err.to_string(),
            "No valid response found or invalid format. Raw response: Traceback: NameError >>>"
        );
    }

    #[test]
    fn send_before_connect_is_reported_not_raised() {
        let mut transport = SerialTransport::new(SerialConfig::default(), false);
        let err = transport.send_command("run_command(\"list_commands\")").unwrap_err();
        assert!(matches!(err, ChannelError::NotConnected));
        assert!(!err.is_fatal());
    }

    #[test]
    fn close_without_connect_is_harmless() {
        let mut transport = SerialTransport::new(SerialConfig::default(), false);
        transport.close();
        transport.close();
        assert!(!transport.is_connected());
    }

    #[test]
    fn connect_to_missing_device_is_fatal() {
        let config = SerialConfig {
            port: "/dev/pico-remote-does-not-exist".to_string(),
            ..SerialConfig::default()
        };
        let mut transport = SerialTransport::new(config, false);
        let err = transport.connect().unwrap_err();
        assert!(err.is_fatal());
        assert!(!transport.is_connected());
    }
}
