//! Error type shared by the serial and web command channels.

/// Message returned when a serial reply carries no `RESPONSE: [==>...<==]` frame.
pub const NO_VALID_RESPONSE: &str = "No valid response found or invalid format.";

/// Failures raised while sending a command.
///
/// `Connect` and `Io` mean the link itself is unusable and end the session.
/// The other variants describe a single failed command; the caller can report
/// them and keep going.
#[derive(Debug)]
pub enum ChannelError {
    /// The serial port could not be opened.
    Connect { port: String, reason: String },
    /// Reading from or writing to an open serial port failed.
    Io(std::io::Error),
    /// A command was sent before `connect` succeeded.
    NotConnected,
    /// The serial reply did not contain a response frame. `raw` is only kept in debug mode.
    InvalidResponse { raw: Option<String> },
    /// An argument could not be rendered for the wire.
    Encode(String),
    /// HTTP request failed or returned a non-success status.
    Http(String),
}

impl ChannelError {
    /// Whether the session has to be abandoned after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ChannelError::Connect { .. } | ChannelError::Io(_))
    }
}

impl std::fmt::Display for ChannelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelError::Connect { port, reason } => write!(f, "Failed to open serial port {}: {}", port, reason),
            ChannelError::Io(e) => write!(f, "Serial I/O error: {}", e),
            ChannelError::NotConnected => write!(f, "Not connected to the serial port."),
            ChannelError::InvalidResponse { raw: None } => write!(f, "{}", NO_VALID_RESPONSE),
            ChannelError::InvalidResponse { raw: Some(raw) } => write!(f, "{} Raw response: {}", NO_VALID_RESPONSE, raw),
            ChannelError::Encode(msg) => write!(f, "Failed to encode command: {}", msg),
            ChannelError::Http(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ChannelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChannelError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ChannelError {
    fn from(e: std::io::Error) -> Self {
        ChannelError::Io(e)
    }
}

impl From<serde_json::Error> for ChannelError {
    fn from(e: serde_json::Error) -> Self {
        ChannelError::Encode(e.to_string())
    }
}
