//! Control module for sending commands to the board.
//!
//! Two interchangeable channels implement [`CommandChannel`]:
//! - serial: commands are rendered as interpreter expressions and the reply
//!   is scraped from the console output
//! - web: commands are posted as JSON to the board's HTTP API

pub mod command;
pub mod config;
pub mod error;
pub mod literal;
pub mod serial_sender;
pub mod serial_transport;
pub mod web_sender;
pub mod web_transport;

pub use command::{Command, Reply, Settings, Value};
pub use config::{AppConfig, TransportKind};
pub use error::ChannelError;
pub use serial_sender::SerialCommandSender;
pub use serial_transport::SerialTransport;
pub use web_sender::WebCommandSender;
pub use web_transport::WebTransport;

/// A connection able to run logical commands on the board.
pub trait CommandChannel {
    /// Send one command and wait for its reply.
    fn send(&mut self, command: &Command) -> Result<Reply, ChannelError>;

    /// Release the underlying connection. Safe to call more than once.
    fn close(&mut self) {}
}

/// Build the channel selected by `config.transport`.
///
/// The serial variant is connected before it is returned, so a missing
/// device surfaces here as a fatal [`ChannelError::Connect`].
pub fn open_channel(config: AppConfig) -> Result<Box<dyn CommandChannel>, ChannelError> {
    match config.transport {
        TransportKind::Serial => {
            let mut transport = SerialTransport::new(config.serial, config.debug);
            transport.connect()?;
            Ok(Box::new(SerialCommandSender::new(transport)))
        }
        TransportKind::Web => {
            log::info!("Using web API at {}", config.web.base_url);
            let transport = WebTransport::new(config.web, config.debug)?;
            Ok(Box::new(WebCommandSender::new(transport)))
        }
    }
}
