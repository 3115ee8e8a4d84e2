//! Command encoder for the serial link.

use super::command::{Command, Reply};
use super::error::ChannelError;
use super::literal;
use super::serial_transport::SerialTransport;
use super::CommandChannel;

/// Sends logical commands as `run_command(...)` expressions over a [`SerialTransport`].
pub struct SerialCommandSender {
    transport: SerialTransport,
}

impl SerialCommandSender {
    pub fn new(transport: SerialTransport) -> Self {
        Self { transport }
    }

    /// Render the command text that goes on the wire.
    pub fn encode(command: &Command) -> Result<String, ChannelError> {
        Ok(literal::format_call(command)?)
    }

    /// Send a command and return the framed response message unchanged.
    pub fn send_command(&mut self, command: &Command) -> Result<String, ChannelError> {
        let line = Self::encode(command)?;
        self.transport.send_command(&line)
    }
}

impl CommandChannel for SerialCommandSender {
    fn send(&mut self, command: &Command) -> Result<Reply, ChannelError> {
        self.send_command(command).map(Reply::Text)
    }

    fn close(&mut self) {
        self.transport.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::command::Settings;
    use crate::control::config::SerialConfig;

    #[test]
    fn encodes_hardware_settings_command() {
        let command = Command::new("apply_hardware_settings")
            .arg("test_gpio")
            .arg(Settings::new().with("value", 1));
        assert_eq!(
            SerialCommandSender::encode(&command).unwrap(),
            r#"run_command("apply_hardware_settings","test_gpio",{"value": 1})"#
        );
    }

    #[test]
    fn unconnected_sender_passes_driver_error_through() {
        let mut sender = SerialCommandSender::new(SerialTransport::new(SerialConfig::default(), true));
        let err = sender.send(&Command::new("list_commands")).unwrap_err();
        assert_eq!(err.to_string(), "Not connected to the serial port.");
        sender.close();
    }
}
