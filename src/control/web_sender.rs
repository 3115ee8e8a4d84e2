//! Command encoder for the web API.
//!
//! Arguments travel as structured JSON, so unlike the serial encoder nothing
//! is re-spelled: booleans stay `true`/`false` and strings are not quoted.

use super::command::{Command, Reply};
use super::error::ChannelError;
use super::web_transport::WebTransport;
use super::CommandChannel;

/// Endpoint that evaluates a command on the board.
pub const RUN_COMMAND_ENDPOINT: &str = "run_command";

/// Sends logical commands as `{"command": ..., "args": [...]}` over a [`WebTransport`].
pub struct WebCommandSender {
    transport: WebTransport,
}

impl WebCommandSender {
    pub fn new(transport: WebTransport) -> Self {
        Self { transport }
    }

    /// Send a command and return the server's JSON reply unchanged.
    pub fn send_command(&self, command: &Command) -> serde_json::Value {
        self.transport.send_command(RUN_COMMAND_ENDPOINT, &command.to_payload())
    }
}

impl CommandChannel for WebCommandSender {
    fn send(&mut self, command: &Command) -> Result<Reply, ChannelError> {
        Ok(Reply::Json(self.send_command(command)))
    }
}
