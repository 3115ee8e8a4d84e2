//! Remote command client for a microcontroller hardware-control board.
//!
//! Hardware objects (GPIO pins and the like) living on the board are created,
//! configured, started, stopped, saved and deleted by sending named commands
//! over either the board's serial console or its HTTP API.

pub mod control;
pub mod demo;
pub mod interrupt;

pub use control::{AppConfig, ChannelError, Command, CommandChannel, Reply, Settings, TransportKind, Value, open_channel};
