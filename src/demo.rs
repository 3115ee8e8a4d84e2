//! Scripted walk through the hardware-object lifecycle.
//!
//! Lists commands, creates a GPIO object driving the on-board LED, toggles it,
//! saves the configuration, deletes the object and loads the configuration
//! back. Each reply is printed as it arrives.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::control::{Command, CommandChannel, Settings};

/// Name of the GPIO object created by the demo.
pub const DEMO_OBJECT: &str = "test_gpio";

/// How a demo run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoOutcome {
    Completed,
    Interrupted,
}

/// One scripted command.
#[derive(Debug, Clone)]
pub struct Step {
    /// Line printed before the command is sent.
    pub heading: Option<&'static str>,
    pub command: Command,
    /// Wait before the next step.
    pub pause_after: bool,
}

impl Step {
    fn new(command: Command) -> Self {
        Self {
            heading: None,
            command,
            pause_after: false,
        }
    }

    fn titled(heading: &'static str, command: Command) -> Self {
        Self {
            heading: Some(heading),
            ..Self::new(command)
        }
    }

    fn then_pause(mut self) -> Self {
        self.pause_after = true;
        self
    }
}

fn set_value(value: i32) -> Command {
    Command::new("apply_hardware_settings")
        .arg(DEMO_OBJECT)
        .arg(Settings::new().with("value", value))
}

/// The fixed command sequence.
pub fn steps() -> Vec<Step> {
    let led = Settings::new()
        .with("pin_number", "LED")
        .with("mode", "OUT")
        .with("value", 0)
        .with("start_on_init", true);

    vec![
        Step::titled("Available commands:", Command::new("list_commands")),
        Step::titled("Current configuration:", Command::new("get_all_config")),
        Step::new(Command::new("create").arg("gpio").arg(led).arg(DEMO_OBJECT)),
        Step::new(Command::new("start").arg(DEMO_OBJECT)),
        Step::new(set_value(1)),
        Step::titled("Updated configuration (after turning LED on):", Command::new("get_all_config")).then_pause(),
        Step::new(set_value(0)),
        Step::titled("Updated configuration (after turning LED off):", Command::new("get_all_config")),
        Step::new(set_value(1)),
        Step::titled("Saving current configuration...", Command::new("save_config")),
        Step::new(Command::new("delete").arg(DEMO_OBJECT)),
        Step::titled("Updated configuration (after deleting test GPIO):", Command::new("get_all_config")).then_pause(),
        Step::titled("Loading saved configuration...", Command::new("load_config")),
        Step::titled("Updated configuration (after loading saved config):", Command::new("get_all_config")),
        Step::new(Command::new("apply_config")),
    ]
}

/// Run the demo sequence against `channel`, printing to `out`.
///
/// Per-command failures (bad reply, HTTP error) are printed in place of the
/// result and the sequence continues. Link failures abort the run with an error.
/// `interrupted` is checked before every command.
pub fn run_demo(
    channel: &mut dyn CommandChannel,
    out: &mut dyn Write,
    interrupted: &AtomicBool,
    pause: Duration,
) -> anyhow::Result<DemoOutcome> {
    for step in steps() {
        if interrupted.load(Ordering::SeqCst) {
            return Ok(DemoOutcome::Interrupted);
        }
        if let Some(heading) = step.heading {
            writeln!(out, "{}", heading)?;
        }

        log::debug!("Running {}", step.command.name);
        match channel.send(&step.command) {
            Ok(reply) => writeln!(out, "{}", reply)?,
            Err(e) if !e.is_fatal() => writeln!(out, "{}", e)?,
            Err(e) => return Err(e.into()),
        }

        if step.pause_after {
            thread::sleep(pause);
        }
    }
    Ok(DemoOutcome::Completed)
}
