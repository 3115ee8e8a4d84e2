use anyhow::Context;
use clap::{Parser, Subcommand};
use env_logger::Builder;
use log::{LevelFilter, error, info};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use pico_remote::demo::{self, DemoOutcome};
use pico_remote::interrupt::{INTERRUPTED_EXIT_CODE, InterruptAction, on_interrupt};
use pico_remote::{AppConfig, Command, CommandChannel, TransportKind, Value, open_channel};

/// Pause inserted by the demo after reading back the configuration.
const DEMO_PAUSE: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "pico-remote", version, about = "Send commands to a hardware-control board over serial or HTTP")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Transport to use, overriding the config file
    #[arg(long, value_enum, global = true)]
    transport: Option<TransportKind>,

    /// Serial port, overriding the config file
    #[arg(long, global = true)]
    port: Option<String>,

    /// Web server base URL, overriding the config file
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Verbose logging and raw replies in error messages
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Subcommand)]
enum Mode {
    /// Run the scripted GPIO lifecycle (default)
    Demo,
    /// Send a single command; arguments are parsed as JSON literals where possible
    Send { name: String, args: Vec<String> },
}

impl Cli {
    fn load_config(&self) -> Result<AppConfig, String> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };
        if let Some(transport) = self.transport {
            config.transport = transport;
        }
        if let Some(port) = &self.port {
            config.serial.port = port.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.web.base_url = base_url.clone();
        }
        config.debug |= self.debug;
        Ok(config)
    }
}

fn init_logging(debug: bool) {
    Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter(Some("pico_remote"), if debug { LevelFilter::Debug } else { LevelFilter::Info })
        .parse_default_env()
        .init();
}

fn main() {
    let cli = Cli::parse();
    let config = cli.load_config();
    init_logging(config.as_ref().map(|c| c.debug).unwrap_or(cli.debug));

    let result = config.map_err(anyhow::Error::msg).and_then(|config| run(config, cli.command.unwrap_or(Mode::Demo)));
    if let Err(e) = result {
        error!("An error occurred: {:#}", e);
        std::process::exit(1);
    }
}

fn run(config: AppConfig, mode: Mode) -> anyhow::Result<()> {
    let transport = config.transport;
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    ctrlc::set_handler(move || match on_interrupt(&flag, transport) {
        InterruptAction::StopAfterCurrent => {
            info!("Interrupt received, stopping after the current command (press Ctrl-C again to exit now)");
        }
        InterruptAction::ExitNow => {
            println!("\nProgram interrupted.");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    })
    .context("Failed to install interrupt handler")?;

    let mut channel = open_channel(config).with_context(|| format!("Failed to open {:?} channel", transport))?;

    match mode {
        Mode::Demo => {
            let outcome = demo::run_demo(channel.as_mut(), &mut io::stdout(), &interrupted, DEMO_PAUSE);
            channel.close();
            if let DemoOutcome::Interrupted = outcome? {
                println!("\nProgram interrupted.");
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        }
        Mode::Send { name, args } => {
            let sent = send_once(channel.as_mut(), name, &args);
            channel.close();
            sent?;
        }
    }
    Ok(())
}

fn send_once(channel: &mut dyn CommandChannel, name: String, args: &[String]) -> anyhow::Result<()> {
    let command = args.iter().fold(Command::new(name), |command, arg| command.arg(Value::parse_cli_arg(arg)));
    match channel.send(&command) {
        Ok(reply) => println!("{}", reply),
        Err(e) if !e.is_fatal() => println!("{}", e),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
